//! Sink capability shared by local outputs and the backend adapter

use super::error::Result;
use super::field::Field;
use super::record::LogRecord;
use super::severity::Severity;
use std::sync::Arc;
use std::time::Duration;

/// A destination that accepts records at or above a threshold severity
///
/// Implementations are immutable values: `with_fields` returns a new sink
/// carrying the extended fields and leaves the receiver untouched.
pub trait Sink: Send + Sync {
    /// Whether records at `level` pass this sink's threshold
    fn enabled(&self, level: Severity) -> bool;

    /// Gate used by a multiplexer before calling `write`
    fn check(&self, record: &LogRecord) -> bool {
        self.enabled(record.level)
    }

    /// New sink with `fields` appended to the accumulated ones
    fn with_fields(&self, fields: &[Field]) -> Arc<dyn Sink>;

    /// Write one record together with call-site fields
    fn write(&self, record: &LogRecord, fields: &[Field]) -> Result<()>;

    /// Flush buffered output, waiting at most `timeout` where that applies
    fn sync(&self, timeout: Duration) -> Result<()>;

    fn name(&self) -> &str;
}

/// Fan-out over several sinks
///
/// Each record goes to every sink whose `check` accepts it. Errors do not
/// stop delivery to the remaining sinks; the first one is returned.
#[derive(Clone)]
pub struct Tee {
    sinks: Vec<Arc<dyn Sink>>,
}

impl Tee {
    pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self { sinks }
    }

    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }
}

impl Sink for Tee {
    fn enabled(&self, level: Severity) -> bool {
        self.sinks.iter().any(|sink| sink.enabled(level))
    }

    fn check(&self, record: &LogRecord) -> bool {
        self.sinks.iter().any(|sink| sink.check(record))
    }

    fn with_fields(&self, fields: &[Field]) -> Arc<dyn Sink> {
        Arc::new(Tee {
            sinks: self.sinks.iter().map(|sink| sink.with_fields(fields)).collect(),
        })
    }

    fn write(&self, record: &LogRecord, fields: &[Field]) -> Result<()> {
        let mut first_error = None;
        for sink in self.sinks.iter().filter(|sink| sink.check(record)) {
            if let Err(e) = sink.write(record, fields) {
                if first_error.is_none() {
                    first_error = Some(e);
                } else {
                    eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", sink.name(), e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn sync(&self, timeout: Duration) -> Result<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.sync(timeout) {
                if first_error.is_none() {
                    first_error = Some(e);
                } else {
                    eprintln!("[LOGGER ERROR] Sink '{}' sync failed: {}", sink.name(), e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn name(&self) -> &str {
        "tee"
    }
}
