//! Named logger over a sink

use super::{
    error::Result, field::Field, metrics::BridgeMetrics, record::LogRecord, severity::Severity,
    sink::Sink,
};
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

/// Default wait for backend delivery when syncing without an explicit timeout
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(3);

/// A named handle that turns calls into records and hands them to its sink
///
/// Loggers are cheap to clone. `with` and `named` return new loggers and
/// never change the receiver.
#[derive(Clone)]
pub struct Logger {
    name: String,
    core: Arc<dyn Sink>,
    metrics: Arc<BridgeMetrics>,
}

impl Logger {
    pub fn new(core: Arc<dyn Sink>) -> Self {
        Self::with_metrics(core, Arc::new(BridgeMetrics::new()))
    }

    pub fn with_metrics(core: Arc<dyn Sink>, metrics: Arc<BridgeMetrics>) -> Self {
        Self {
            name: String::new(),
            core,
            metrics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Child logger whose name is this name joined to `name` with a dot
    #[must_use]
    pub fn named(&self, name: &str) -> Logger {
        let mut child = self.clone();
        child.name = match (self.name.is_empty(), name.is_empty()) {
            (_, true) => self.name.clone(),
            (true, false) => name.to_string(),
            (false, false) => format!("{}.{}", self.name, name),
        };
        child
    }

    /// Logger carrying `fields` on every record it writes
    #[must_use]
    pub fn with<I>(&self, fields: I) -> Logger
    where
        I: IntoIterator<Item = Field>,
    {
        let fields: Vec<Field> = fields.into_iter().collect();
        if fields.is_empty() {
            return self.clone();
        }
        Self {
            name: self.name.clone(),
            core: self.core.with_fields(&fields),
            metrics: Arc::clone(&self.metrics),
        }
    }

    pub fn enabled(&self, level: Severity) -> bool {
        self.core.enabled(level)
    }

    pub fn metrics(&self) -> &BridgeMetrics {
        &self.metrics
    }

    /// Write a record at `level`
    ///
    /// Sink errors are reported on stderr and counted; they never reach the
    /// caller.
    #[track_caller]
    pub fn log(&self, level: Severity, message: impl Into<String>, fields: &[Field]) {
        if !self.core.enabled(level) {
            return;
        }

        let location = Location::caller();
        let record = LogRecord::new(level, message)
            .with_logger_name(self.name.clone())
            .with_location(location.file(), location.line());

        if !self.core.check(&record) {
            return;
        }

        match self.core.write(&record, fields) {
            Ok(()) => {
                self.metrics.record_written();
            }
            Err(e) => {
                self.metrics.record_write_failure();
                eprintln!("[LOGGER ERROR] Logger '{}' write failed: {}", self.name, e);
            }
        }
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>, fields: &[Field]) {
        self.log(Severity::Debug, message, fields);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl Into<String>, fields: &[Field]) {
        self.log(Severity::Info, message, fields);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>, fields: &[Field]) {
        self.log(Severity::Warn, message, fields);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl Into<String>, fields: &[Field]) {
        self.log(Severity::Error, message, fields);
    }

    #[inline]
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>, fields: &[Field]) {
        self.log(Severity::Fatal, message, fields);
    }

    /// Flush every sink behind this logger
    ///
    /// Returns [`BridgeError::SyncTimeout`](super::error::BridgeError::SyncTimeout)
    /// when the backend could not confirm delivery within `timeout`.
    pub fn sync(&self, timeout: Duration) -> Result<()> {
        let result = self.core.sync(timeout);
        if matches!(result, Err(ref e) if e.is_timeout()) {
            self.metrics.record_sync_timeout();
        }
        result
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("core", &self.core.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::BridgeError;
    use crate::core::field::{field, FieldSnapshot};
    use parking_lot::Mutex;

    #[derive(Clone)]
    struct CaptureSink {
        threshold: Severity,
        fields: FieldSnapshot,
        records: Arc<Mutex<Vec<(LogRecord, Vec<String>)>>>,
        sync_result: fn(Duration) -> Result<()>,
    }

    impl CaptureSink {
        fn new(threshold: Severity) -> Self {
            Self {
                threshold,
                fields: FieldSnapshot::new(),
                records: Arc::new(Mutex::new(Vec::new())),
                sync_result: |_| Ok(()),
            }
        }
    }

    impl Sink for CaptureSink {
        fn enabled(&self, level: Severity) -> bool {
            level >= self.threshold
        }

        fn with_fields(&self, fields: &[Field]) -> Arc<dyn Sink> {
            let mut next = self.clone();
            next.fields = self.fields.with(fields.iter().cloned());
            Arc::new(next)
        }

        fn write(&self, record: &LogRecord, fields: &[Field]) -> Result<()> {
            let merged = self.fields.merged(fields).map(|f| f.to_string()).collect();
            self.records.lock().push((record.clone(), merged));
            Ok(())
        }

        fn sync(&self, timeout: Duration) -> Result<()> {
            (self.sync_result)(timeout)
        }

        fn name(&self) -> &str {
            "capture"
        }
    }

    #[test]
    fn test_level_filtering() {
        let sink = CaptureSink::new(Severity::Warn);
        let logger = Logger::new(Arc::new(sink.clone()));

        logger.debug("hidden", &[]);
        logger.info("hidden", &[]);
        logger.warn("shown", &[]);
        logger.error("shown", &[]);

        assert_eq!(sink.records.lock().len(), 2);
        assert_eq!(logger.metrics().records_written(), 2);
    }

    #[test]
    fn test_named_joins_with_dot() {
        let logger = Logger::new(Arc::new(CaptureSink::new(Severity::Debug)));
        assert_eq!(logger.named("api").name(), "api");
        assert_eq!(logger.named("api").named("users").name(), "api.users");
        assert_eq!(logger.named("api").named("").name(), "api");
    }

    #[test]
    fn test_with_fields_does_not_touch_parent() {
        let sink = CaptureSink::new(Severity::Debug);
        let parent = Logger::new(Arc::new(sink.clone())).named("svc");
        let child = parent.with([field("request_id", "r-7")]);

        parent.info("from parent", &[]);
        child.info("from child", &[field("step", 2)]);

        let records = sink.records.lock();
        assert!(records[0].1.is_empty());
        assert_eq!(records[1].1, vec!["request_id=r-7", "step=2"]);
        assert_eq!(records[1].0.logger_name, "svc");
    }

    #[test]
    fn test_record_carries_caller_location() {
        let sink = CaptureSink::new(Severity::Debug);
        let logger = Logger::new(Arc::new(sink.clone()));

        logger.info("located", &[]);

        let records = sink.records.lock();
        assert_eq!(records[0].0.file.as_deref(), Some(file!()));
        assert!(records[0].0.line.is_some());
    }

    #[test]
    fn test_sync_timeout_is_counted() {
        let mut sink = CaptureSink::new(Severity::Debug);
        sink.sync_result = |timeout| Err(BridgeError::sync_timeout(timeout));
        let logger = Logger::new(Arc::new(sink));

        let err = logger.sync(Duration::from_millis(5)).unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(logger.metrics().sync_timeouts(), 1);
    }
}
