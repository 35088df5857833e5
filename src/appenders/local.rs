//! Severity-filtered local sinks built from a structured configuration

use super::{ConsoleAppender, FileAppender, JsonAppender};
use crate::core::{
    Appender, BridgeError, Field, FieldSnapshot, LogRecord, OutputFormat, Result, Severity, Sink,
    TimestampFormat,
};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Where local records are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalOutput {
    /// stdout, with Error and Fatal on stderr
    Console,
    /// Plain file in append mode
    File(PathBuf),
    /// One JSON object per line
    JsonFile(PathBuf),
}

/// Configuration of the local sink presets
#[derive(Debug, Clone)]
pub struct LocalSinkConfig {
    pub output: LocalOutput,
    pub format: OutputFormat,
    pub timestamp_format: TimestampFormat,
    pub use_colors: bool,
}

impl Default for LocalSinkConfig {
    fn default() -> Self {
        Self::console()
    }
}

impl LocalSinkConfig {
    pub fn console() -> Self {
        Self {
            output: LocalOutput::Console,
            format: OutputFormat::Text,
            timestamp_format: TimestampFormat::default(),
            use_colors: true,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            output: LocalOutput::File(path.into()),
            use_colors: false,
            ..Self::console()
        }
    }

    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            output: LocalOutput::JsonFile(path.into()),
            format: OutputFormat::Json,
            use_colors: false,
            ..Self::console()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.timestamp_format.validate()?;
        if let LocalOutput::JsonFile(_) = self.output {
            if self.format != OutputFormat::Json {
                return Err(BridgeError::config(
                    "LocalSinkConfig",
                    format!("JSON file output cannot use {:?} format", self.format),
                ));
            }
        }
        Ok(())
    }

    fn build_appender(&self) -> Result<Box<dyn Appender>> {
        let appender: Box<dyn Appender> = match &self.output {
            LocalOutput::Console => Box::new(
                ConsoleAppender::with_colors(self.use_colors)
                    .with_output_format(self.format.clone())
                    .with_timestamp_format(self.timestamp_format.clone()),
            ),
            LocalOutput::File(path) => Box::new(
                FileAppender::new(path)?
                    .with_output_format(self.format.clone())
                    .with_timestamp_format(self.timestamp_format.clone()),
            ),
            LocalOutput::JsonFile(path) => Box::new(
                JsonAppender::new(path)?.with_timestamp_format(self.timestamp_format.clone()),
            ),
        };
        Ok(appender)
    }

    /// Build the standard preset at `standard_level` and the verbose preset
    /// at Debug, both writing through one shared appender
    pub fn build(&self, standard_level: Severity) -> Result<LocalSinks> {
        self.validate()?;
        Ok(LocalSinks::from_appender(standard_level, self.build_appender()?))
    }
}

/// The two local presets
#[derive(Clone)]
pub struct LocalSinks {
    pub standard: Arc<LocalSink>,
    pub verbose: Arc<LocalSink>,
}

impl LocalSinks {
    /// Both presets over an already built appender
    pub fn from_appender(standard_level: Severity, appender: Box<dyn Appender>) -> Self {
        let appender = Arc::new(Mutex::new(appender));
        Self {
            standard: Arc::new(LocalSink::new("standard", standard_level, Arc::clone(&appender))),
            verbose: Arc::new(LocalSink::new("verbose", Severity::Debug, appender)),
        }
    }

    pub fn sync(&self, timeout: Duration) -> Result<()> {
        self.standard.sync(timeout)?;
        self.verbose.sync(timeout)
    }
}

/// Local sink over a shared appender
#[derive(Clone)]
pub struct LocalSink {
    name: &'static str,
    level: Severity,
    appender: Arc<Mutex<Box<dyn Appender>>>,
    fields: FieldSnapshot,
}

impl LocalSink {
    pub fn new(name: &'static str, level: Severity, appender: Arc<Mutex<Box<dyn Appender>>>) -> Self {
        Self {
            name,
            level,
            appender,
            fields: FieldSnapshot::new(),
        }
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn fields(&self) -> &FieldSnapshot {
        &self.fields
    }
}

impl Sink for LocalSink {
    fn enabled(&self, level: Severity) -> bool {
        level >= self.level
    }

    fn with_fields(&self, fields: &[Field]) -> Arc<dyn Sink> {
        Arc::new(Self {
            fields: self.fields.with(fields.iter().cloned()),
            ..self.clone()
        })
    }

    fn write(&self, record: &LogRecord, fields: &[Field]) -> Result<()> {
        let merged: Vec<Field> = self.fields.merged(fields).cloned().collect();
        let mut appender = self.appender.lock();
        appender.append(record, &merged)?;
        if record.level >= Severity::Error {
            appender.flush()?;
        }
        Ok(())
    }

    fn sync(&self, _timeout: Duration) -> Result<()> {
        self.appender.lock().flush()
    }

    fn name(&self) -> &str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_presets_share_output() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("shared.log");
        let sinks = LocalSinkConfig::file(&path).build(Severity::Info)?;

        assert!(!sinks.standard.enabled(Severity::Debug));
        assert!(sinks.verbose.enabled(Severity::Debug));

        sinks.verbose.write(&LogRecord::new(Severity::Debug, "verbose line"), &[])?;
        sinks.standard.write(&LogRecord::new(Severity::Info, "standard line"), &[])?;
        sinks.sync(Duration::from_millis(10))?;

        let content = fs::read_to_string(&path)?;
        assert_eq!(content.lines().count(), 2);
        Ok(())
    }

    #[test]
    fn test_with_fields_prefixes_call_fields() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("fields.jsonl");
        let sinks = LocalSinkConfig::json_file(&path).build(Severity::Debug)?;

        let scoped = sinks.standard.with_fields(&[field("tenant", "acme")]);
        scoped.write(&LogRecord::new(Severity::Info, "hello"), &[field("step", 1)])?;
        scoped.sync(Duration::from_millis(10))?;

        let line = fs::read_to_string(&path)?;
        let parsed: serde_json::Value = serde_json::from_str(line.trim())?;
        assert_eq!(parsed["tenant"], "acme");
        assert_eq!(parsed["step"], 1);
        assert!(sinks.standard.fields().is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_configuration_is_reported() {
        let bad_pattern = LocalSinkConfig::console()
            .with_timestamp_format(TimestampFormat::Custom(String::new()));
        assert!(matches!(
            bad_pattern.build(Severity::Info),
            Err(BridgeError::InvalidConfiguration { .. })
        ));

        let mismatched = LocalSinkConfig::json_file("/tmp/never-created.jsonl")
            .with_format(OutputFormat::Logfmt);
        assert!(matches!(
            mismatched.build(Severity::Info),
            Err(BridgeError::InvalidConfiguration { .. })
        ));
    }
}
