//! File appender implementation

use crate::core::{
    Appender, BridgeError, Field, LogRecord, OutputFormat, Result, TimestampFormat,
};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct FileAppender {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl FileAppender {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::Text,
        })
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open `path` for appending, creating it if needed
pub(crate) fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| BridgeError::io_operation("opening log file", path.display().to_string(), e))
}

impl Appender for FileAppender {
    fn append(&mut self, record: &LogRecord, fields: &[Field]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| BridgeError::writer("File writer not initialized"))?;

        let mut output = self
            .output_format
            .format(record, fields, &self.timestamp_format);
        output.push('\n');

        writer.write_all(output.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{field, Severity};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_appender_writes_one_line_per_record() -> Result<()> {
        let dir = tempdir()?;
        let log_path = dir.path().join("app.log");

        let mut appender = FileAppender::new(&log_path)?;
        let record = LogRecord::new(Severity::Info, "multi\nline").with_logger_name("svc");
        appender.append(&record, &[field("user", "alice")])?;
        appender.append(&LogRecord::new(Severity::Warn, "second"), &[])?;
        appender.flush()?;

        let content = fs::read_to_string(&log_path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("svc - multi\\nline user=alice"));
        Ok(())
    }

    #[test]
    fn test_unopenable_path_is_io_operation_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing").join("app.log");

        let err = FileAppender::new(missing).err().expect("open must fail");
        assert!(matches!(err, BridgeError::IoOperation { .. }));
    }
}
