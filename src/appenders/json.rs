//! JSON appender for structured logging

use super::file::open_append;
use crate::core::output_format::json_object;
use crate::core::{Appender, Field, LogRecord, Result, TimestampFormat};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// JSON file appender for structured logging
///
/// Writes each record as a single-line JSON object (JSONL format).
pub struct JsonAppender {
    writer: BufWriter<File>,
    timestamp_format: TimestampFormat,
}

impl JsonAppender {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = open_append(path.as_ref())?;

        Ok(Self {
            writer: BufWriter::new(file),
            timestamp_format: TimestampFormat::default(),
        })
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

impl Appender for JsonAppender {
    fn name(&self) -> &str {
        "json"
    }

    fn append(&mut self, record: &LogRecord, fields: &[Field]) -> Result<()> {
        let value = json_object(record, fields, &self.timestamp_format);
        serde_json::to_writer(&mut self.writer, &value)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
