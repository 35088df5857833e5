//! Console appender implementation

use crate::core::{
    Appender, Field, LogRecord, OutputFormat, Result, Severity, TimestampFormat,
};
#[cfg(feature = "console")]
use colored::Colorize;

pub struct ConsoleAppender {
    use_colors: bool,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_colors(true)
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        }
    }

    /// Set the output format for this appender
    ///
    /// # Example
    ///
    /// ```
    /// use rust_logger_bridge::appenders::ConsoleAppender;
    /// use rust_logger_bridge::OutputFormat;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_output_format(OutputFormat::Json);
    /// ```
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Format as text with optional colors
    fn format_text(&self, record: &LogRecord, fields: &[Field]) -> String {
        let line = OutputFormat::Text.format(record, fields, &self.timestamp_format);
        if !self.use_colors {
            return line;
        }
        colorize_level(line, record.level)
    }
}

#[cfg(feature = "console")]
fn colorize_level(line: String, level: Severity) -> String {
    let plain = format!("[{:5}]", level.to_str());
    let colored = format!("[{}]", format!("{:5}", level.to_str()).color(level.color_code()));
    line.replacen(&plain, &colored, 1)
}

#[cfg(not(feature = "console"))]
fn colorize_level(line: String, _level: Severity) -> String {
    line
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, record: &LogRecord, fields: &[Field]) -> Result<()> {
        let output = match self.output_format {
            OutputFormat::Text => self.format_text(record, fields),
            OutputFormat::Json | OutputFormat::Logfmt => {
                self.output_format
                    .format(record, fields, &self.timestamp_format)
            }
        };

        // Route Error and Fatal levels to stderr, others to stdout
        match record.level {
            Severity::Error | Severity::Fatal => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_when_colors_disabled() {
        let appender = ConsoleAppender::with_colors(false);
        let record = LogRecord::new(Severity::Warn, "plain").with_logger_name("svc");
        let line = appender.format_text(&record, &[]);
        assert!(line.contains("[WARN ] svc - plain"));
    }

    #[test]
    fn test_append_and_flush() {
        let mut appender = ConsoleAppender::with_colors(false);
        let record = LogRecord::new(Severity::Info, "console works");
        assert!(appender.append(&record, &[]).is_ok());
        assert!(appender.flush().is_ok());
    }
}
