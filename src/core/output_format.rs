//! Output format configuration for local log lines
//!
//! - Text: Human-readable format (default)
//! - Json: Machine-readable JSON format
//! - Logfmt: Key-value format compatible with log aggregation tools

use super::field::{format_fields, Field, FieldValue};
use super::record::LogRecord;
use super::timestamp::TimestampFormat;

/// Output format for log records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Example: `[2025-01-08T10:30:45.123Z] [INFO ] api.users - Request processed`
    #[default]
    Text,

    /// Example: `{"timestamp":"2025-01-08T10:30:45.123Z","level":"INFO","message":"Request processed"}`
    Json,

    /// Example: `timestamp=2025-01-08T10:30:45.123Z level=INFO message="Request processed"`
    Logfmt,
}

impl OutputFormat {
    /// Format a record and its fields according to this output format
    pub fn format(
        &self,
        record: &LogRecord,
        fields: &[Field],
        timestamp_format: &TimestampFormat,
    ) -> String {
        match self {
            OutputFormat::Text => self.format_text(record, fields, timestamp_format),
            OutputFormat::Json => self.format_json(record, fields, timestamp_format),
            OutputFormat::Logfmt => self.format_logfmt(record, fields, timestamp_format),
        }
    }

    fn format_text(
        &self,
        record: &LogRecord,
        fields: &[Field],
        timestamp_format: &TimestampFormat,
    ) -> String {
        let base = format!(
            "[{}] [{:5}] {} - {}",
            timestamp_format.format(&record.timestamp),
            record.level.to_str(),
            display_name(record),
            record.sanitized_message()
        );

        if fields.is_empty() {
            base
        } else {
            format!("{} {}", base, format_fields(fields.iter()))
        }
    }

    fn format_json(
        &self,
        record: &LogRecord,
        fields: &[Field],
        timestamp_format: &TimestampFormat,
    ) -> String {
        serde_json::to_string(&json_object(record, fields, timestamp_format)).unwrap_or_default()
    }

    fn format_logfmt(
        &self,
        record: &LogRecord,
        fields: &[Field],
        timestamp_format: &TimestampFormat,
    ) -> String {
        let mut parts = Vec::new();

        parts.push(format!(
            "timestamp={}",
            escape_logfmt_value(&timestamp_format.format(&record.timestamp))
        ));
        parts.push(format!("level={}", record.level.to_str()));
        if !record.logger_name.is_empty() {
            parts.push(format!("logger={}", escape_logfmt_value(&record.logger_name)));
        }
        // Message is always quoted
        parts.push(format!("message={}", quote_logfmt_value(&record.message)));
        parts.push(format!("thread_id={}", escape_logfmt_value(&record.thread_id)));

        if let Some(ref file) = record.file {
            parts.push(format!("file={}", escape_logfmt_value(file)));
        }
        if let Some(line) = record.line {
            parts.push(format!("line={}", line));
        }

        for f in fields {
            let formatted_value = match f.value() {
                FieldValue::String(s) => quote_logfmt_value(s),
                FieldValue::Error(Some(e)) => quote_logfmt_value(&e.description()),
                other => other.to_string(),
            };
            parts.push(format!("{}={}", escape_logfmt_key(f.key()), formatted_value));
        }

        parts.join(" ")
    }
}

/// JSON object for one record; later fields overwrite earlier keys
pub(crate) fn json_object(
    record: &LogRecord,
    fields: &[Field],
    timestamp_format: &TimestampFormat,
) -> serde_json::Value {
    let mut json_obj = serde_json::Map::new();

    let timestamp = match timestamp_format {
        TimestampFormat::Unix => serde_json::Value::from(record.timestamp.timestamp()),
        TimestampFormat::UnixMillis => serde_json::Value::from(record.timestamp.timestamp_millis()),
        TimestampFormat::UnixMicros => serde_json::Value::from(record.timestamp.timestamp_micros()),
        _ => serde_json::Value::String(timestamp_format.format(&record.timestamp)),
    };
    json_obj.insert("timestamp".to_string(), timestamp);
    json_obj.insert(
        "level".to_string(),
        serde_json::Value::String(record.level.to_str().to_string()),
    );
    if !record.logger_name.is_empty() {
        json_obj.insert(
            "logger".to_string(),
            serde_json::Value::String(record.logger_name.clone()),
        );
    }
    json_obj.insert(
        "message".to_string(),
        serde_json::Value::String(record.message.clone()),
    );
    json_obj.insert(
        "thread_id".to_string(),
        serde_json::Value::String(record.thread_id.clone()),
    );
    if let Some(ref name) = record.thread_name {
        json_obj.insert(
            "thread_name".to_string(),
            serde_json::Value::String(name.clone()),
        );
    }
    if let Some(ref file) = record.file {
        json_obj.insert("file".to_string(), serde_json::Value::String(file.clone()));
    }
    if let Some(line) = record.line {
        json_obj.insert("line".to_string(), serde_json::Value::from(line));
    }

    for f in fields {
        json_obj.insert(f.key().to_string(), f.value().to_json_value());
    }

    serde_json::Value::Object(json_obj)
}

fn display_name(record: &LogRecord) -> &str {
    if record.logger_name.is_empty() {
        record.thread_name.as_deref().unwrap_or(&record.thread_id)
    } else {
        &record.logger_name
    }
}

/// Escape a logfmt key (remove spaces and special chars)
fn escape_logfmt_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || *c == '.')
        .collect()
}

/// Escape a logfmt value (quote if contains spaces)
fn escape_logfmt_value(value: &str) -> String {
    if value.contains(' ') || value.contains('"') || value.contains('=') {
        quote_logfmt_value(value)
    } else {
        value.to_string()
    }
}

fn quote_logfmt_value(value: &str) -> String {
    format!(
        "\"{}\"",
        value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    )
}
