//! Core logger types and traits

pub mod appender;
pub mod error;
pub mod field;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod record;
pub mod severity;
pub mod sink;
pub mod timestamp;

pub use appender::Appender;
pub use error::{BridgeError, Result};
pub use field::{field, ErrorValue, Field, FieldSnapshot, FieldValue};
pub use logger::{Logger, DEFAULT_SYNC_TIMEOUT};
pub use metrics::BridgeMetrics;
pub use output_format::OutputFormat;
pub use record::LogRecord;
pub use severity::Severity;
pub use sink::{Sink, Tee};
pub use timestamp::TimestampFormat;
