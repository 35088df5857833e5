//! Appender trait for local log output destinations

use super::{error::Result, field::Field, record::LogRecord};

pub trait Appender: Send + Sync {
    fn append(&mut self, record: &LogRecord, fields: &[Field]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
