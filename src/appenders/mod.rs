//! Local output destinations

pub mod console;
pub mod file;
pub mod json;
pub mod local;

pub use console::ConsoleAppender;
pub use file::FileAppender;
pub use json::JsonAppender;
pub use local::{LocalOutput, LocalSink, LocalSinkConfig, LocalSinks};

pub use crate::core::Appender;
