//! Log record structure

use super::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Identifier of the calling thread, cached per thread
pub fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Name of the calling thread, cached per thread
pub fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub logger_name: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub thread_id: String,
    pub thread_name: Option<String>,
}

impl LogRecord {
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            logger_name: String::new(),
            file: None,
            line: None,
            thread_id: current_thread_id(),
            thread_name: current_thread_name(),
        }
    }

    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    pub fn with_location(mut self, file: &str, line: u32) -> Self {
        self.file = Some(file.to_string());
        self.line = Some(line);
        self
    }

    /// Message with newlines, carriage returns and tabs escaped
    ///
    /// Text outputs use this so a message cannot forge extra log lines.
    pub fn sanitized_message(&self) -> String {
        self.message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }
}
