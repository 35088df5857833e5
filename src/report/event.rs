//! Events submitted to the error-tracking backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Backend severity scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendLevel {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl BackendLevel {
    /// The most severe backend level
    pub const MAX: BackendLevel = BackendLevel::Fatal;

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendLevel::Debug => "debug",
            BackendLevel::Info => "info",
            BackendLevel::Warning => "warning",
            BackendLevel::Error => "error",
            BackendLevel::Fatal => "fatal",
        }
    }
}

impl fmt::Display for BackendLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call-stack frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub module: String,
    pub function: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>,
}

impl StackFrame {
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            filename: None,
            lineno: None,
        }
    }

    #[must_use]
    pub fn at(mut self, filename: impl Into<String>, lineno: u32) -> Self {
        self.filename = Some(filename.into());
        self.lineno = Some(lineno);
        self
    }
}

/// Non-empty sequence of frames, outermost caller first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stacktrace {
    frames: Vec<StackFrame>,
}

impl Stacktrace {
    /// `None` when there are no frames; an empty trace is never built
    pub fn from_frames(frames: Vec<StackFrame>) -> Option<Self> {
        if frames.is_empty() {
            None
        } else {
            Some(Self { frames })
        }
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    #[serde(rename = "type")]
    pub ty: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<Stacktrace>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub current: bool,
    pub stacktrace: Stacktrace,
}

/// Backend-facing payload
///
/// At most one of exception and thread is attached; attaching one clears
/// the other.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub event_id: Uuid,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub logger: String,
    pub level: BackendLevel,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exception: Option<Exception>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread: Option<Thread>,
}

impl Event {
    pub fn new(message: impl Into<String>, level: BackendLevel) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            message: message.into(),
            timestamp: Utc::now(),
            logger: String::new(),
            level,
            extra: BTreeMap::new(),
            tags: BTreeMap::new(),
            user: None,
            exception: None,
            thread: None,
        }
    }

    pub fn exception(&self) -> Option<&Exception> {
        self.exception.as_ref()
    }

    pub fn thread(&self) -> Option<&Thread> {
        self.thread.as_ref()
    }

    pub fn attach_exception(&mut self, exception: Exception) {
        self.thread = None;
        self.exception = Some(exception);
    }

    pub fn attach_thread(&mut self, thread: Thread) {
        self.exception = None;
        self.thread = Some(thread);
    }
}
