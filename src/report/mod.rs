//! Forwarding of log records to an error-tracking backend
//!
//! - `event`: backend payload types
//! - `level`: severity mapping
//! - `stack`: stack capture with module filtering
//! - `scope`: scopes and the client capability
//! - `client`: backend client implementations
//! - `adapter`: the sink building events from records
//! - `sentry_client`: Sentry-backed client (`sentry` feature)

pub mod adapter;
pub mod client;
pub mod event;
pub mod level;
pub mod scope;
#[cfg(feature = "sentry")]
pub mod sentry_client;
pub mod stack;

pub use adapter::EventAdapter;
pub use client::{
    JsonLinesTransport, MemoryClient, NoopClient, QueuedClient, Transport, DEFAULT_QUEUE_CAPACITY,
};
pub use event::{BackendLevel, Event, Exception, StackFrame, Stacktrace, Thread};
pub use level::{map_severity, map_severity_code};
pub use scope::{EventClient, Scope, ScopeHandle};
#[cfg(feature = "sentry")]
pub use sentry_client::SentryClient;
pub use stack::{
    capture, module_matches, split_symbol, BacktraceSource, FrameSource, IgnoredModules,
    StackCapture, StaticFrames, CRATE_MODULE,
};
