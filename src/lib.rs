//! # Rust Logger Bridge
//!
//! Structured logging that writes records to a local console or file sink and
//! forwards qualifying records to an error-tracking backend as enriched
//! events.
//!
//! ## Features
//!
//! - **Two destinations per logger**: a local sink at the console threshold
//!   and an event adapter at the reporting threshold
//! - **Error extraction**: the first error field becomes the event's exception
//! - **Filtered stack traces**: frames from ignored modules never reach the backend
//! - **Per-context hubs**: isolated error-reporting scopes with cached loggers
//! - **Sentry backend** (`sentry` feature): `report::SentryClient` captures
//!   events on a `sentry::Hub`, forking the hub per bound context
//!
//! ## Example
//!
//! ```no_run
//! use rust_logger_bridge::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let bridge = Bridge::new(BridgeConfig::from_env()?, Arc::new(MemoryClient::new()))?;
//!
//! let (ctx, hub) = bridge.bind_new_context(&Context::background());
//! hub.scope().expect("bound hubs are scoped").set_tag("request", "r-1");
//!
//! let logger = bridge.for_context(&ctx).logger("db");
//! logger.warn("slow query", &[field("ms", 1200)]);
//!
//! bridge.sync(Duration::from_secs(3))?;
//! # Ok::<(), rust_logger_bridge::BridgeError>(())
//! ```

pub mod appenders;
pub mod core;
pub mod macros;
pub mod registry;
pub mod report;

pub mod prelude {
    pub use crate::appenders::{LocalOutput, LocalSinkConfig};
    pub use crate::core::{
        field, BridgeError, Field, FieldSnapshot, FieldValue, Logger, OutputFormat, Result,
        Severity, Sink, TimestampFormat, DEFAULT_SYNC_TIMEOUT,
    };
    pub use crate::registry::{Bridge, BridgeConfig, Context, Hub};
    pub use crate::report::{
        EventClient, IgnoredModules, MemoryClient, NoopClient, QueuedClient, ScopeHandle,
    };
}

pub use appenders::{ConsoleAppender, FileAppender, JsonAppender, LocalSinkConfig};
pub use core::{
    field, Appender, BridgeError, BridgeMetrics, Field, FieldSnapshot, FieldValue, LogRecord,
    Logger, OutputFormat, Result, Severity, Sink, Tee, TimestampFormat, DEFAULT_SYNC_TIMEOUT,
};
pub use registry::{
    bind_new_context, for_context, global, init, logger, Bridge, BridgeConfig, Context, Hub,
};
pub use report::{
    BackendLevel, Event, EventAdapter, EventClient, IgnoredModules, MemoryClient, NoopClient,
    QueuedClient, ScopeHandle, StackCapture,
};
