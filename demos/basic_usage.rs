//! Basic bridge usage example
//!
//! Demonstrates console output, backend reporting through a queued client,
//! per-request contexts and debug logger routing.
//!
//! Run with: cargo run --example basic_usage
//! Set DEBUG=sql to route the "sql" logger to the verbose preset.

use rust_logger_bridge::prelude::*;
use rust_logger_bridge::report::JsonLinesTransport;
use rust_logger_bridge::{info, warn};
use std::io;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Logger Bridge - Basic Usage Example ===\n");

    // Events are written to stderr as JSON lines in place of a real backend
    let client = Arc::new(QueuedClient::new(JsonLinesTransport::new(io::stderr())));
    let bridge = Bridge::new(BridgeConfig::from_env()?, client)?;

    println!("1. Logging at different levels:");
    let logger = bridge.logger("app");
    logger.debug("This is a debug message (hidden)", &[]);
    logger.info("This is an info message", &[field("version", "0.1.0")]);
    logger.warn("This warning is also reported", &[field("attempt", 2)]);

    println!("\n2. Reporting an error:");
    let err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
    logger.error("Failed to reach database", &[Field::error("err", err)]);

    println!("\n3. Per-request context:");
    let (ctx, hub) = bridge.bind_new_context(&Context::background());
    if let Some(scope) = hub.scope() {
        scope.set_tag("request_id", "req-42");
    }
    let request_logger = bridge.for_context(&ctx).logger("http");
    info!(request_logger, "GET /users took {}ms", 12);
    warn!(request_logger, "GET /orders took {}ms", 2300);

    println!("\n4. Debug logger routing:");
    bridge.logger("sql").debug("SELECT * FROM users", &[]);

    bridge.sync(DEFAULT_SYNC_TIMEOUT)?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
