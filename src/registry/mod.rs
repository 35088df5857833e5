//! Logger registries and context binding

pub mod bridge;
pub mod config;
pub mod context;
pub mod hub;

pub use bridge::{bind_new_context, for_context, global, init, logger, Bridge};
pub use config::{BridgeConfig, ENV_CONSOLE_LEVEL, ENV_DEBUG_LOGGER, ENV_REPORT_LEVEL};
pub use context::Context;
pub use hub::Hub;
