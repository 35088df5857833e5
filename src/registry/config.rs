//! Bridge configuration

use crate::appenders::LocalSinkConfig;
use crate::core::{BridgeError, Result, Severity};
use crate::report::IgnoredModules;

/// Logger name routed to the verbose local preset
pub const ENV_DEBUG_LOGGER: &str = "DEBUG";
/// Threshold of the standard local preset
pub const ENV_CONSOLE_LEVEL: &str = "LOG_CONSOLE_LEVEL";
/// Threshold for forwarding records to the backend
pub const ENV_REPORT_LEVEL: &str = "LOG_REPORT_LEVEL";

/// Explicit configuration handed to [`Bridge::new`](super::Bridge::new)
///
/// Everything here is read once when the bridge is built, except the
/// ignored-module list, which is shared and consulted on every capture.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub console_level: Severity,
    pub report_level: Severity,
    pub debug_logger_name: Option<String>,
    pub ignored_modules: IgnoredModules,
    pub local: LocalSinkConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            console_level: Severity::Info,
            report_level: Severity::Warn,
            debug_logger_name: None,
            ignored_modules: IgnoredModules::default(),
            local: LocalSinkConfig::console(),
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `DEBUG`, `LOG_CONSOLE_LEVEL` and `LOG_REPORT_LEVEL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(name) = lookup(ENV_DEBUG_LOGGER) {
            config = config.with_debug_logger(name);
        }
        if let Some(value) = lookup(ENV_CONSOLE_LEVEL) {
            config.console_level = parse_level(ENV_CONSOLE_LEVEL, &value)?;
        }
        if let Some(value) = lookup(ENV_REPORT_LEVEL) {
            config.report_level = parse_level(ENV_REPORT_LEVEL, &value)?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_console_level(mut self, level: Severity) -> Self {
        self.console_level = level;
        self
    }

    #[must_use]
    pub fn with_report_level(mut self, level: Severity) -> Self {
        self.report_level = level;
        self
    }

    /// An empty name disables debug routing
    #[must_use]
    pub fn with_debug_logger(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.debug_logger_name = if name.is_empty() { None } else { Some(name) };
        self
    }

    #[must_use]
    pub fn with_ignored_modules(mut self, ignored: IgnoredModules) -> Self {
        self.ignored_modules = ignored;
        self
    }

    #[must_use]
    pub fn with_local(mut self, local: LocalSinkConfig) -> Self {
        self.local = local;
        self
    }

    /// Whether loggers called `name` write to the verbose preset
    pub fn routes_to_verbose(&self, name: &str) -> bool {
        self.debug_logger_name.as_deref() == Some(name)
    }

    pub fn validate(&self) -> Result<()> {
        self.local.validate()
    }
}

fn parse_level(variable: &str, value: &str) -> Result<Severity> {
    value.trim().parse().map_err(|e: String| BridgeError::config(variable, e))
}
