//! The bridge: root scope, background hub and context binding
//!
//! A [`Bridge`] owns the local sinks and the root error-reporting scope.
//! Hubs derive from it, either the shared background hub or one hub per
//! bound context. One bridge can be installed process-wide with [`init`];
//! [`global`] falls back to console output without backend reporting when
//! nothing was installed.

use super::config::BridgeConfig;
use super::context::Context;
use super::hub::{Hub, LoggerFactory};
use crate::appenders::{ConsoleAppender, LocalSinks};
use crate::core::{BridgeError, BridgeMetrics, Logger, Result, DEFAULT_SYNC_TIMEOUT};
use crate::report::{
    BacktraceSource, EventClient, FrameSource, IgnoredModules, NoopClient, ScopeHandle,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;

static GLOBAL: OnceCell<Bridge> = OnceCell::new();

pub struct Bridge {
    factory: Arc<LoggerFactory>,
    background: Arc<Hub>,
}

impl Bridge {
    /// Build the local sinks and bind the root scope to `client`
    ///
    /// Local sink failures are returned; nothing falls back silently.
    pub fn new(config: BridgeConfig, client: Arc<dyn EventClient>) -> Result<Self> {
        Self::with_frame_source(config, client, Arc::new(BacktraceSource))
    }

    /// Like [`new`](Self::new) with a custom frame source for stack capture
    pub fn with_frame_source(
        config: BridgeConfig,
        client: Arc<dyn EventClient>,
        source: Arc<dyn FrameSource>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_factory(LoggerFactory::new(config, client, source)?))
    }

    /// Console output configured from the environment, events discarded
    pub fn fallback() -> Self {
        Self::fallback_from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`fallback`](Self::fallback) with a custom variable source
    ///
    /// Unparseable values are reported on stderr and the defaults are used.
    pub fn fallback_from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = BridgeConfig::from_lookup(lookup).unwrap_or_else(|e| {
            eprintln!("[LOGGER WARNING] Ignoring logging environment: {}", e);
            BridgeConfig::default()
        });
        let local = LocalSinks::from_appender(config.console_level, Box::new(ConsoleAppender::new()));
        Self::from_factory(LoggerFactory::with_local(
            config,
            local,
            Arc::new(NoopClient),
            Arc::new(BacktraceSource),
        ))
    }

    fn from_factory(factory: LoggerFactory) -> Self {
        let factory = Arc::new(factory);
        Self {
            background: Arc::new(Hub::unscoped(Arc::clone(&factory))),
            factory,
        }
    }

    /// The hub used when no context-bound hub exists
    pub fn background(&self) -> &Arc<Hub> {
        &self.background
    }

    /// Fresh unscoped hub with an empty cache
    pub fn new_hub(&self) -> Hub {
        Hub::unscoped(Arc::clone(&self.factory))
    }

    /// Logger from the background hub
    pub fn logger(&self, name: &str) -> Arc<Logger> {
        self.background.logger(name)
    }

    /// Hub bound to `ctx`, or the background hub
    pub fn for_context(&self, ctx: &Context) -> Arc<Hub> {
        ctx.hub()
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.background))
    }

    /// Bind a new hub on a forked scope
    ///
    /// The scope carried by `ctx` is forked, or the root scope when `ctx`
    /// has none. The returned context carries both the forked scope and the
    /// new hub, whose cache starts empty.
    pub fn bind_new_context(&self, ctx: &Context) -> (Context, Arc<Hub>) {
        let scope = ctx.scope().unwrap_or(self.factory.root()).fork();
        let hub = Arc::new(Hub::scoped(Arc::clone(&self.factory), scope.clone()));
        let bound = ctx.with_scope(scope).with_hub(Arc::clone(&hub));
        (bound, hub)
    }

    pub fn root_scope(&self) -> &ScopeHandle {
        self.factory.root()
    }

    pub fn config(&self) -> &BridgeConfig {
        self.factory.config()
    }

    /// The shared ignored-module list; changes apply to the next capture
    pub fn ignored_modules(&self) -> &IgnoredModules {
        &self.factory.config().ignored_modules
    }

    pub fn metrics(&self) -> &BridgeMetrics {
        self.factory.metrics()
    }

    /// Flush local output and wait up to `timeout` for backend delivery
    pub fn sync(&self, timeout: Duration) -> Result<()> {
        self.factory.local().sync(timeout)?;
        if self.factory.root().flush(timeout) {
            Ok(())
        } else {
            self.factory.metrics().record_sync_timeout();
            Err(BridgeError::sync_timeout(timeout))
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("config", self.factory.config())
            .field("background", &self.background)
            .finish()
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Err(e) = self.sync(DEFAULT_SYNC_TIMEOUT) {
            eprintln!("[LOGGER WARNING] Bridge shutdown sync failed: {}", e);
        }
    }
}

/// Install the process-wide bridge
///
/// Fails with [`BridgeError::AlreadyInitialized`] once a bridge is installed,
/// including the fallback installed by an earlier [`global`] call.
pub fn init(config: BridgeConfig, client: Arc<dyn EventClient>) -> Result<&'static Bridge> {
    let mut installed = false;
    let bridge = GLOBAL.get_or_try_init(|| {
        installed = true;
        Bridge::new(config, client)
    })?;
    if installed {
        Ok(bridge)
    } else {
        Err(BridgeError::AlreadyInitialized)
    }
}

/// The process-wide bridge, installing the fallback if `init` never ran
pub fn global() -> &'static Bridge {
    GLOBAL.get_or_init(Bridge::fallback)
}

/// Logger from the process-wide background hub
pub fn logger(name: &str) -> Arc<Logger> {
    global().logger(name)
}

pub fn for_context(ctx: &Context) -> Arc<Hub> {
    global().for_context(ctx)
}

pub fn bind_new_context(ctx: &Context) -> (Context, Arc<Hub>) {
    global().bind_new_context(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{MemoryClient, StaticFrames};

    fn bridge() -> (Bridge, Arc<MemoryClient>) {
        let client = Arc::new(MemoryClient::new());
        let bridge = Bridge::with_frame_source(
            BridgeConfig::default(),
            client.clone(),
            Arc::new(StaticFrames::default()),
        )
        .unwrap();
        (bridge, client)
    }

    #[test]
    fn test_for_context_without_binding_is_background() {
        let (bridge, _) = bridge();
        let hub = bridge.for_context(&Context::background());
        assert!(Arc::ptr_eq(&hub, bridge.background()));
    }

    #[test]
    fn test_bind_new_context_forks_scope() {
        let (bridge, _) = bridge();
        bridge.root_scope().set_tag("service", "api");

        let (ctx, hub) = bridge.bind_new_context(&Context::background());
        assert!(Arc::ptr_eq(&bridge.for_context(&ctx), &hub));
        assert_eq!(hub.cached_loggers(), 0);

        let scope = ctx.scope().expect("bound scope");
        assert!(!scope.same_scope(bridge.root_scope()));
        scope.set_tag("request", "r-7");
        assert_eq!(scope.scope().tags["service"], "api");
        assert!(!bridge.root_scope().scope().tags.contains_key("request"));

        // Nested binding forks the context's scope, not the root
        let (nested, _) = bridge.bind_new_context(&ctx);
        assert_eq!(nested.scope().expect("nested").scope().tags["request"], "r-7");
    }

    #[test]
    fn test_bound_hubs_do_not_share_loggers() {
        let (bridge, client) = bridge();
        let (_, first) = bridge.bind_new_context(&Context::background());
        let (_, second) = bridge.bind_new_context(&Context::background());

        let a = first.logger("jobs");
        let b = second.logger("jobs");
        assert!(!Arc::ptr_eq(&a, &b));

        first.scope().expect("scope").set_user("alice");
        a.error("first", &[]);
        b.error("second", &[]);

        let events = client.events();
        assert_eq!(events[0].user.as_deref(), Some("alice"));
        assert_eq!(events[1].user, None);
    }

    #[test]
    fn test_fallback_reads_environment() {
        let bridge = Bridge::fallback_from_lookup(|key| match key {
            "DEBUG" => Some("db".to_string()),
            "LOG_REPORT_LEVEL" => Some("error".to_string()),
            _ => None,
        });
        assert_eq!(bridge.config().debug_logger_name.as_deref(), Some("db"));
        assert!(bridge.config().routes_to_verbose("db"));
        assert_eq!(bridge.config().report_level, crate::core::Severity::Error);
    }

    #[test]
    fn test_fallback_ignores_invalid_environment() {
        let bridge = Bridge::fallback_from_lookup(|key| match key {
            "DEBUG" => Some("db".to_string()),
            "LOG_CONSOLE_LEVEL" => Some("loud".to_string()),
            _ => None,
        });
        assert_eq!(bridge.config().debug_logger_name, None);
        assert_eq!(bridge.config().console_level, crate::core::Severity::Info);
    }

    #[test]
    fn test_invalid_local_configuration_fails_construction() {
        let config = BridgeConfig::default().with_local(
            crate::appenders::LocalSinkConfig::console()
                .with_timestamp_format(crate::core::TimestampFormat::Custom(String::new())),
        );
        let result = Bridge::new(config, Arc::new(MemoryClient::new()));
        assert!(matches!(result, Err(BridgeError::InvalidConfiguration { .. })));
    }
}
