//! Per-context logger registries

use super::config::BridgeConfig;
use crate::appenders::LocalSinks;
use crate::core::{BridgeMetrics, Logger, Result, Sink, Tee};
use crate::report::{EventAdapter, EventClient, FrameSource, ScopeHandle, StackCapture};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared construction state for every hub of one bridge
pub(crate) struct LoggerFactory {
    config: BridgeConfig,
    local: LocalSinks,
    root: ScopeHandle,
    stack: StackCapture,
    metrics: Arc<BridgeMetrics>,
}

impl LoggerFactory {
    pub(crate) fn new(
        config: BridgeConfig,
        client: Arc<dyn EventClient>,
        source: Arc<dyn FrameSource>,
    ) -> Result<Self> {
        let local = config.local.build(config.console_level)?;
        Ok(Self::with_local(config, local, client, source))
    }

    pub(crate) fn with_local(
        config: BridgeConfig,
        local: LocalSinks,
        client: Arc<dyn EventClient>,
        source: Arc<dyn FrameSource>,
    ) -> Self {
        let stack = StackCapture::with_source(config.ignored_modules.clone(), source);
        Self {
            config,
            local,
            root: ScopeHandle::new(client),
            stack,
            metrics: Arc::new(BridgeMetrics::new()),
        }
    }

    pub(crate) fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub(crate) fn local(&self) -> &LocalSinks {
        &self.local
    }

    pub(crate) fn root(&self) -> &ScopeHandle {
        &self.root
    }

    pub(crate) fn metrics(&self) -> &Arc<BridgeMetrics> {
        &self.metrics
    }

    /// Tee of the local preset for `name` and an adapter bound to `scope`
    fn build(&self, name: &str, scope: &ScopeHandle) -> Logger {
        let local: Arc<dyn Sink> = if self.config.routes_to_verbose(name) {
            self.local.verbose.clone()
        } else {
            self.local.standard.clone()
        };
        let adapter: Arc<dyn Sink> = Arc::new(
            EventAdapter::new(self.config.report_level, scope.clone(), self.stack.clone())
                .with_metrics(Arc::clone(&self.metrics)),
        );

        self.metrics.record_logger_constructed();
        Logger::with_metrics(Arc::new(Tee::new(vec![local, adapter])), Arc::clone(&self.metrics))
            .named(name)
    }
}

struct HubState {
    scope: Option<ScopeHandle>,
    loggers: HashMap<String, Arc<Logger>>,
}

/// Cache of one logger per name, bound to one error-reporting scope
///
/// An unscoped hub adopts the bridge's root scope on its first `logger`
/// call. Lookup and construction happen under a single lock, so a name is
/// never built twice.
pub struct Hub {
    factory: Arc<LoggerFactory>,
    state: Mutex<HubState>,
}

impl Hub {
    pub(crate) fn unscoped(factory: Arc<LoggerFactory>) -> Self {
        Self::from_parts(factory, None)
    }

    pub(crate) fn scoped(factory: Arc<LoggerFactory>, scope: ScopeHandle) -> Self {
        Self::from_parts(factory, Some(scope))
    }

    fn from_parts(factory: Arc<LoggerFactory>, scope: Option<ScopeHandle>) -> Self {
        Self {
            factory,
            state: Mutex::new(HubState {
                scope,
                loggers: HashMap::new(),
            }),
        }
    }

    /// The cached logger for `name`, built on first request
    pub fn logger(&self, name: &str) -> Arc<Logger> {
        let mut state = self.state.lock();
        let scope = state
            .scope
            .get_or_insert_with(|| self.factory.root().clone())
            .clone();

        if let Some(logger) = state.loggers.get(name) {
            return Arc::clone(logger);
        }

        let logger = Arc::new(self.factory.build(name, &scope));
        state.loggers.insert(name.to_string(), Arc::clone(&logger));
        logger
    }

    /// Bound scope; `None` until an unscoped hub builds its first logger
    pub fn scope(&self) -> Option<ScopeHandle> {
        self.state.lock().scope.clone()
    }

    pub fn is_scoped(&self) -> bool {
        self.state.lock().scope.is_some()
    }

    pub fn cached_loggers(&self) -> usize {
        self.state.lock().loggers.len()
    }

    pub fn metrics(&self) -> &BridgeMetrics {
        self.factory.metrics()
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        let mut names: Vec<&String> = state.loggers.keys().collect();
        names.sort();
        f.debug_struct("Hub")
            .field("scoped", &state.scope.is_some())
            .field("loggers", &names)
            .finish()
    }
}
