//! Execution contexts carrying a scope and a hub

use super::hub::Hub;
use crate::report::ScopeHandle;
use std::sync::Arc;

/// Immutable context value passed along with a unit of work
///
/// A context may carry an error-reporting scope and a bound hub. The `with_*`
/// methods return new values and leave the receiver unchanged.
#[derive(Clone, Default)]
pub struct Context {
    scope: Option<ScopeHandle>,
    hub: Option<Arc<Hub>>,
}

impl Context {
    /// Context with nothing bound
    pub fn background() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scope(&self, scope: ScopeHandle) -> Self {
        Self {
            scope: Some(scope),
            hub: self.hub.clone(),
        }
    }

    #[must_use]
    pub fn with_hub(&self, hub: Arc<Hub>) -> Self {
        Self {
            scope: self.scope.clone(),
            hub: Some(hub),
        }
    }

    pub fn scope(&self) -> Option<&ScopeHandle> {
        self.scope.as_ref()
    }

    pub fn hub(&self) -> Option<&Arc<Hub>> {
        self.hub.as_ref()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("scope", &self.scope.is_some())
            .field("hub", &self.hub.is_some())
            .finish()
    }
}
