//! Error-reporting scopes and the client capability they submit through

use super::event::Event;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Backend client capability
///
/// `capture` is fire-and-forget: delivery failures stay inside the client.
/// `flush` returns `false` when outstanding events could not be delivered
/// within `timeout`.
pub trait EventClient: Send + Sync {
    fn capture(&self, event: Event);

    fn flush(&self, timeout: Duration) -> bool;

    /// Client for a forked scope; `None` shares this client
    fn fork(&self) -> Option<Arc<dyn EventClient>> {
        None
    }

    fn name(&self) -> &str {
        "client"
    }
}

/// Attribution data applied to every event captured through a scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    pub tags: BTreeMap<String, String>,
    pub user: Option<String>,
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Scope {
    /// Fill in scope data the event does not already carry
    pub fn apply_to(&self, event: &mut Event) {
        for (key, value) in &self.tags {
            event.tags.entry(key.clone()).or_insert_with(|| value.clone());
        }
        for (key, value) in &self.extra {
            event.extra.entry(key.clone()).or_insert_with(|| value.clone());
        }
        if event.user.is_none() {
            event.user = self.user.clone();
        }
    }
}

/// A client bound to one scope
///
/// Clones share the scope. [`fork`](Self::fork) copies it into new storage,
/// so changes made through the fork never reach the parent.
#[derive(Clone)]
pub struct ScopeHandle {
    client: Arc<dyn EventClient>,
    scope: Arc<RwLock<Scope>>,
}

impl ScopeHandle {
    pub fn new(client: Arc<dyn EventClient>) -> Self {
        Self::with_scope(client, Scope::default())
    }

    pub fn with_scope(client: Arc<dyn EventClient>, scope: Scope) -> Self {
        Self {
            client,
            scope: Arc::new(RwLock::new(scope)),
        }
    }

    pub fn client(&self) -> &Arc<dyn EventClient> {
        &self.client
    }

    pub fn set_tag(&self, key: impl Into<String>, value: impl Into<String>) {
        self.scope.write().tags.insert(key.into(), value.into());
    }

    pub fn set_user(&self, user: impl Into<String>) {
        self.scope.write().user = Some(user.into());
    }

    pub fn set_extra(&self, key: impl Into<String>, value: serde_json::Value) {
        self.scope.write().extra.insert(key.into(), value);
    }

    /// Mutate the scope under its write lock
    pub fn configure<F>(&self, f: F)
    where
        F: FnOnce(&mut Scope),
    {
        f(&mut self.scope.write());
    }

    pub fn scope(&self) -> Scope {
        self.scope.read().clone()
    }

    /// New handle with a copy of this scope
    ///
    /// The client is shared unless it supplies its own fork.
    #[must_use]
    pub fn fork(&self) -> ScopeHandle {
        let client = self
            .client
            .fork()
            .unwrap_or_else(|| Arc::clone(&self.client));
        Self::with_scope(client, self.scope())
    }

    /// Whether both handles write to the same scope storage
    pub fn same_scope(&self, other: &ScopeHandle) -> bool {
        Arc::ptr_eq(&self.scope, &other.scope)
    }

    pub fn capture_event(&self, mut event: Event) {
        self.scope.read().apply_to(&mut event);
        self.client.capture(event);
    }

    pub fn flush(&self, timeout: Duration) -> bool {
        self.client.flush(timeout)
    }
}

impl std::fmt::Debug for ScopeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeHandle")
            .field("client", &self.client.name())
            .field("scope", &*self.scope.read())
            .finish()
    }
}
