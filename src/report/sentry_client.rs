//! Sentry-backed event client
//!
//! Events are converted to the Sentry protocol and captured on a
//! `sentry::Hub`. Forking a scope forks the hub with
//! `Hub::new_from_top`, so each bound context gets its own Sentry scope
//! while sharing the underlying client and transport.

use super::event::{BackendLevel, Event, StackFrame, Stacktrace};
use super::scope::EventClient;
use sentry::protocol;
use sentry::{ClientOptions, Hub};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// [`EventClient`] capturing on a Sentry hub
#[derive(Clone)]
pub struct SentryClient {
    hub: Arc<Hub>,
}

impl SentryClient {
    /// Client on a fresh hub with an empty Sentry scope
    pub fn new(client: Arc<sentry::Client>) -> Self {
        Self::from_hub(Arc::new(Hub::new(
            Some(client),
            Arc::new(sentry::Scope::default()),
        )))
    }

    /// Build a Sentry client from `options` (a DSN string works)
    pub fn from_options(options: impl Into<ClientOptions>) -> Self {
        Self::new(Arc::new(sentry::Client::from_config(options)))
    }

    pub fn from_hub(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    /// The hub of the calling thread, as set up by `sentry::init`
    pub fn current() -> Self {
        Self::from_hub(Hub::current())
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }
}

impl EventClient for SentryClient {
    fn capture(&self, event: Event) {
        self.hub.capture_event(to_sentry_event(&event));
    }

    fn flush(&self, timeout: Duration) -> bool {
        match self.hub.client() {
            Some(client) => client.flush(Some(timeout)),
            None => true,
        }
    }

    fn fork(&self) -> Option<Arc<dyn EventClient>> {
        let hub = Hub::new_from_top(Arc::clone(&self.hub));
        Some(Arc::new(Self::from_hub(Arc::new(hub))))
    }

    fn name(&self) -> &str {
        "sentry"
    }
}

impl std::fmt::Debug for SentryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryClient")
            .field("bound", &self.hub.client().is_some())
            .finish()
    }
}

pub fn to_sentry_level(level: BackendLevel) -> protocol::Level {
    match level {
        BackendLevel::Debug => protocol::Level::Debug,
        BackendLevel::Info => protocol::Level::Info,
        BackendLevel::Warning => protocol::Level::Warning,
        BackendLevel::Error => protocol::Level::Error,
        BackendLevel::Fatal => protocol::Level::Fatal,
    }
}

/// Sentry protocol form of `event`; an exception or a thread, never both
pub fn to_sentry_event(event: &Event) -> protocol::Event<'static> {
    let mut out: protocol::Event<'static> = Default::default();
    out.event_id = event.event_id;
    out.level = to_sentry_level(event.level);
    out.message = Some(event.message.clone());
    out.timestamp = SystemTime::from(event.timestamp);
    if !event.logger.is_empty() {
        out.logger = Some(event.logger.clone());
    }
    out.tags = event.tags.clone();
    out.extra = event.extra.clone();

    if let Some(id) = &event.user {
        let mut user = protocol::User::default();
        user.id = Some(id.clone());
        out.user = Some(user);
    }

    if let Some(exception) = event.exception() {
        let mut mapped = protocol::Exception::default();
        mapped.ty = exception.ty.clone();
        mapped.value = Some(exception.value.clone());
        mapped.stacktrace = exception.stacktrace.as_ref().map(to_sentry_stacktrace);
        out.exception = vec![mapped].into();
    } else if let Some(thread) = event.thread() {
        let mut mapped = protocol::Thread::default();
        mapped.id = Some(protocol::ThreadId::String(thread.id.clone()));
        mapped.name = thread.name.clone();
        mapped.current = thread.current;
        mapped.stacktrace = Some(to_sentry_stacktrace(&thread.stacktrace));
        out.threads = vec![mapped].into();
    }

    out
}

fn to_sentry_stacktrace(trace: &Stacktrace) -> protocol::Stacktrace {
    let mut mapped = protocol::Stacktrace::default();
    mapped.frames = trace.frames().iter().map(to_sentry_frame).collect();
    mapped
}

fn to_sentry_frame(frame: &StackFrame) -> protocol::Frame {
    let mut mapped = protocol::Frame::default();
    mapped.module = Some(frame.module.clone());
    mapped.function = Some(frame.function.clone());
    mapped.filename = frame.filename.clone();
    mapped.lineno = frame.lineno.map(u64::from);
    mapped.in_app = Some(true);
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::event::{Exception, Thread};
    use crate::report::scope::ScopeHandle;
    use serde_json::json;

    fn trace() -> Stacktrace {
        Stacktrace::from_frames(vec![
            StackFrame::new("app", "main").at("src/main.rs", 3),
            StackFrame::new("app::db", "query").at("src/db.rs", 40),
        ])
        .expect("two frames")
    }

    #[test]
    fn test_thread_event_mapping() {
        let mut event = Event::new("slow query", BackendLevel::Warning);
        event.logger = "db".into();
        event.tags.insert("region".into(), "eu".into());
        event.extra.insert("rows".into(), json!(12));
        event.user = Some("u-1".into());
        event.attach_thread(Thread {
            id: "ThreadId(3)".into(),
            name: Some("worker".into()),
            current: true,
            stacktrace: trace(),
        });

        let mapped = to_sentry_event(&event);
        assert_eq!(mapped.event_id, event.event_id);
        assert_eq!(mapped.level, protocol::Level::Warning);
        assert_eq!(mapped.message.as_deref(), Some("slow query"));
        assert_eq!(mapped.logger.as_deref(), Some("db"));
        assert_eq!(mapped.tags["region"], "eu");
        assert_eq!(mapped.extra["rows"], json!(12));
        assert_eq!(mapped.user.as_ref().and_then(|u| u.id.as_deref()), Some("u-1"));
        assert!(mapped.exception.values.is_empty());

        let thread = &mapped.threads.values[0];
        assert_eq!(thread.name.as_deref(), Some("worker"));
        let frames = &thread.stacktrace.as_ref().expect("stacktrace").frames;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].function.as_deref(), Some("query"));
        assert_eq!(frames[1].lineno, Some(40));
    }

    #[test]
    fn test_exception_event_mapping() {
        let mut event = Event::new("dial failed: connection refused", BackendLevel::Error);
        event.attach_exception(Exception {
            ty: "std::io::error::Error".into(),
            value: "connection refused".into(),
            stacktrace: Some(trace()),
        });

        let mapped = to_sentry_event(&event);
        assert!(mapped.threads.values.is_empty());
        let exception = &mapped.exception.values[0];
        assert_eq!(exception.ty, "std::io::error::Error");
        assert_eq!(exception.value.as_deref(), Some("connection refused"));
        assert!(exception.stacktrace.is_some());
    }

    #[test]
    fn test_events_reach_sentry_transport() {
        let events = sentry::test::with_captured_events(|| {
            let client = SentryClient::current();
            client.capture(Event::new("reported", BackendLevel::Error));
            assert!(client.flush(Duration::from_secs(1)));
        });

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message.as_deref(), Some("reported"));
        assert_eq!(events[0].level, protocol::Level::Error);
    }

    #[test]
    fn test_forked_scope_forks_sentry_hub() {
        let events = sentry::test::with_captured_events(|| {
            let root = ScopeHandle::new(Arc::new(SentryClient::current()));
            let forked = root.fork();
            assert!(!Arc::ptr_eq(root.client(), forked.client()));

            forked.set_tag("request", "r-1");
            forked.capture_event(Event::new("from fork", BackendLevel::Error));
            root.capture_event(Event::new("from root", BackendLevel::Error));
        });

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].tags["request"], "r-1");
        assert!(!events[1].tags.contains_key("request"));
    }
}
