//! Sink that turns log records into backend events
//!
//! For each record the adapter merges its stored fields with the call-site
//! fields, picks the first non-null error field as the event's exception and
//! encodes everything else as extra data. Events without an error carry the
//! current thread's filtered stack instead, when one is available.

use super::event::{Event, Exception, Thread};
use super::level::map_severity;
use super::scope::ScopeHandle;
use super::stack::StackCapture;
use crate::core::{
    BridgeError, BridgeMetrics, ErrorValue, Field, FieldSnapshot, LogRecord, Result, Severity,
    Sink,
};
use std::sync::Arc;
use std::time::Duration;

/// Immutable adapter value: threshold, scope, stack capture and fields
#[derive(Clone)]
pub struct EventAdapter {
    threshold: Severity,
    scope: ScopeHandle,
    fields: FieldSnapshot,
    stack: StackCapture,
    metrics: Arc<BridgeMetrics>,
}

impl EventAdapter {
    pub fn new(threshold: Severity, scope: ScopeHandle, stack: StackCapture) -> Self {
        Self {
            threshold,
            scope,
            fields: FieldSnapshot::new(),
            stack,
            metrics: Arc::new(BridgeMetrics::new()),
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<BridgeMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    pub fn scope(&self) -> &ScopeHandle {
        &self.scope
    }

    pub fn fields(&self) -> &FieldSnapshot {
        &self.fields
    }

    /// Adapter sharing threshold and scope, with `extra` appended to the
    /// stored fields
    #[must_use]
    pub fn extended<I>(&self, extra: I) -> EventAdapter
    where
        I: IntoIterator<Item = Field>,
    {
        Self {
            fields: self.fields.with(extra),
            ..self.clone()
        }
    }

    /// Build the event for `record` without submitting it
    pub fn build_event(&self, record: &LogRecord, fields: &[Field]) -> Event {
        let mut event = Event::new(record.message.clone(), map_severity(record.level));
        event.timestamp = record.timestamp;
        event.logger = record.logger_name.clone();

        let mut designated: Option<&ErrorValue> = None;
        for field in self.fields.merged(fields) {
            if designated.is_none() {
                if let Some(error) = field.as_error() {
                    designated = Some(error);
                    continue;
                }
            }
            event
                .extra
                .insert(field.key().to_string(), field.value().to_json_value());
        }

        match designated {
            Some(error) => {
                let description = error.description();
                event.message = format!("{}: {}", record.message, description);
                event.attach_exception(Exception {
                    ty: error.type_name().to_string(),
                    value: description,
                    stacktrace: self.stack.capture(),
                });
            }
            None => {
                if let Some(stacktrace) = self.stack.capture() {
                    event.attach_thread(Thread {
                        id: record.thread_id.clone(),
                        name: record.thread_name.clone(),
                        current: true,
                        stacktrace,
                    });
                }
            }
        }

        event
    }
}

impl Sink for EventAdapter {
    fn enabled(&self, level: Severity) -> bool {
        level >= self.threshold
    }

    fn with_fields(&self, fields: &[Field]) -> Arc<dyn Sink> {
        Arc::new(self.extended(fields.iter().cloned()))
    }

    fn write(&self, record: &LogRecord, fields: &[Field]) -> Result<()> {
        let event = self.build_event(record, fields);
        self.scope.capture_event(event);
        self.metrics.record_event_reported();
        Ok(())
    }

    fn sync(&self, timeout: Duration) -> Result<()> {
        if self.scope.flush(timeout) {
            Ok(())
        } else {
            Err(BridgeError::sync_timeout(timeout))
        }
    }

    fn name(&self) -> &str {
        "event_adapter"
    }
}

impl std::fmt::Debug for EventAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventAdapter")
            .field("threshold", &self.threshold)
            .field("fields", &self.fields.keys())
            .finish_non_exhaustive()
    }
}
