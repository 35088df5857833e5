//! Backend clients
//!
//! - `NoopClient`: discards events
//! - `MemoryClient`: keeps events in memory
//! - `QueuedClient`: hands events to a worker thread that feeds a `Transport`

use super::event::Event;
use super::scope::EventClient;
use crate::appenders::file::open_append;
use crate::core::{Result, DEFAULT_SYNC_TIMEOUT};
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::{Condvar, Mutex, RwLock};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default capacity of the queued client's channel
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Client that accepts and discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClient;

impl EventClient for NoopClient {
    fn capture(&self, _event: Event) {}

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Client that records captured events
#[derive(Debug, Default)]
pub struct MemoryClient {
    events: Mutex<Vec<Event>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventClient for MemoryClient {
    fn capture(&self, event: Event) {
        self.events.lock().push(event);
    }

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Delivery of single events, driven by the queued client's worker
pub trait Transport: Send {
    fn send(&mut self, event: &Event) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

/// Writes each event as one JSON object per line
pub struct JsonLinesTransport<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesTransport<BufWriter<File>> {
    /// Append to the file at `path`, creating it if missing
    pub fn to_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(BufWriter::new(open_append(path.as_ref())?)))
    }
}

impl<W: Write + Send> Transport for JsonLinesTransport<W> {
    fn send(&mut self, event: &Event) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json_lines"
    }
}

/// Count of events accepted but not yet handed to the transport
#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    drained: Condvar,
}

impl Pending {
    fn add(&self) {
        *self.count.lock() += 1;
    }

    fn done(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.drained.notify_all();
        }
    }

    fn wait_drained(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.count.lock();
        while *count > 0 {
            if self.drained.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }
}

/// Client delivering events from a worker thread
///
/// `capture` never blocks: when the queue is full the event is dropped and
/// counted. `flush` waits until every accepted event has been handed to the
/// transport, or the timeout passes.
pub struct QueuedClient {
    sender: RwLock<Option<Sender<Event>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    pending: Arc<Pending>,
    dropped: AtomicU64,
    delivered: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
}

impl QueuedClient {
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self::with_capacity(transport, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity<T: Transport + 'static>(mut transport: T, capacity: usize) -> Self {
        let (sender, receiver) = bounded::<Event>(capacity.max(1));
        let pending = Arc::new(Pending::default());
        let delivered = Arc::new(AtomicU64::new(0));
        let failures = Arc::new(AtomicU64::new(0));

        let worker_pending = Arc::clone(&pending);
        let worker_delivered = Arc::clone(&delivered);
        let worker_failures = Arc::clone(&failures);

        let handle = thread::spawn(move || {
            for event in receiver.iter() {
                let outcome = catch_unwind(AssertUnwindSafe(|| -> Result<()> {
                    transport.send(&event)?;
                    if receiver.is_empty() {
                        transport.flush()?;
                    }
                    Ok(())
                }));

                match outcome {
                    Ok(Ok(())) => {
                        worker_delivered.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(Err(e)) => {
                        worker_failures.fetch_add(1, Ordering::Relaxed);
                        eprintln!(
                            "[LOGGER ERROR] Transport '{}' failed to send event {}: {}",
                            transport.name(),
                            event.event_id,
                            e
                        );
                    }
                    Err(panic) => {
                        worker_failures.fetch_add(1, Ordering::Relaxed);
                        let message = panic
                            .downcast_ref::<&str>()
                            .map(|s| s.to_string())
                            .or_else(|| panic.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| "unknown panic".to_string());
                        eprintln!(
                            "[LOGGER CRITICAL] Transport '{}' panicked: {}. Event {} was lost.",
                            transport.name(),
                            message,
                            event.event_id
                        );
                    }
                }
                worker_pending.done();
            }

            if let Err(e) = transport.flush() {
                eprintln!("[LOGGER ERROR] Transport '{}' final flush failed: {}", transport.name(), e);
            }
        });

        Self {
            sender: RwLock::new(Some(sender)),
            worker: Mutex::new(Some(handle)),
            pending,
            dropped: AtomicU64::new(0),
            delivered,
            failures,
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    fn record_dropped(&self) {
        let previous = self.dropped.fetch_add(1, Ordering::Relaxed);
        if previous == 0 || (previous + 1) % 1000 == 0 {
            eprintln!(
                "[LOGGER WARNING] Event queue full, {} events dropped.",
                previous + 1
            );
        }
    }

    /// Stop accepting events and wait up to `timeout` for the worker to drain
    ///
    /// Returns `false` when the worker did not finish in time.
    pub fn close(&self, timeout: Duration) -> bool {
        drop(self.sender.write().take());

        let Some(handle) = self.worker.lock().take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Event worker thread panicked: {:?}", e);
                    return false;
                }
                return true;
            }
            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Event worker did not finish within {:?}. Some events may be lost.",
                    timeout
                );
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl EventClient for QueuedClient {
    fn capture(&self, event: Event) {
        let sender = self.sender.read();
        let Some(sender) = sender.as_ref() else {
            self.record_dropped();
            return;
        };

        self.pending.add();
        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.pending.done();
                self.record_dropped();
            }
            Err(TrySendError::Disconnected(_)) => {
                self.pending.done();
                self.record_dropped();
                eprintln!("[LOGGER ERROR] Event worker is gone, event dropped");
            }
        }
    }

    fn flush(&self, timeout: Duration) -> bool {
        self.pending.wait_drained(timeout)
    }

    fn name(&self) -> &str {
        "queued"
    }
}

impl Drop for QueuedClient {
    fn drop(&mut self) {
        self.close(DEFAULT_SYNC_TIMEOUT);

        let dropped = self.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Event client shutting down with {} dropped events",
                dropped
            );
        }
    }
}

impl std::fmt::Debug for QueuedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedClient")
            .field("pending", &*self.pending.count.lock())
            .field("dropped", &self.dropped_count())
            .field("delivered", &self.delivered_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BridgeError;
    use crate::report::event::BackendLevel;
    use crossbeam_channel::Receiver;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Blocks on every send until the gate is released
    struct GatedTransport {
        gate: Receiver<()>,
    }

    impl Transport for GatedTransport {
        fn send(&mut self, _event: &Event) -> Result<()> {
            let _ = self.gate.recv();
            Ok(())
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn send(&mut self, _event: &Event) -> Result<()> {
            Err(BridgeError::writer("backend unreachable"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_memory_client_records_events() {
        let client = MemoryClient::new();
        client.capture(Event::new("one", BackendLevel::Error));
        client.capture(Event::new("two", BackendLevel::Warning));
        assert_eq!(client.len(), 2);
        assert!(client.flush(Duration::ZERO));
        client.clear();
        assert!(client.is_empty());
    }

    #[test]
    fn test_queued_client_delivers_json_lines() {
        let buffer = SharedBuffer::default();
        let client = QueuedClient::new(JsonLinesTransport::new(buffer.clone()));

        for i in 0..5 {
            client.capture(Event::new(format!("event {}", i), BackendLevel::Error));
        }
        assert!(client.flush(Duration::from_secs(5)));
        assert_eq!(client.delivered_count(), 5);

        let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["message"], "event 0");
        assert_eq!(first["level"], "error");
    }

    #[test]
    fn test_flush_times_out_on_stuck_transport() {
        let (release, gate) = bounded::<()>(0);
        let client = QueuedClient::new(GatedTransport { gate });
        client.capture(Event::new("stuck", BackendLevel::Error));

        let start = Instant::now();
        assert!(!client.flush(Duration::from_millis(100)));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_secs(2));

        drop(release);
        assert!(client.flush(Duration::from_secs(5)));
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let (release, gate) = bounded::<()>(0);
        let client = QueuedClient::with_capacity(GatedTransport { gate }, 1);

        // One event held by the worker, one queued, the rest dropped
        for i in 0..10 {
            client.capture(Event::new(format!("e{}", i), BackendLevel::Error));
            thread::sleep(Duration::from_millis(5));
        }
        assert!(client.dropped_count() >= 8);

        drop(release);
        assert!(client.close(Duration::from_secs(5)));
    }

    #[test]
    fn test_transport_failures_are_counted_not_returned() {
        let client = QueuedClient::new(FailingTransport);
        client.capture(Event::new("lost", BackendLevel::Error));
        assert!(client.flush(Duration::from_secs(5)));
        assert_eq!(client.failure_count(), 1);
        assert_eq!(client.delivered_count(), 0);
    }

    #[test]
    fn test_capture_after_close_is_dropped() {
        let client = QueuedClient::new(JsonLinesTransport::new(SharedBuffer::default()));
        assert!(client.close(Duration::from_secs(5)));
        client.capture(Event::new("late", BackendLevel::Error));
        assert_eq!(client.dropped_count(), 1);
        assert!(client.flush(Duration::ZERO));
    }
}
