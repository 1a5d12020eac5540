//! Retry lifecycle events and the observers that consume them.
//!
//! Every execution reports what it is doing through a `RetryObserver`. Events are delivered
//! synchronously on the executing thread or task, so observers must be cheap and must not
//! block. The default observer discards everything; `LogObserver` forwards to `tracing`, and
//! `MemoryObserver` keeps a bounded buffer for assertions in tests.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Events emitted by `RetryExecutor` during a single execution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryEvent {
    /// A retry is about to be made.
    ///
    /// Emitted before waiting; `attempt` is the (1-indexed) attempt that just failed.
    Attempt { label: String, attempt: usize, delay: Duration },
    /// The operation succeeded.
    Succeeded { label: String, attempts: usize },
    /// The operation failed with an error the caller marked as non-retryable.
    NonRetryable { label: String, attempt: usize },
    /// All attempts failed.
    Exhausted { label: String, attempts: usize, elapsed: Duration },
    /// The cancellation token fired.
    Cancelled { label: String, attempts: usize },
}

impl RetryEvent {
    pub fn label(&self) -> &str {
        match self {
            RetryEvent::Attempt { label, .. }
            | RetryEvent::Succeeded { label, .. }
            | RetryEvent::NonRetryable { label, .. }
            | RetryEvent::Exhausted { label, .. }
            | RetryEvent::Cancelled { label, .. } => label,
        }
    }
}

impl fmt::Display for RetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryEvent::Attempt { label, attempt, delay } => {
                write!(f, "Attempt({}, #{}, delay={:?})", label, attempt, delay)
            }
            RetryEvent::Succeeded { label, attempts } => {
                write!(f, "Succeeded({}, attempts={})", label, attempts)
            }
            RetryEvent::NonRetryable { label, attempt } => {
                write!(f, "NonRetryable({}, #{})", label, attempt)
            }
            RetryEvent::Exhausted { label, attempts, elapsed } => {
                write!(f, "Exhausted({}, attempts={}, elapsed={:?})", label, attempts, elapsed)
            }
            RetryEvent::Cancelled { label, attempts } => {
                write!(f, "Cancelled({}, attempts={})", label, attempts)
            }
        }
    }
}

/// Consumer of retry events.
pub trait RetryObserver: Send + Sync + fmt::Debug {
    fn observe(&self, event: &RetryEvent);

    /// When false the executor skips building events entirely.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Observer that discards all events.
#[derive(Clone, Debug, Default)]
pub struct NullObserver;

impl RetryObserver for NullObserver {
    fn observe(&self, _event: &RetryEvent) {}

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Observer that logs events using the `tracing` crate.
#[derive(Clone, Debug, Default)]
pub struct LogObserver;

impl RetryObserver for LogObserver {
    fn observe(&self, event: &RetryEvent) {
        tracing::info!(event = %event, "retry_event");
    }
}

/// Observer that stores events in memory, dropping the oldest once full.
#[derive(Clone, Debug)]
pub struct MemoryObserver {
    events: Arc<Mutex<Vec<RetryEvent>>>,
    capacity: usize,
    evicted: Arc<AtomicU64>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            capacity: capacity.max(1),
            evicted: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn events(&self) -> Vec<RetryEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    /// Delays of every `Attempt` event, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                RetryEvent::Attempt { delay, .. } => Some(*delay),
                _ => None,
            })
            .collect()
    }
}

impl Default for MemoryObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryObserver for MemoryObserver {
    fn observe(&self, event: &RetryEvent) {
        let mut events = self.events.lock().unwrap();
        if events.len() >= self.capacity {
            events.remove(0);
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(n: usize) -> RetryEvent {
        RetryEvent::Attempt { label: "op".into(), attempt: n, delay: Duration::from_millis(10) }
    }

    #[test]
    fn memory_observer_records_in_order() {
        let observer = MemoryObserver::new();
        observer.observe(&attempt(1));
        observer.observe(&RetryEvent::Succeeded { label: "op".into(), attempts: 2 });

        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], attempt(1));
        assert!(matches!(events[1], RetryEvent::Succeeded { attempts: 2, .. }));
        assert_eq!(observer.delays(), vec![Duration::from_millis(10)]);
    }

    #[test]
    fn memory_observer_evicts_oldest() {
        let observer = MemoryObserver::with_capacity(2);
        for n in 1..=3 {
            observer.observe(&attempt(n));
        }
        assert_eq!(observer.len(), 2);
        assert_eq!(observer.evicted(), 1);
        assert_eq!(observer.events()[0], attempt(2));

        observer.clear();
        assert!(observer.is_empty());
    }

    #[test]
    fn null_observer_is_disabled() {
        assert!(!NullObserver.is_enabled());
        assert!(LogObserver.is_enabled());
        assert!(MemoryObserver::new().is_enabled());
    }

    #[test]
    fn event_display_includes_label() {
        let event = RetryEvent::Exhausted {
            label: "sync_orders".into(),
            attempts: 3,
            elapsed: Duration::from_millis(30),
        };
        let text = event.to_string();
        assert!(text.contains("sync_orders"));
        assert!(text.contains("attempts=3"));
        assert_eq!(event.label(), "sync_orders");
    }
}
