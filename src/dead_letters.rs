//! Sink and listener registry for undeliverable messages.
//!
//! Closed mailboxes, the `Reject` overflow policy, and stop-time queue
//! drains all route here. Each record is multicast to the registered
//! listeners in registration order; a listener that panics is isolated
//! and logged so the remaining listeners still observe the record.

// Layer 1: Standard library imports
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

// Layer 3: Internal module imports
use crate::util::Address;

/// Record of a message that could not be delivered.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    destination: Address,
    representation: String,
    timestamp: DateTime<Utc>,
}

impl DeadLetter {
    /// Create a record for a failed delivery.
    pub fn new(destination: Address, representation: impl Into<String>) -> Self {
        Self {
            destination,
            representation: representation.into(),
            timestamp: Utc::now(),
        }
    }

    /// The address the message was meant for.
    pub fn destination(&self) -> &Address {
        &self.destination
    }

    /// Human-readable description of the invocation (`Type::message`).
    pub fn representation(&self) -> &str {
        &self.representation
    }

    /// When the failed delivery was recorded.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl fmt::Display for DeadLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dead letter: {} -> {}", self.representation, self.destination)
    }
}

/// Observer of dead letters.
pub trait DeadLettersListener: Send + Sync {
    /// Called once per record, in registration order.
    fn handle(&self, dead_letter: &DeadLetter);
}

/// The stage-wide dead-letter sink.
#[derive(Default)]
pub struct DeadLetters {
    listeners: Mutex<Vec<Arc<dyn DeadLettersListener>>>,
    total: AtomicU64,
}

impl DeadLetters {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners are never removed; their lifetime is
    /// the stage's.
    pub fn register_listener(&self, listener: Arc<dyn DeadLettersListener>) {
        self.listeners.lock().push(listener);
    }

    /// Record a failed delivery and multicast it.
    pub fn failed_delivery(&self, dead_letter: DeadLetter) {
        self.total.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            destination = %dead_letter.destination(),
            representation = %dead_letter.representation(),
            "dead letter"
        );
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.handle(&dead_letter)));
            if outcome.is_err() {
                tracing::warn!(
                    representation = %dead_letter.representation(),
                    "dead-letters listener panicked"
                );
            }
        }
    }

    /// Total records seen since the stage started.
    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for DeadLetters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeadLetters")
            .field("listeners", &self.listeners.lock().len())
            .field("total", &self.total_count())
            .finish()
    }
}
