//! Polling helpers and capture listeners for testing actors.
//!
//! Actor effects land asynchronously, so assertions poll: check, sleep a
//! tick, check again, up to a deadline. These helpers wrap that loop for
//! predicates, observable state, and dead letters.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::{sleep, Instant};

// Layer 3: Internal module imports
use crate::actor::{Actor, ActorRef};
use crate::dead_letters::{DeadLetter, DeadLettersListener};
use crate::message::Delivery;

/// How often the await helpers poll.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Poll `predicate` until it holds or `timeout` elapses. Returns whether
/// it ever held.
pub async fn await_assert<F>(timeout: Duration, predicate: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if predicate() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Poll an actor's observable state until `key` equals `expected` or
/// `timeout` elapses.
pub async fn await_state_value<A: Actor>(
    reference: &ActorRef<A>,
    key: &str,
    expected: &Value,
    timeout: Duration,
) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if let Delivery::Completed(state) = reference.observable_state().await {
            if state.get(key) == Some(expected) {
                return true;
            }
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Dead-letters listener that captures every record it sees.
#[derive(Default)]
pub struct TestDeadLettersListener {
    records: Mutex<Vec<DeadLetter>>,
    count: AtomicUsize,
}

impl TestDeadLettersListener {
    /// Create an empty capture listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records captured so far.
    pub fn records(&self) -> Vec<DeadLetter> {
        self.records.lock().clone()
    }

    /// Number of records captured so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Poll until at least `expected` records arrived or `timeout`
    /// elapses.
    pub async fn await_count(&self, expected: usize, timeout: Duration) -> bool {
        await_assert(timeout, || self.count() >= expected).await
    }
}

impl DeadLettersListener for TestDeadLettersListener {
    fn handle(&self, dead_letter: &DeadLetter) {
        self.records.lock().push(dead_letter.clone());
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::util::Address;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_await_assert_succeeds_when_predicate_flips() {
        let flag = Arc::new(AtomicBool::new(false));
        let task_flag = Arc::clone(&flag);
        tokio::spawn(async move {
            sleep(Duration::from_millis(30)).await;
            task_flag.store(true, Ordering::SeqCst);
        });
        assert!(
            await_assert(Duration::from_secs(1), || flag.load(Ordering::SeqCst)).await
        );
    }

    #[tokio::test]
    async fn test_await_assert_times_out() {
        assert!(!await_assert(Duration::from_millis(50), || false).await);
    }

    #[tokio::test]
    async fn test_listener_captures_records() {
        let listener = TestDeadLettersListener::new();
        listener.handle(&DeadLetter::new(Address::numeric(1), "Counter::increment"));
        listener.handle(&DeadLetter::new(Address::numeric(1), "Counter::get-value"));
        assert_eq!(listener.count(), 2);
        assert_eq!(listener.records()[0].representation(), "Counter::increment");
        assert!(listener.await_count(2, Duration::from_millis(50)).await);
    }
}
