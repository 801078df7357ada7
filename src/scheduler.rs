//! Delayed and repeating task execution with cancellation.
//!
//! Timing is cooperative: tasks ride the tokio timer wheel and callers
//! must not rely on sub-10-ms accuracy. Actions that panic are caught and
//! logged; a repeating schedule keeps ticking afterwards.

// Layer 1: Standard library imports
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

// Layer 3: Internal module imports
// (none)

#[derive(Default)]
struct CancelState {
    cancelled: AtomicBool,
    completed: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CancelState {
    fn cancel(&self) -> bool {
        if self.completed.load(Ordering::SeqCst) {
            return false;
        }
        let first = !self.cancelled.swap(true, Ordering::SeqCst);
        if first {
            if let Some(handle) = self.handle.lock().take() {
                handle.abort();
            }
        }
        first
    }
}

/// Handle to a scheduled task.
///
/// `cancel` returns true the first time it actually prevents or stops
/// future executions, false on every later call and false once a one-shot
/// task has already run.
#[derive(Clone)]
pub struct Cancellable {
    state: Arc<CancelState>,
}

impl Cancellable {
    fn already_cancelled() -> Self {
        let state = CancelState::default();
        state.cancelled.store(true, Ordering::SeqCst);
        state.completed.store(true, Ordering::SeqCst);
        Self {
            state: Arc::new(state),
        }
    }

    /// Prevent or stop future executions.
    pub fn cancel(&self) -> bool {
        self.state.cancel()
    }

    /// True once cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }
}

/// Stage-owned task scheduler.
pub struct Scheduler {
    resolution: Duration,
    closed: AtomicBool,
    tasks: Mutex<Vec<Weak<CancelState>>>,
}

impl Scheduler {
    /// Create a scheduler. `resolution` is the floor for repeat
    /// intervals and a hint for how precise timing can be.
    pub fn new(resolution: Duration) -> Self {
        Self {
            resolution,
            closed: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// The configured resolution hint.
    pub fn resolution(&self) -> Duration {
        self.resolution
    }

    /// Run `action` once after `delay`.
    pub fn schedule_once<F>(&self, delay: Duration, action: F) -> Cancellable
    where
        F: FnOnce() + Send + 'static,
    {
        if self.closed.load(Ordering::SeqCst) {
            return Cancellable::already_cancelled();
        }
        let state = Arc::new(CancelState::default());
        let task_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            if task_state.cancelled.load(Ordering::SeqCst) {
                return;
            }
            run_guarded(AssertUnwindSafe(action));
            task_state.completed.store(true, Ordering::SeqCst);
        });
        *state.handle.lock() = Some(handle);
        self.remember(&state);
        Cancellable { state }
    }

    /// Run `action` after `initial_delay` and then every `interval`.
    /// Intervals shorter than the resolution hint are raised to it.
    pub fn schedule_repeat<F>(
        &self,
        initial_delay: Duration,
        interval: Duration,
        action: F,
    ) -> Cancellable
    where
        F: Fn() + Send + 'static,
    {
        if self.closed.load(Ordering::SeqCst) {
            return Cancellable::already_cancelled();
        }
        let interval = interval.max(self.resolution);
        let state = Arc::new(CancelState::default());
        let task_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            sleep(initial_delay).await;
            loop {
                if task_state.cancelled.load(Ordering::SeqCst) {
                    break;
                }
                run_guarded(AssertUnwindSafe(&action));
                sleep(interval).await;
            }
        });
        *state.handle.lock() = Some(handle);
        self.remember(&state);
        Cancellable { state }
    }

    /// Cancel every outstanding task. Later schedule calls return
    /// already-cancelled handles.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let tasks: Vec<Weak<CancelState>> = {
            let mut tasks = self.tasks.lock();
            tasks.drain(..).collect()
        };
        for task in tasks {
            if let Some(state) = task.upgrade() {
                state.cancel();
            }
        }
    }

    fn remember(&self, state: &Arc<CancelState>) {
        let mut tasks = self.tasks.lock();
        tasks.retain(|task| task.strong_count() > 0);
        tasks.push(Arc::downgrade(state));
    }
}

fn run_guarded<F: FnOnce()>(action: AssertUnwindSafe<F>) {
    if catch_unwind(action).is_err() {
        tracing::warn!("scheduled action panicked");
    }
}
