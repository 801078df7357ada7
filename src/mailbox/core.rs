//! Shared queue state and the single-worker dispatch loop.
//!
//! Both mailbox variants sit on this core. The `dispatching` flag lives
//! under the same lock as the queue and the suspended/closed flags: a
//! worker is started in the same critical section that observes there is
//! none, and a finishing worker re-checks for work arrived during its
//! drain before giving the flag up. That is the whole single-worker
//! discipline; without it a burst of sends would spawn a task per message.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::traits::Dispatch;
use crate::actor::Actor;
use crate::dead_letters::{DeadLetter, DeadLetters};
use crate::message::Invocation;
use crate::util::Address;

pub(crate) struct CoreState<A: Actor> {
    pub(crate) queue: VecDeque<Box<dyn Invocation<A>>>,
    pub(crate) suspended: bool,
    pub(crate) closed: bool,
    pub(crate) dispatching: bool,
}

pub(crate) struct MailboxCore<A: Actor> {
    label: String,
    address: Address,
    dead_letters: Arc<DeadLetters>,
    dispatcher: OnceLock<Weak<dyn Dispatch<A>>>,
    pub(crate) state: Mutex<CoreState<A>>,
    dropped: AtomicU64,
}

impl<A: Actor> MailboxCore<A> {
    pub(crate) fn new(label: String, address: Address, dead_letters: Arc<DeadLetters>) -> Self {
        Self {
            label,
            address,
            dead_letters,
            dispatcher: OnceLock::new(),
            state: Mutex::new(CoreState {
                queue: VecDeque::new(),
                suspended: false,
                closed: false,
                dispatching: false,
            }),
            dropped: AtomicU64::new(0),
        }
    }

    pub(crate) fn attach(&self, dispatcher: Weak<dyn Dispatch<A>>) {
        let _ = self.dispatcher.set(dispatcher);
    }

    /// Append and start a worker if none is running. The caller has
    /// already handled capacity concerns.
    pub(crate) fn enqueue(core: &Arc<Self>, invocation: Box<dyn Invocation<A>>) {
        let start_worker = {
            let mut state = core.state.lock();
            if state.closed {
                drop(state);
                core.route_to_dead_letters(invocation);
                return;
            }
            state.queue.push_back(invocation);
            if !state.suspended && !state.dispatching {
                state.dispatching = true;
                true
            } else {
                false
            }
        };
        if start_worker {
            Self::kick(core);
        }
    }

    pub(crate) fn suspend(&self) {
        self.state.lock().suspended = true;
    }

    pub(crate) fn resume(core: &Arc<Self>) {
        let start_worker = {
            let mut state = core.state.lock();
            state.suspended = false;
            if !state.closed && !state.dispatching && !state.queue.is_empty() {
                state.dispatching = true;
                true
            } else {
                false
            }
        };
        if start_worker {
            Self::kick(core);
        }
    }

    /// Close and drain. Undelivered queue entries become dead letters so
    /// their completions settle and at-most-once accounting stays exact.
    pub(crate) fn close(&self) {
        let drained = {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.queue.drain(..).collect::<Vec<_>>()
        };
        for invocation in drained {
            self.route_to_dead_letters(invocation);
        }
    }

    pub(crate) fn is_suspended(&self) -> bool {
        self.state.lock().suspended
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub(crate) fn size(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub(crate) fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the invocation as a dead letter and settle it dropped.
    pub(crate) fn route_to_dead_letters(&self, invocation: Box<dyn Invocation<A>>) {
        let representation = format!("{}::{}", self.label, invocation.description());
        self.dead_letters
            .failed_delivery(DeadLetter::new(self.address.clone(), representation));
        invocation.discard();
    }

    /// Spawn a dispatch worker. The caller must have set `dispatching`
    /// under the state lock.
    pub(crate) fn kick(core: &Arc<Self>) {
        let core = Arc::clone(core);
        tokio::spawn(async move {
            core.run_worker().await;
        });
    }

    async fn run_worker(self: Arc<Self>) {
        loop {
            let invocation = {
                let mut state = self.state.lock();
                if state.suspended || state.closed {
                    break;
                }
                match state.queue.pop_front() {
                    Some(invocation) => invocation,
                    None => break,
                }
            };
            match self.dispatcher.get().and_then(Weak::upgrade) {
                Some(dispatcher) => dispatcher.deliver(invocation).await,
                None => self.route_to_dead_letters(invocation),
            }
        }
        // Messages may have arrived while the last delivery was in
        // flight; hand the flag back only if there is truly nothing to do.
        let restart = {
            let mut state = self.state.lock();
            state.dispatching = false;
            if !state.suspended && !state.closed && !state.queue.is_empty() {
                state.dispatching = true;
                true
            } else {
                false
            }
        };
        if restart {
            Self::kick(&self);
        }
    }
}
