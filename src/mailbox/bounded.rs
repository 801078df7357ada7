//! Capacity-limited FIFO mailbox with overflow policies.

// Layer 1: Standard library imports
use std::sync::{Arc, Weak};

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::core::MailboxCore;
use super::traits::{Dispatch, Mailbox, OverflowPolicy};
use crate::actor::Actor;
use crate::dead_letters::DeadLetters;
use crate::message::Invocation;
use crate::util::Address;

// What to do with a displaced invocation once the state lock is released.
enum Overflow<A: Actor> {
    DiscardDropped(Box<dyn Invocation<A>>),
    RouteToDeadLetters(Box<dyn Invocation<A>>),
}

/// Mailbox with a hard capacity and a configurable overflow policy.
///
/// | Policy       | When full                                               |
/// |--------------|----------------------------------------------------------|
/// | `DropOldest` | evict the head (settled dropped), append the newcomer    |
/// | `DropNewest` | settle the newcomer dropped                              |
/// | `Reject`     | route the newcomer to dead letters                       |
///
/// Every overflow increments the drop counter. Dropped messages are never
/// delivered.
pub struct BoundedMailbox<A: Actor> {
    core: Arc<MailboxCore<A>>,
    capacity: usize,
    policy: OverflowPolicy,
}

impl<A: Actor> BoundedMailbox<A> {
    /// Create a mailbox holding at most `capacity` messages.
    pub fn new(
        label: impl Into<String>,
        address: Address,
        dead_letters: Arc<DeadLetters>,
        capacity: usize,
        policy: OverflowPolicy,
    ) -> Self {
        Self {
            core: Arc::new(MailboxCore::new(label.into(), address, dead_letters)),
            capacity,
            policy,
        }
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The configured overflow policy.
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// True while the queue is at capacity.
    pub fn is_full(&self) -> bool {
        self.size() >= self.capacity
    }
}

impl<A: Actor> Mailbox<A> for BoundedMailbox<A> {
    fn send(&self, invocation: Box<dyn Invocation<A>>) {
        let (overflow, start_worker) = {
            let mut state = self.core.state.lock();
            if state.closed {
                drop(state);
                self.core.route_to_dead_letters(invocation);
                return;
            }
            if state.queue.len() >= self.capacity {
                match self.policy {
                    OverflowPolicy::DropOldest => {
                        let evicted = state.queue.pop_front();
                        state.queue.push_back(invocation);
                        let start = !state.suspended && !state.dispatching;
                        if start {
                            state.dispatching = true;
                        }
                        (evicted.map(Overflow::DiscardDropped), start)
                    }
                    OverflowPolicy::DropNewest => {
                        (Some(Overflow::DiscardDropped(invocation)), false)
                    }
                    OverflowPolicy::Reject => {
                        (Some(Overflow::RouteToDeadLetters(invocation)), false)
                    }
                }
            } else {
                state.queue.push_back(invocation);
                let start = !state.suspended && !state.dispatching;
                if start {
                    state.dispatching = true;
                }
                (None, start)
            }
        };

        match overflow {
            Some(Overflow::DiscardDropped(displaced)) => {
                self.core.record_dropped();
                displaced.discard();
            }
            Some(Overflow::RouteToDeadLetters(displaced)) => {
                self.core.record_dropped();
                self.core.route_to_dead_letters(displaced);
            }
            None => {}
        }
        if start_worker {
            MailboxCore::kick(&self.core);
        }
    }

    fn suspend(&self) {
        self.core.suspend();
    }

    fn resume(&self) {
        MailboxCore::resume(&self.core);
    }

    fn close(&self) {
        self.core.close();
    }

    fn is_suspended(&self) -> bool {
        self.core.is_suspended()
    }

    fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    fn is_receivable(&self) -> bool {
        self.core.size() > 0
    }

    fn size(&self) -> usize {
        self.core.size()
    }

    fn dropped_count(&self) -> u64 {
        self.core.dropped_count()
    }

    fn attach(&self, dispatcher: Weak<dyn Dispatch<A>>) {
        self.core.attach(dispatcher);
    }
}
