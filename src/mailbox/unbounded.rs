//! Unbounded FIFO mailbox.

// Layer 1: Standard library imports
use std::sync::{Arc, Weak};

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::core::MailboxCore;
use super::traits::{Dispatch, Mailbox};
use crate::actor::Actor;
use crate::dead_letters::DeadLetters;
use crate::message::Invocation;
use crate::util::Address;

/// Mailbox without a capacity limit.
///
/// Sends never drop for capacity reasons; memory is the only bound. This
/// is the default mailbox and the right choice for actors whose senders
/// are finite or already paced by awaiting completions.
pub struct UnboundedMailbox<A: Actor> {
    core: Arc<MailboxCore<A>>,
}

impl<A: Actor> UnboundedMailbox<A> {
    /// Create a mailbox for the actor at `address`.
    pub fn new(label: impl Into<String>, address: Address, dead_letters: Arc<DeadLetters>) -> Self {
        Self {
            core: Arc::new(MailboxCore::new(label.into(), address, dead_letters)),
        }
    }
}

impl<A: Actor> Mailbox<A> for UnboundedMailbox<A> {
    fn send(&self, invocation: Box<dyn Invocation<A>>) {
        MailboxCore::enqueue(&self.core, invocation);
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
