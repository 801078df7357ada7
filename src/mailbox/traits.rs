//! Mailbox contract and configuration types.

// Layer 1: Standard library imports
use std::sync::{Arc, Weak};

// Layer 2: Third-party crate imports
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::actor::Actor;
use crate::message::Invocation;

/// FIFO message queue owned by exactly one actor.
///
/// `send` is a synchronous enqueue, so per-sender ordering follows program
/// order. Delivery is driven by a single dispatch worker: there is exactly
/// one worker while the mailbox has work and is neither suspended nor
/// closed, and zero workers otherwise. Custom implementations must keep
/// that invariant; it is what serializes the actor.
pub trait Mailbox<A: Actor>: Send + Sync {
    /// Enqueue one invocation. A closed mailbox routes it to dead letters
    /// and settles its completion as dropped instead.
    fn send(&self, invocation: Box<dyn Invocation<A>>);

    /// Stop driving delivery. Messages are retained.
    fn suspend(&self);

    /// Start driving delivery again; kicks a worker if work is pending.
    fn resume(&self);

    /// Close permanently. Queued messages are drained to dead letters and
    /// every later `send` goes there too.
    fn close(&self);

    /// True while delivery is suspended.
    fn is_suspended(&self) -> bool;

    /// True once closed.
    fn is_closed(&self) -> bool;

    /// True if at least one message is queued.
    fn is_receivable(&self) -> bool;

    /// Number of queued messages.
    fn size(&self) -> usize;

    /// Messages dropped by overflow handling or close-time drains.
    fn dropped_count(&self) -> u64;

    /// Bind the dispatcher the workers deliver through. Called once by the
    /// runtime while wiring the actor; later calls are ignored.
    fn attach(&self, dispatcher: Weak<dyn Dispatch<A>>);
}

/// The delivery seam between a mailbox worker and the actor cell.
pub trait Dispatch<A: Actor>: Send + Sync {
    /// Deliver one invocation to the actor body.
    fn deliver(self: Arc<Self>, invocation: Box<dyn Invocation<A>>) -> BoxFuture<'static, ()>;
}

/// What a bounded mailbox does when it is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Evict the head of the queue (its completion settles dropped) and
    /// append the incoming message.
    DropOldest,
    /// Drop the incoming message (its completion settles dropped).
    DropNewest,
    /// Route the incoming message to dead letters.
    Reject,
}

/// Mailbox selection for an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MailboxKind {
    /// No capacity limit.
    Unbounded,
    /// Capacity limit with an overflow policy.
    Bounded {
        /// Maximum queued messages.
        capacity: usize,
        /// Behavior when full.
        policy: OverflowPolicy,
    },
}

impl Default for MailboxKind {
    fn default() -> Self {
        Self::Unbounded
    }
}
