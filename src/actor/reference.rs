//! Typed actor references.
//!
//! `ActorRef<A>` is the send surface every protocol façade wraps: each
//! call builds an envelope, enqueues it on the target's mailbox, and
//! returns the completion the dispatch worker later settles. References
//! compare and hash by address.

// Layer 1: Standard library imports
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use serde_json::Value;

// Layer 3: Internal module imports
use super::cell::{ActorCell, ActorHandle};
use super::environment::Environment;
use super::lifecycle::LifeCycleState;
use super::traits::Actor;
use crate::dead_letters::DeadLetters;
use crate::mailbox::Mailbox;
use crate::message::{channel, ActorError, Completion, Handler, Message, MessageEnvelope};
use crate::observable_state::ObservableState;
use crate::scheduler::Scheduler;
use crate::stage::Stage;
use crate::supervision::handle::Roster;
use crate::util::{Address, Logger};

/// Typed handle to a live actor.
pub struct ActorRef<A: Actor> {
    cell: Arc<ActorCell<A>>,
}

impl<A: Actor> ActorRef<A> {
    pub(crate) fn from_cell(cell: Arc<ActorCell<A>>) -> Self {
        Self { cell }
    }

    pub(crate) fn cell(&self) -> &Arc<ActorCell<A>> {
        &self.cell
    }

    pub(crate) fn roster(&self) -> Roster {
        self.cell.roster_ref().clone()
    }

    /// Enqueue a message; the completion resolves when the dispatch
    /// worker finishes the invocation (or the message is dropped).
    pub fn send<M>(&self, message: M) -> Completion<M::Reply>
    where
        M: Message,
        A: Handler<M>,
    {
        let (deferred, completion) = channel();
        self.cell
            .mailbox()
            .send(Box::new(MessageEnvelope::new(message, deferred)));
        completion
    }

    /// The actor's address.
    pub fn address(&self) -> &Address {
        self.cell.address()
    }

    /// Logical type name from the actor's definition.
    pub fn type_name(&self) -> &str {
        self.cell.type_name()
    }

    /// True once the actor reached its terminal state.
    pub fn is_stopped(&self) -> bool {
        self.cell.is_stopped()
    }

    /// The actor's current lifecycle state.
    pub fn life_cycle_state(&self) -> LifeCycleState {
        self.cell.life_cycle_state()
    }

    /// How many times the body has been replaced by supervision.
    pub fn restart_count(&self) -> u32 {
        self.cell.restart_count()
    }

    /// The stage that owns the actor.
    pub fn stage(&self) -> &Stage {
        self.cell.stage()
    }

    /// The stage's scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        self.stage().scheduler()
    }

    /// The stage's dead-letter sink.
    pub fn dead_letters(&self) -> &DeadLetters {
        self.stage().dead_letters()
    }

    /// A logger scoped to the actor behind this reference.
    pub fn logger(&self) -> Logger {
        Logger::scoped(self.type_name(), self.address())
    }

    /// The actor's mailbox, for advanced control (suspension, drop
    /// counts, custom flow probes).
    pub fn mailbox(&self) -> &dyn Mailbox<A> {
        self.cell.mailbox().as_ref()
    }

    /// Erased handle for heterogeneous collections and tree walks.
    pub fn handle(&self) -> Arc<dyn ActorHandle> {
        Arc::clone(&self.cell) as Arc<dyn ActorHandle>
    }

    /// Fetch the actor's observable state through the mailbox, so the
    /// read serializes with message handling.
    pub fn observable_state(&self) -> Completion<ObservableState> {
        self.send(ObserveState)
    }

    /// Exchange a state snapshot through the mailbox.
    pub fn state_snapshot(&self, snapshot: Option<Value>) -> Completion<Option<Value>> {
        self.send(SnapshotState { snapshot })
    }

    /// Stop the actor. Idempotent; awaiting it observes the full stop
    /// sequence including children.
    pub async fn stop(&self) {
        self.cell.stop().await;
    }
}

impl<A: Actor> Clone for ActorRef<A> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<A: Actor> PartialEq for ActorRef<A> {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl<A: Actor> Eq for ActorRef<A> {}

impl<A: Actor> Hash for ActorRef<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl<A: Actor> fmt::Debug for ActorRef<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorRef({}@{})", self.type_name(), self.address())
    }
}

/// Built-in request for an actor's observable state.
pub(crate) struct ObserveState;

impl Message for ObserveState {
    const MESSAGE_TYPE: &'static str = "observable-state";
    type Reply = ObservableState;
}

#[async_trait]
impl<A: Actor> Handler<ObserveState> for A {
    async fn handle(
        &mut self,
        _message: ObserveState,
        _environment: &mut Environment<Self>,
    ) -> Result<ObservableState, ActorError> {
        Ok(self.observable_state())
    }
}

/// Built-in request to exchange a state snapshot.
pub(crate) struct SnapshotState {
    snapshot: Option<Value>,
}

impl Message for SnapshotState {
    const MESSAGE_TYPE: &'static str = "state-snapshot";
    type Reply = Option<Value>;
}

#[async_trait]
impl<A: Actor> Handler<SnapshotState> for A {
    async fn handle(
        &mut self,
        message: SnapshotState,
        _environment: &mut Environment<Self>,
    ) -> Result<Option<Value>, ActorError> {
        Ok(self.state_snapshot(message.snapshot))
    }
}
