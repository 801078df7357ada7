//! Per-actor environment: identity, relationships, and scratch context.
//!
//! Exactly one environment exists per actor, owned by its cell and handed
//! to handlers and hooks alongside the body. Everything an actor may
//! legitimately reach (its address, stage services, parent, children, and
//! a typed self-reference for self-sends) goes through here.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use serde_json::Value;

// Layer 3: Internal module imports
use super::cell::ActorHandle;
use super::protocol::{Definition, Protocol};
use super::reference::ActorRef;
use super::traits::Actor;
use crate::dead_letters::DeadLetters;
use crate::scheduler::Scheduler;
use crate::stage::{Stage, StageError};
use crate::supervision::{Supervised, SupervisorHandle};
use crate::util::{Address, Logger};

/// Per-message scratch map, cleared between deliveries.
///
/// The runtime seeds each delivery with the in-flight message type under
/// the `"message"` key; handlers may add context (a request id, a command
/// summary) that supervisors can read when formatting failure reports.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    values: HashMap<String, Value>,
}

impl ExecutionContext {
    /// Key the runtime stores the in-flight message type under.
    pub const MESSAGE_KEY: &'static str = "message";

    /// Reset for a new delivery.
    pub(crate) fn begin(&mut self, description: &str) {
        self.values.clear();
        self.values
            .insert(Self::MESSAGE_KEY.to_owned(), Value::String(description.to_owned()));
    }

    /// Attach a value to the current delivery.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Read a value from the current delivery.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The in-flight message type, if a delivery is underway.
    pub fn message_type(&self) -> Option<&str> {
        self.values.get(Self::MESSAGE_KEY).and_then(Value::as_str)
    }
}

/// The bundle handed to every handler and hook.
pub struct Environment<A: Actor> {
    self_ref: ActorRef<A>,
    logger: Logger,
    execution_context: ExecutionContext,
}

impl<A: Actor> Environment<A> {
    pub(crate) fn new(self_ref: ActorRef<A>) -> Self {
        let logger = Logger::scoped(self_ref.type_name(), self_ref.address());
        Self {
            self_ref,
            logger,
            execution_context: ExecutionContext::default(),
        }
    }

    /// This actor's address.
    pub fn address(&self) -> &Address {
        self.self_ref.address()
    }

    /// The stage that owns this actor.
    pub fn stage(&self) -> &Stage {
        self.self_ref.stage()
    }

    /// Logger scoped to this actor.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The stage's scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        self.stage().scheduler()
    }

    /// The stage's dead-letter sink.
    pub fn dead_letters(&self) -> &DeadLetters {
        self.stage().dead_letters()
    }

    /// Typed reference to this actor. Sends through it queue behind
    /// whatever is already in the mailbox, which is how internal state
    /// machines serialize their next step behind pending work.
    pub fn self_ref(&self) -> &ActorRef<A> {
        &self.self_ref
    }

    /// This actor behind one of its protocol façades.
    pub fn self_proxy<P>(&self) -> P
    where
        P: Protocol<Body = A>,
    {
        P::from_ref(self.self_ref.clone())
    }

    /// The owning parent, if any (root guardians have none).
    pub fn parent(&self) -> Option<Arc<dyn ActorHandle>> {
        self.self_ref.cell().parent_handle()
    }

    /// Handles of this actor's children.
    pub fn children(&self) -> Vec<Arc<dyn ActorHandle>> {
        self.self_ref.cell().children_handles()
    }

    /// Create a child actor. The child is owned by this actor (it stops
    /// before this actor finishes stopping) and inherits this actor's
    /// supervisor.
    pub fn child_actor_for<P: Protocol>(&self, definition: Definition) -> Result<P, StageError> {
        let parent: Arc<dyn ActorHandle> = Arc::clone(self.self_ref.cell()) as Arc<dyn ActorHandle>;
        self.stage()
            .spawn_child::<P>(definition, parent, self.self_ref.cell().supervisor_handle())
    }

    /// Create a child actor supervised by a named supervisor.
    pub fn child_actor_for_supervised<P: Protocol>(
        &self,
        definition: Definition,
        supervisor_name: &str,
    ) -> Result<P, StageError> {
        let parent: Arc<dyn ActorHandle> = Arc::clone(self.self_ref.cell()) as Arc<dyn ActorHandle>;
        let supervisor = self.stage().supervisor_named(supervisor_name)?;
        self.stage()
            .spawn_child::<P>(definition, parent, Some(supervisor))
    }

    /// Request this actor's own stop. Deferred to a separate task so a
    /// handler can call it without deadlocking on its own delivery.
    pub fn stop_self(&self) {
        let cell = Arc::clone(self.self_ref.cell());
        tokio::spawn(async move {
            cell.stop().await;
        });
    }

    /// Scratch context of the in-flight delivery.
    pub fn execution_context(&self) -> &ExecutionContext {
        &self.execution_context
    }

    /// Mutable scratch context of the in-flight delivery.
    pub fn execution_context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.execution_context
    }

    pub(crate) fn roster_snapshot(&self) -> Vec<Supervised> {
        self.self_ref.cell().roster_ref().snapshot()
    }

    pub(crate) fn supervisor_handle(&self) -> Option<SupervisorHandle> {
        self.self_ref.cell().supervisor_handle()
    }
}
