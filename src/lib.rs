//! # stagework - local actor runtime
//!
//! An in-process actor runtime: stateful services decomposed into small
//! single-threaded units that communicate by asynchronous message, with
//! strong per-actor ordering, supervised failure handling, and
//! cooperative concurrency on top of tokio.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use stagework::prelude::*;
//!
//! // 1. Declare the protocol's messages
//! struct Increment;
//! impl Message for Increment {
//!     const MESSAGE_TYPE: &'static str = "increment";
//!     type Reply = ();
//! }
//!
//! struct GetValue;
//! impl Message for GetValue {
//!     const MESSAGE_TYPE: &'static str = "get-value";
//!     type Reply = u64;
//! }
//!
//! // 2. Define the actor body
//! struct CounterActor {
//!     count: u64,
//! }
//!
//! #[async_trait]
//! impl Actor for CounterActor {}
//!
//! #[async_trait]
//! impl Handler<Increment> for CounterActor {
//!     async fn handle(
//!         &mut self,
//!         _message: Increment,
//!         _environment: &mut Environment<Self>,
//!     ) -> Result<(), ActorError> {
//!         self.count += 1;
//!         Ok(())
//!     }
//! }
//!
//! #[async_trait]
//! impl Handler<GetValue> for CounterActor {
//!     async fn handle(
//!         &mut self,
//!         _message: GetValue,
//!         _environment: &mut Environment<Self>,
//!     ) -> Result<u64, ActorError> {
//!         Ok(self.count)
//!     }
//! }
//!
//! // 3. Write the protocol façade callers hold
//! struct Counter {
//!     reference: ActorRef<CounterActor>,
//! }
//!
//! impl Counter {
//!     fn increment(&self) -> Completion<()> {
//!         self.reference.send(Increment)
//!     }
//!     fn value(&self) -> Completion<u64> {
//!         self.reference.send(GetValue)
//!     }
//! }
//!
//! impl Protocol for Counter {
//!     type Body = CounterActor;
//!     fn type_name() -> &'static str {
//!         "Counter"
//!     }
//!     fn instantiate(_definition: &Definition) -> CounterActor {
//!         CounterActor { count: 0 }
//!     }
//!     fn from_ref(reference: ActorRef<CounterActor>) -> Self {
//!         Self { reference }
//!     }
//!     fn reference(&self) -> &ActorRef<CounterActor> {
//!         &self.reference
//!     }
//! }
//!
//! // 4. Run it on a stage
//! #[tokio::main]
//! async fn main() -> Result<(), StageError> {
//!     let stage = Stage::new(StageConfig::default())?;
//!     let counter: Counter = stage.actor_for(Definition::new("Counter", Address::unique()))?;
//!
//!     counter.increment().await;
//!     assert_eq!(counter.value().await.value(), Some(1));
//!
//!     stage.close().await
//! }
//! ```
//!
//! # Guarantees
//!
//! - **Per-actor serialization.** At most one dispatch worker runs per
//!   mailbox at any instant; an actor body is only ever touched by its
//!   own worker.
//! - **FIFO per sender.** Sends are synchronous enqueues; a single
//!   sender's messages are delivered in send order. Self-sends queue
//!   behind pending work, which is how internal state machines serialize.
//! - **At-most-once.** Every accepted message is either handled exactly
//!   once or recorded as a dead letter; its completion settles exactly
//!   once with the reply, the failure, or the dropped marker.
//! - **Supervised failure.** A handler error settles the caller's
//!   completion, suspends the mailbox, and posts the failure to the
//!   supervisor's own mailbox, where resume/restart/stop/escalate
//!   directives are decided and applied race-free.
//!
//! # Module Organization
//!
//! - [`actor`] - actor bodies, lifecycle hooks, environments, references
//! - [`message`] - messages, handlers, completions, the erased work unit
//! - [`mailbox`] - unbounded and bounded mailboxes, overflow policies
//! - [`supervision`] - directives, strategies, supervisor plumbing
//! - [`stage`] - the root container, configuration, guardians
//! - [`directory`] - sharded address-to-handle map
//! - [`dead_letters`] - undeliverable-message sink and listeners
//! - [`scheduler`] - delayed and repeating tasks with cancellation
//! - [`observable_state`] - snapshot surface for tests and tooling
//! - [`testkit`] - polling assertions and capture listeners
//!
//! The runtime is deliberately local: no distribution, no persistence,
//! no cross-process addressing.

pub mod actor;
pub mod dead_letters;
pub mod directory;
pub mod mailbox;
pub mod message;
pub mod observable_state;
pub mod prelude;
pub mod scheduler;
pub mod stage;
pub mod supervision;
pub mod testkit;
pub mod util;

// Re-export commonly used types
pub use actor::{Actor, ActorHandle, ActorRef, Definition, Environment, Parameters, Protocol};
pub use dead_letters::{DeadLetter, DeadLetters, DeadLettersListener};
pub use mailbox::{BoundedMailbox, Mailbox, MailboxKind, OverflowPolicy, UnboundedMailbox};
pub use message::{ActorError, Completion, Delivery, Fault, Handler, Message};
pub use observable_state::ObservableState;
pub use scheduler::{Cancellable, Scheduler};
pub use stage::{Stage, StageConfig, StageError};
pub use supervision::{
    Directive, Supervised, SupervisionScope, SupervisionStrategy, Supervisor, SupervisorHandle,
};
pub use util::{Address, Logger, NumericAddressFactory};
