//! One-stop import for applications built on the runtime.
//!
//! ```rust
//! use stagework::prelude::*;
//! ```

pub use crate::actor::{
    Actor, ActorHandle, ActorRef, Definition, Environment, ExecutionContext, LifeCycleState,
    Parameters, Protocol,
};
pub use crate::dead_letters::{DeadLetter, DeadLetters, DeadLettersListener};
pub use crate::mailbox::{Mailbox, MailboxKind, OverflowPolicy};
pub use crate::message::{ActorError, Completion, Delivery, Fault, Handler, Message};
pub use crate::observable_state::ObservableState;
pub use crate::parameters;
pub use crate::scheduler::{Cancellable, Scheduler};
pub use crate::stage::{Stage, StageConfig, StageError};
pub use crate::supervision::{
    Directive, Supervised, SupervisionScope, SupervisionStrategy, Supervisor, SupervisorHandle,
};
pub use crate::util::{Address, Logger};
