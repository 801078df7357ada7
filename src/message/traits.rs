//! Core message and handler traits.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::completion::ActorError;
use crate::actor::{Actor, Environment};

/// A message an actor protocol declares.
///
/// The const identifier stands in for runtime reflection: dead letters,
/// execution contexts, and logs all describe an invocation by its
/// `MESSAGE_TYPE`. The associated `Reply` is what the caller's completion
/// resolves with; use `()` for fire-and-forget operations (the completion
/// still resolves, which is what gives callers back-pressure and failure
/// visibility).
///
/// # Example
/// ```rust
/// use stagework::message::Message;
///
/// struct Increment;
///
/// impl Message for Increment {
///     const MESSAGE_TYPE: &'static str = "increment";
///     type Reply = ();
/// }
///
/// struct GetValue;
///
/// impl Message for GetValue {
///     const MESSAGE_TYPE: &'static str = "get-value";
///     type Reply = u64;
/// }
/// ```
pub trait Message: Send + 'static {
    /// Identifier used in dead letters, logs, and execution contexts.
    const MESSAGE_TYPE: &'static str;

    /// What the caller's completion resolves with.
    type Reply: Send + 'static;
}

/// Per-message handling logic of an actor body.
///
/// The dispatch worker invokes `handle` with exclusive access to the
/// body; at most one handler runs per actor at any instant. Returning an
/// error settles the caller's completion with the failure, suspends the
/// mailbox, and informs the actor's supervisor.
#[async_trait]
pub trait Handler<M: Message>: Actor {
    /// Process one message.
    async fn handle(
        &mut self,
        message: M,
        environment: &mut Environment<Self>,
    ) -> Result<M::Reply, ActorError>;
}
