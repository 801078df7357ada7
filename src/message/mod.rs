//! Messages, completions, and the type-erased mailbox work unit.

pub mod completion;
pub mod envelope;
pub mod traits;

pub use completion::{channel, ActorError, Completion, Deferred, Delivery, Fault};
pub use envelope::{Invocation, MessageEnvelope};
pub use traits::{Handler, Message};
