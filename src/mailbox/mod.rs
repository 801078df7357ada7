//! FIFO mailboxes with single-worker dispatch.

pub mod bounded;
pub(crate) mod core;
pub mod traits;
pub mod unbounded;

pub use bounded::BoundedMailbox;
pub use traits::{Dispatch, Mailbox, MailboxKind, OverflowPolicy};
pub use unbounded::UnboundedMailbox;
