//! Single-shot completion handles for message delivery.
//!
//! Every message placed on a mailbox carries a `Deferred` that is settled
//! exactly once: with the handler's reply, with the failure the handler
//! returned, or with `Dropped` when the runtime never delivered the
//! message (closed mailbox, overflow policy, discarded queue). Callers
//! hold the matching `Completion` and await the outcome.

// Layer 1: Standard library imports
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::sync::oneshot;

// Layer 3: Internal module imports
// (none)

/// Error type returned by message handlers and lifecycle hooks.
pub type ActorError = Box<dyn Error + Send + Sync + 'static>;

/// A shareable failure cause.
///
/// The same cause must reach two parties: the caller awaiting the
/// completion and the supervisor deciding a directive. Wrapping the
/// original error in an `Arc` lets both observe it without cloning the
/// error value itself.
#[derive(Clone)]
pub struct Fault {
    cause: Arc<dyn Error + Send + Sync + 'static>,
}

impl Fault {
    /// Wrap a handler error.
    pub fn new(cause: ActorError) -> Self {
        Self {
            cause: Arc::from(cause),
        }
    }

    /// Build a fault from a bare message (used by tests and guardians).
    pub fn message(text: impl Into<String>) -> Self {
        #[derive(Debug)]
        struct Plain(String);
        impl fmt::Display for Plain {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
        impl Error for Plain {}
        Self {
            cause: Arc::new(Plain(text.into())),
        }
    }

    /// The underlying cause.
    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fault({:?})", self.cause)
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        let cause: &(dyn Error + 'static) = self.cause.as_ref();
        Some(cause)
    }
}

/// Outcome of a message delivery, observed by the caller.
#[derive(Debug)]
pub enum Delivery<T> {
    /// The handler ran and produced a reply.
    Completed(T),
    /// The message was never delivered: the runtime dropped it (closed
    /// mailbox, overflow policy, or stop-time queue drain).
    Dropped,
    /// The handler ran and failed; the same cause went to the supervisor.
    Failed(Fault),
}

impl<T> Delivery<T> {
    /// The reply, if the delivery completed.
    pub fn value(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// The failure cause, if the handler failed.
    pub fn fault(self) -> Option<Fault> {
        match self {
            Self::Failed(fault) => Some(fault),
            _ => None,
        }
    }

    /// True if the runtime dropped the message without delivering it.
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped)
    }

    /// True if the handler produced a reply.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Collapse into a result: `Ok(Some(reply))`, `Ok(None)` for dropped,
    /// `Err(fault)` for a handler failure.
    pub fn into_result(self) -> Result<Option<T>, Fault> {
        match self {
            Self::Completed(value) => Ok(Some(value)),
            Self::Dropped => Ok(None),
            Self::Failed(fault) => Err(fault),
        }
    }
}

/// Create a linked settle-once / await pair.
pub fn channel<T>() -> (Deferred<T>, Completion<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Deferred {
            slot: Arc::new(Mutex::new(Some(sender))),
        },
        Completion { receiver },
    )
}

/// The settling half of a completion.
///
/// Cloneable so the delivery path and the drop path can both hold it; the
/// internal slot guarantees only the first settlement wins.
pub struct Deferred<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<Delivery<T>>>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Deferred<T> {
    /// Settle with a reply. Returns false if already settled.
    pub fn complete(&self, value: T) -> bool {
        self.settle(Delivery::Completed(value))
    }

    /// Settle with a failure. Returns false if already settled.
    pub fn fail(&self, fault: Fault) -> bool {
        self.settle(Delivery::Failed(fault))
    }

    /// Settle as dropped. Returns false if already settled.
    pub fn drop_message(&self) -> bool {
        self.settle(Delivery::Dropped)
    }

    fn settle(&self, delivery: Delivery<T>) -> bool {
        match self.slot.lock().take() {
            Some(sender) => {
                // The caller may have dropped its completion; that is fine.
                let _ = sender.send(delivery);
                true
            }
            None => false,
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settled = self.slot.lock().is_none();
        write!(f, "Deferred(settled={settled})")
    }
}

/// The awaiting half of a completion.
///
/// Resolves to the delivery outcome. If the runtime side vanishes without
/// settling (it should not), the completion resolves `Dropped`.
#[derive(Debug)]
pub struct Completion<T> {
    receiver: oneshot::Receiver<Delivery<T>>,
}

impl<T> Future for Completion<T> {
    type Output = Delivery<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(delivery)) => Poll::Ready(delivery),
            Poll::Ready(Err(_)) => Poll::Ready(Delivery::Dropped),
            Poll::Pending => Poll::Pending,
        }
    }
}
