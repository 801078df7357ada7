//! Type-erased mailbox work units.
//!
//! A mailbox queues `Invocation`s: boxed, single-use items that know how
//! to run against the actor body and how to settle their completion on
//! every path (reply, failure, or drop). `MessageEnvelope` adapts a typed
//! message plus its deferred completion into an invocation; the runtime
//! adds a lifecycle invocation for `before_start`.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::completion::{Deferred, Fault};
use super::traits::{Handler, Message};
use crate::actor::{Actor, Environment};

/// One unit of mailbox work, erased over the message type.
///
/// Exactly one of `invoke` or `discard` is called for every invocation
/// that was accepted by a mailbox; both settle the completion.
#[async_trait]
pub trait Invocation<A: Actor>: Send {
    /// Short description of the invocation (the message type).
    fn description(&self) -> &'static str;

    /// Run against the actor body. Settles the completion with the reply
    /// or the failure; a returned fault is routed to supervision by the
    /// caller.
    async fn invoke(
        self: Box<Self>,
        body: &mut A,
        environment: &mut Environment<A>,
    ) -> Result<(), Fault>;

    /// Settle the completion as dropped without delivering.
    fn discard(self: Box<Self>);
}

/// Envelope pairing a typed message with its completion.
pub struct MessageEnvelope<M: Message> {
    message: M,
    deferred: Deferred<M::Reply>,
}

impl<M: Message> MessageEnvelope<M> {
    /// Wrap a message and the deferred half of its completion.
    pub fn new(message: M, deferred: Deferred<M::Reply>) -> Self {
        Self { message, deferred }
    }
}

#[async_trait]
impl<A, M> Invocation<A> for MessageEnvelope<M>
where
    A: Handler<M>,
    M: Message,
{
    fn description(&self) -> &'static str {
        M::MESSAGE_TYPE
    }

    async fn invoke(
        self: Box<Self>,
        body: &mut A,
        environment: &mut Environment<A>,
    ) -> Result<(), Fault> {
        let MessageEnvelope { message, deferred } = *self;
        match body.handle(message, environment).await {
            Ok(reply) => {
                deferred.complete(reply);
                Ok(())
            }
            Err(error) => {
                let fault = Fault::new(error);
                deferred.fail(fault.clone());
                Err(fault)
            }
        }
    }

    fn discard(self: Box<Self>) {
        self.deferred.drop_message();
    }
}

/// First invocation of every actor: runs `before_start`.
///
/// Enqueued at spawn time ahead of any user message, so the hook observes
/// the mailbox's arrival order. A failing hook is logged and does not
/// block the start transition.
pub(crate) struct StartInvocation;

#[async_trait]
impl<A: Actor> Invocation<A> for StartInvocation {
    fn description(&self) -> &'static str {
        "before-start"
    }

    async fn invoke(
        self: Box<Self>,
        body: &mut A,
        environment: &mut Environment<A>,
    ) -> Result<(), Fault> {
        if let Err(error) = body.before_start(environment).await {
            environment
                .logger()
                .warn(&format!("before_start failed: {error}"));
        }
        Ok(())
    }

    fn discard(self: Box<Self>) {}
}
