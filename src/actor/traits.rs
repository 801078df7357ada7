//! The Actor trait: the stateful unit user code implements.
//!
//! An actor body holds private state and is only ever touched by its
//! mailbox's dispatch worker, one message at a time. Protocol messages are
//! declared with [`Message`](crate::message::Message) implementations and
//! handled with [`Handler`](crate::message::Handler) implementations; this
//! trait carries the lifecycle hooks shared by every actor.
//!
//! Hook failures never block a lifecycle transition: the runtime logs the
//! error and carries on, because the state machine has to make progress
//! regardless of user-code hygiene.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use serde_json::Value;

// Layer 3: Internal module imports
use super::environment::Environment;
use crate::message::{ActorError, Fault};
use crate::observable_state::ObservableState;

/// Base trait for actor bodies.
///
/// All hooks default to no-ops; override the ones a body cares about.
///
/// # Example
/// ```rust,ignore
/// use async_trait::async_trait;
/// use stagework::prelude::*;
///
/// struct CounterActor {
///     count: u64,
/// }
///
/// #[async_trait]
/// impl Actor for CounterActor {
///     async fn after_restart(
///         &mut self,
///         environment: &mut Environment<Self>,
///     ) -> Result<(), ActorError> {
///         environment.logger().info("counter reset by restart");
///         self.count = 0;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Actor: Sized + Send + 'static {
    /// Runs as the first item on the mailbox, before any user message.
    async fn before_start(
        &mut self,
        environment: &mut Environment<Self>,
    ) -> Result<(), ActorError> {
        let _ = environment;
        Ok(())
    }

    /// Runs during stop, after children have stopped and before the
    /// mailbox closes.
    async fn before_stop(&mut self, environment: &mut Environment<Self>) -> Result<(), ActorError> {
        let _ = environment;
        Ok(())
    }

    /// Runs last during stop, after the mailbox has closed.
    async fn after_stop(&mut self, environment: &mut Environment<Self>) -> Result<(), ActorError> {
        let _ = environment;
        Ok(())
    }

    /// Runs on the failing body just before a supervisor replaces it.
    async fn before_restart(
        &mut self,
        environment: &mut Environment<Self>,
        cause: &Fault,
    ) -> Result<(), ActorError> {
        let _ = (environment, cause);
        Ok(())
    }

    /// Runs on the fresh body just after a supervisor installed it, while
    /// the mailbox is still suspended.
    async fn after_restart(
        &mut self,
        environment: &mut Environment<Self>,
    ) -> Result<(), ActorError> {
        let _ = environment;
        Ok(())
    }

    /// Runs before a supervisor resumes the mailbox; state is preserved.
    async fn before_resume(
        &mut self,
        environment: &mut Environment<Self>,
    ) -> Result<(), ActorError> {
        let _ = environment;
        Ok(())
    }

    /// Store or retrieve an opaque state snapshot. With `Some(value)` the
    /// body may adopt the snapshot and return the previous one; with
    /// `None` it may return its current snapshot. The default does
    /// neither.
    fn state_snapshot(&mut self, snapshot: Option<Value>) -> Option<Value> {
        let _ = snapshot;
        None
    }

    /// Publish named values for tests and tooling. Fetched through the
    /// mailbox, so reads serialize with message handling.
    fn observable_state(&self) -> ObservableState {
        ObservableState::empty()
    }
}
