//! The Supervisor trait.
//!
//! Supervisors are actors. A failure report is a message on the
//! supervisor's own mailbox, so decisions serialize with everything else
//! the supervisor does and stay race-free under concurrent sibling
//! failures. `inform` is the notification hook (override it for custom
//! failure reporting); `decide_directive` runs synchronously inside the
//! supervisor's dispatch worker.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::handle::Supervised;
use super::types::{Directive, SupervisionStrategy};
use crate::actor::Actor;
use crate::message::Fault;

/// Decision authority over a set of supervised actors.
#[async_trait]
pub trait Supervisor: Actor {
    /// The bounds and scope this supervisor decides under.
    fn supervision_strategy(&self) -> SupervisionStrategy {
        SupervisionStrategy::default()
    }

    /// Called with every failure before the directive is decided.
    /// Defaults to a warning log.
    async fn inform(&mut self, fault: &Fault, supervised: &Supervised) {
        tracing::warn!(
            supervised = %supervised.address(),
            actor_type = supervised.type_name(),
            "supervised actor failed: {fault}"
        );
    }

    /// Translate a failure into a directive. Defaults to Restart.
    fn decide_directive(
        &mut self,
        fault: &Fault,
        supervised: &Supervised,
        strategy: &SupervisionStrategy,
    ) -> Directive {
        let _ = (fault, supervised, strategy);
        Directive::Restart
    }
}
