//! Root guardian actors.
//!
//! Every stage owns two guardians. The public root is the default parent
//! and supervisor of user actors: it restarts them without bound, the
//! let-it-crash bulkhead. The private root sits above the public root and
//! above registered user supervisors, restarting those in turn. Neither
//! has a supervisor of its own, so escalation terminates here.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::actor::Actor;
use crate::message::Fault;
use crate::supervision::{Directive, Supervised, SupervisionScope, SupervisionStrategy, Supervisor};

/// Supervisor-of-supervisors at the very top of the tree.
pub struct PrivateRootActor;

#[async_trait]
impl Actor for PrivateRootActor {}

#[async_trait]
impl Supervisor for PrivateRootActor {
    fn supervision_strategy(&self) -> SupervisionStrategy {
        SupervisionStrategy::forever(SupervisionScope::One)
    }

    async fn inform(&mut self, fault: &Fault, supervised: &Supervised) {
        tracing::warn!(
            supervised = %supervised.address(),
            actor_type = supervised.type_name(),
            "supervisor failed, restarting: {fault}"
        );
    }

    fn decide_directive(
        &mut self,
        _fault: &Fault,
        _supervised: &Supervised,
        _strategy: &SupervisionStrategy,
    ) -> Directive {
        Directive::Restart
    }
}

/// Default parent and supervisor of user actors.
pub struct PublicRootActor;

#[async_trait]
impl Actor for PublicRootActor {}

#[async_trait]
impl Supervisor for PublicRootActor {
    fn supervision_strategy(&self) -> SupervisionStrategy {
        SupervisionStrategy::forever(SupervisionScope::One)
    }

    async fn inform(&mut self, fault: &Fault, supervised: &Supervised) {
        tracing::warn!(
            supervised = %supervised.address(),
            actor_type = supervised.type_name(),
            "actor crashed, restarting: {fault}"
        );
    }

    fn decide_directive(
        &mut self,
        _fault: &Fault,
        _supervised: &Supervised,
        _strategy: &SupervisionStrategy,
    ) -> Directive {
        Directive::Restart
    }
}
