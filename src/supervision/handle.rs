//! Supervision plumbing: handles, rosters, and directive application.
//!
//! A failing actor suspends its mailbox and posts a `FailureNotice` to its
//! supervisor's mailbox through a `SupervisorHandle`. The notice runs
//! inside the supervisor's dispatch worker: notification hook, directive
//! decision, then application: resume, restart (bounded by the strategy's
//! intensity), stop, or escalation to the next supervisor up.

// Layer 1: Standard library imports
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::traits::Supervisor;
use super::types::{Directive, SupervisionScope, SupervisionStrategy};
use crate::actor::{ActorRef, Environment};
use crate::message::{Fault, Invocation};
use crate::util::Address;

/// Supervised side of the supervision seam, implemented by actor cells.
#[async_trait]
pub(crate) trait SupervisedCell: Send + Sync {
    fn supervised_address(&self) -> &Address;
    fn supervised_type_name(&self) -> &str;
    fn supervised_is_stopped(&self) -> bool;
    fn restart_allowed(&self, strategy: &SupervisionStrategy) -> bool;
    fn suspend_mailbox(&self);
    async fn resume_after_failure(&self);
    async fn restart_with(&self, cause: &Fault);
    async fn stop_supervised(&self);
}

/// Erased handle to a failing (or sibling) actor, as seen by supervisors.
#[derive(Clone)]
pub struct Supervised {
    cell: Arc<dyn SupervisedCell>,
}

impl Supervised {
    pub(crate) fn from_cell(cell: Arc<dyn SupervisedCell>) -> Self {
        Self { cell }
    }

    /// Address of the supervised actor.
    pub fn address(&self) -> &Address {
        self.cell.supervised_address()
    }

    /// Logical type name of the supervised actor.
    pub fn type_name(&self) -> &str {
        self.cell.supervised_type_name()
    }

    /// True once the supervised actor has stopped.
    pub fn is_stopped(&self) -> bool {
        self.cell.supervised_is_stopped()
    }

    pub(crate) fn restart_allowed(&self, strategy: &SupervisionStrategy) -> bool {
        self.cell.restart_allowed(strategy)
    }

    pub(crate) fn suspend_mailbox(&self) {
        self.cell.suspend_mailbox();
    }

    pub(crate) async fn resume_after_failure(&self) {
        self.cell.resume_after_failure().await;
    }

    pub(crate) async fn restart_with(&self, cause: &Fault) {
        self.cell.restart_with(cause).await;
    }

    pub(crate) async fn stop(&self) {
        self.cell.stop_supervised().await;
    }
}

impl fmt::Debug for Supervised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Supervised({}@{})",
            self.type_name(),
            self.address()
        )
    }
}

/// The set of actors a supervisor answers for.
///
/// Scope `All` directives apply to a snapshot of this roster. Entries are
/// added at spawn time and removed when the actor stops.
#[derive(Clone, Default)]
pub(crate) struct Roster {
    entries: Arc<Mutex<Vec<Supervised>>>,
}

impl Roster {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, supervised: Supervised) {
        self.entries.lock().push(supervised);
    }

    pub(crate) fn remove(&self, address: &Address) {
        self.entries
            .lock()
            .retain(|entry| entry.address() != address);
    }

    pub(crate) fn snapshot(&self) -> Vec<Supervised> {
        self.entries.lock().clone()
    }
}

/// Where failure notices are posted: the supervisor actor's own mailbox.
pub(crate) trait FailureSink: Send + Sync {
    fn post(&self, fault: Fault, supervised: Supervised);
}

struct ReferenceSink<S: Supervisor> {
    reference: ActorRef<S>,
}

impl<S: Supervisor> FailureSink for ReferenceSink<S> {
    fn post(&self, fault: Fault, supervised: Supervised) {
        self.reference
            .mailbox()
            .send(Box::new(FailureNotice { fault, supervised }));
    }
}

/// Cheap-to-clone handle through which an actor reaches its supervisor.
///
/// Every supervised actor holds exactly one. Registered under a logical
/// name on the stage, or implicitly for the root guardians.
#[derive(Clone)]
pub struct SupervisorHandle {
    sink: Arc<dyn FailureSink>,
    roster: Roster,
}

impl SupervisorHandle {
    /// Build a handle for an existing supervisor actor.
    pub fn for_supervisor<S: Supervisor>(reference: &ActorRef<S>) -> Self {
        Self {
            sink: Arc::new(ReferenceSink {
                reference: reference.clone(),
            }),
            roster: reference.roster(),
        }
    }

    pub(crate) fn inform(&self, fault: Fault, supervised: Supervised) {
        self.sink.post(fault, supervised);
    }

    pub(crate) fn roster(&self) -> &Roster {
        &self.roster
    }
}

impl fmt::Debug for SupervisorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SupervisorHandle")
    }
}

/// Failure report delivered through the supervisor's mailbox.
pub(crate) struct FailureNotice {
    fault: Fault,
    supervised: Supervised,
}

#[async_trait]
impl<S: Supervisor> Invocation<S> for FailureNotice {
    fn description(&self) -> &'static str {
        "supervision-inform"
    }

    async fn invoke(
        self: Box<Self>,
        body: &mut S,
        environment: &mut Environment<S>,
    ) -> Result<(), Fault> {
        let FailureNotice { fault, supervised } = *self;
        if supervised.is_stopped() {
            return Ok(());
        }
        body.inform(&fault, &supervised).await;
        let strategy = body.supervision_strategy();
        let directive = body.decide_directive(&fault, &supervised, &strategy);
        apply_directive(directive, &strategy, fault, supervised, environment).await;
        Ok(())
    }

    fn discard(self: Box<Self>) {
        tracing::warn!(
            supervised = %self.supervised.address(),
            "failure notice dropped; supervisor unavailable"
        );
    }
}

/// Carry out a directive inside the supervisor's dispatch worker.
pub(crate) async fn apply_directive<S: Supervisor>(
    directive: Directive,
    strategy: &SupervisionStrategy,
    fault: Fault,
    supervised: Supervised,
    environment: &mut Environment<S>,
) {
    let targets = match strategy.scope() {
        SupervisionScope::One => vec![supervised.clone()],
        SupervisionScope::All => {
            let roster = environment.roster_snapshot();
            if roster.is_empty() {
                vec![supervised.clone()]
            } else {
                roster
            }
        }
    };

    match directive {
        Directive::Resume => {
            for target in &targets {
                // The failing actor is already suspended; siblings pulled
                // in by the All scope are paused the same way so the hook
                // never interleaves with a live dispatch worker.
                target.suspend_mailbox();
                target.resume_after_failure().await;
            }
        }
        Directive::Restart => {
            for target in &targets {
                target.suspend_mailbox();
                if target.restart_allowed(strategy) {
                    target.restart_with(&fault).await;
                } else {
                    environment.logger().warn(&format!(
                        "restart intensity exceeded for {}; stopping",
                        target.address()
                    ));
                    target.stop().await;
                }
            }
        }
        Directive::Stop => {
            for target in &targets {
                target.stop().await;
            }
        }
        Directive::Escalate => match environment.supervisor_handle() {
            Some(next) => next.inform(fault, supervised),
            None => {
                environment.logger().error(&format!(
                    "failure escalated past the root for {}; stopping",
                    supervised.address()
                ));
                supervised.stop().await;
            }
        },
    }
}
