//! The actor cell: body ownership, delivery, and lifecycle transitions.
//!
//! A cell exclusively owns one actor body and its environment, wires them
//! to the mailbox's dispatch worker, and carries the edges of the actor
//! tree: parent, children, supervisor. The body lives behind an async
//! mutex because handlers await; the single-worker mailbox keeps the lock
//! uncontended in steady state, while stop and restart serialize against
//! in-flight deliveries through it.

// Layer 1: Standard library imports
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;

// Layer 3: Internal module imports
use super::environment::Environment;
use super::lifecycle::{LifeCycle, LifeCycleState};
use super::protocol::Definition;
use super::reference::ActorRef;
use super::traits::Actor;
use crate::dead_letters::DeadLetter;
use crate::mailbox::{Dispatch, Mailbox};
use crate::message::{Fault, Invocation};
use crate::stage::{Stage, StageError};
use crate::supervision::handle::{Roster, SupervisedCell};
use crate::supervision::{Supervised, SupervisionStrategy, SupervisorHandle};
use crate::util::Address;

/// Erased view of an actor cell.
///
/// This is what directories store, parents hold their children as, and
/// shutdown walks operate on.
#[async_trait]
pub trait ActorHandle: Send + Sync {
    /// The actor's address.
    fn address(&self) -> &Address;

    /// Logical type name from the actor's definition.
    fn type_name(&self) -> &str;

    /// True once the actor reached its terminal state.
    fn is_stopped(&self) -> bool;

    /// Stop the actor: children first (awaited), `before_stop`, close the
    /// mailbox, `after_stop`. Idempotent.
    async fn stop(&self);

    #[doc(hidden)]
    fn adopt(&self, child: Arc<dyn ActorHandle>);

    #[doc(hidden)]
    fn abandon(&self, address: &Address);

    #[doc(hidden)]
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

pub(crate) struct CellGuts<A: Actor> {
    body: Option<A>,
    environment: Option<Environment<A>>,
}

pub(crate) struct ActorCell<A: Actor> {
    definition: Definition,
    factory: Arc<dyn Fn(&Definition) -> A + Send + Sync>,
    mailbox: Arc<dyn Mailbox<A>>,
    guts: AsyncMutex<CellGuts<A>>,
    life_cycle: RwLock<LifeCycle>,
    stage: Stage,
    parent: Option<Weak<dyn ActorHandle>>,
    supervisor: Option<SupervisorHandle>,
    children: Mutex<Vec<Arc<dyn ActorHandle>>>,
    roster: Roster,
}

impl<A: Actor> ActorCell<A> {
    pub(crate) fn new(
        definition: Definition,
        factory: Arc<dyn Fn(&Definition) -> A + Send + Sync>,
        mailbox: Arc<dyn Mailbox<A>>,
        stage: Stage,
        parent: Option<Weak<dyn ActorHandle>>,
        supervisor: Option<SupervisorHandle>,
    ) -> Self {
        Self {
            definition,
            factory,
            mailbox,
            guts: AsyncMutex::new(CellGuts {
                body: None,
                environment: None,
            }),
            life_cycle: RwLock::new(LifeCycle::new()),
            stage,
            parent,
            supervisor,
            children: Mutex::new(Vec::new()),
            roster: Roster::new(),
        }
    }

    /// Instantiate the body and install it with a fresh environment.
    /// Runs once, before the cell is published anywhere.
    pub(crate) fn install(cell: &Arc<Self>) -> Result<(), StageError> {
        let body = (cell.factory)(&cell.definition);
        let environment = Environment::new(ActorRef::from_cell(Arc::clone(cell)));
        match cell.guts.try_lock() {
            Ok(mut guts) => {
                guts.body = Some(body);
                guts.environment = Some(environment);
                Ok(())
            }
            Err(_) => Err(StageError::SpawnFailed(format!(
                "cell for {} busy during initialization",
                cell.definition.address()
            ))),
        }
    }

    pub(crate) fn address(&self) -> &Address {
        self.definition.address()
    }

    pub(crate) fn type_name(&self) -> &str {
        self.definition.type_name()
    }

    pub(crate) fn stage(&self) -> &Stage {
        &self.stage
    }

    pub(crate) fn mailbox(&self) -> &Arc<dyn Mailbox<A>> {
        &self.mailbox
    }

    pub(crate) fn supervisor_handle(&self) -> Option<SupervisorHandle> {
        self.supervisor.clone()
    }

    pub(crate) fn roster_ref(&self) -> &Roster {
        &self.roster
    }

    pub(crate) fn parent_handle(&self) -> Option<Arc<dyn ActorHandle>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn children_handles(&self) -> Vec<Arc<dyn ActorHandle>> {
        self.children.lock().clone()
    }

    pub(crate) fn life_cycle_state(&self) -> LifeCycleState {
        self.life_cycle.read().state()
    }

    pub(crate) fn restart_count(&self) -> u32 {
        self.life_cycle.read().restart_count()
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.life_cycle.read().is_stopped()
    }

    /// Stop: children first, then hooks around the mailbox close.
    pub(crate) async fn stop(&self) {
        if !self.life_cycle.write().begin_stopping() {
            return;
        }

        let children: Vec<Arc<dyn ActorHandle>> = {
            let mut children = self.children.lock();
            children.drain(..).collect()
        };
        for child in children {
            child.stop().await;
        }

        {
            let mut guts = self.guts.lock().await;
            let CellGuts { body, environment } = &mut *guts;
            match (body.as_mut(), environment.as_mut()) {
                (Some(body), Some(environment)) => {
                    if let Err(error) = body.before_stop(environment).await {
                        environment
                            .logger()
                            .warn(&format!("before_stop failed: {error}"));
                    }
                    self.mailbox.close();
                    if let Err(error) = body.after_stop(environment).await {
                        environment
                            .logger()
                            .warn(&format!("after_stop failed: {error}"));
                    }
                }
                _ => self.mailbox.close(),
            }
            guts.body = None;
            guts.environment = None;
        }

        self.life_cycle.write().transition_to(LifeCycleState::Stopped);
        self.stage.release(self.address());
        if let Some(supervisor) = &self.supervisor {
            supervisor.roster().remove(self.address());
        }
        if let Some(parent) = self.parent_handle() {
            parent.abandon(self.address());
        }
    }

    /// Replace the body with a fresh instance from the original
    /// definition. The mailbox is suspended throughout and resumed last.
    pub(crate) async fn restart(&self, cause: &Fault) {
        if self.life_cycle.read().is_stopped() {
            return;
        }
        self.life_cycle
            .write()
            .transition_to(LifeCycleState::Restarting);

        {
            let mut guts = self.guts.lock().await;
            let CellGuts { body, environment } = &mut *guts;
            if let (Some(current), Some(environment)) = (body.as_mut(), environment.as_mut()) {
                if let Err(error) = current.before_restart(environment, cause).await {
                    environment
                        .logger()
                        .warn(&format!("before_restart failed: {error}"));
                }
                let mut fresh = (self.factory)(&self.definition);
                if let Err(error) = fresh.after_restart(environment).await {
                    environment
                        .logger()
                        .warn(&format!("after_restart failed: {error}"));
                }
                *current = fresh;
            }
        }

        self.life_cycle.write().transition_to(LifeCycleState::Started);
        self.mailbox.resume();
    }

    /// Keep the body and its state; run the hook and resume the mailbox.
    pub(crate) async fn resume(&self) {
        if self.life_cycle.read().is_stopped() {
            return;
        }
        self.life_cycle
            .write()
            .transition_to(LifeCycleState::Resuming);

        {
            let mut guts = self.guts.lock().await;
            let CellGuts { body, environment } = &mut *guts;
            if let (Some(body), Some(environment)) = (body.as_mut(), environment.as_mut()) {
                if let Err(error) = body.before_resume(environment).await {
                    environment
                        .logger()
                        .warn(&format!("before_resume failed: {error}"));
                }
            }
        }

        self.life_cycle.write().transition_to(LifeCycleState::Started);
        self.mailbox.resume();
    }

    /// Failure path out of a delivery: the completion is already settled
    /// with the fault; suspend the mailbox, then hand the decision to the
    /// supervisor's mailbox.
    fn handle_failure(cell: &Arc<Self>, fault: Fault) {
        cell.mailbox.suspend();
        match &cell.supervisor {
            Some(supervisor) => {
                let supervised =
                    Supervised::from_cell(Arc::clone(cell) as Arc<dyn SupervisedCell>);
                supervisor.inform(fault, supervised);
            }
            None => {
                // Root guardians have no supervisor above them.
                tracing::error!(
                    actor = %cell.address(),
                    "unsupervised failure: {fault}; resuming"
                );
                cell.mailbox.resume();
            }
        }
    }
}

impl<A: Actor> Dispatch<A> for ActorCell<A> {
    fn deliver(self: Arc<Self>, invocation: Box<dyn Invocation<A>>) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            let fault = {
                let mut guts = self.guts.lock().await;
                let CellGuts { body, environment } = &mut *guts;
                match (body.as_mut(), environment.as_mut()) {
                    (Some(body), Some(environment)) => {
                        environment
                            .execution_context_mut()
                            .begin(invocation.description());
                        let description = invocation.description();
                        match AssertUnwindSafe(invocation.invoke(body, environment))
                            .catch_unwind()
                            .await
                        {
                            Ok(outcome) => outcome.err(),
                            // A panicking handler is a failure like any
                            // other; its completion reads as dropped.
                            Err(_) => Some(Fault::message(format!(
                                "handler panicked in {description}"
                            ))),
                        }
                    }
                    _ => {
                        // Raced with stop: account the message as a dead
                        // letter so at-most-once bookkeeping stays exact.
                        let representation =
                            format!("{}::{}", self.type_name(), invocation.description());
                        self.stage.dead_letters().failed_delivery(DeadLetter::new(
                            self.address().clone(),
                            representation,
                        ));
                        invocation.discard();
                        None
                    }
                }
            };
            if let Some(fault) = fault {
                Self::handle_failure(&self, fault);
            }
        })
    }
}

#[async_trait]
impl<A: Actor> ActorHandle for ActorCell<A> {
    fn address(&self) -> &Address {
        ActorCell::address(self)
    }

    fn type_name(&self) -> &str {
        ActorCell::type_name(self)
    }

    fn is_stopped(&self) -> bool {
        ActorCell::is_stopped(self)
    }

    async fn stop(&self) {
        ActorCell::stop(self).await;
    }

    fn adopt(&self, child: Arc<dyn ActorHandle>) {
        self.children.lock().push(child);
    }

    fn abandon(&self, address: &Address) {
        self.children
            .lock()
            .retain(|child| child.address() != address);
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[async_trait]
impl<A: Actor> SupervisedCell for ActorCell<A> {
    fn supervised_address(&self) -> &Address {
        ActorCell::address(self)
    }

    fn supervised_type_name(&self) -> &str {
        ActorCell::type_name(self)
    }

    fn supervised_is_stopped(&self) -> bool {
        ActorCell::is_stopped(self)
    }

    fn restart_allowed(&self, strategy: &SupervisionStrategy) -> bool {
        self.life_cycle.write().restart_allowed(strategy)
    }

    fn suspend_mailbox(&self) {
        self.mailbox.suspend();
    }

    async fn resume_after_failure(&self) {
        ActorCell::resume(self).await;
    }

    async fn restart_with(&self, cause: &Fault) {
        ActorCell::restart(self, cause).await;
    }

    async fn stop_supervised(&self) {
        ActorCell::stop(self).await;
    }
}
