//! The stage: root container and factory for actors.
//!
//! A stage owns the directory, the dead-letter sink, the scheduler, and
//! the two root guardians, and is the only way actors come into
//! existence. Construct one at program entry, pass it (or let actors
//! reach it through their environment), and close it on the way out:
//! init → use → close.

// Layer 1: Standard library imports
use std::fmt;
use std::sync::{Arc, OnceLock};

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::time::timeout;

// Layer 3: Internal module imports
use super::config::StageConfig;
use super::errors::StageError;
use super::guardians::{PrivateRootActor, PublicRootActor};
use crate::actor::cell::ActorCell;
use crate::actor::{Actor, ActorHandle, ActorRef, Definition, Protocol};
use crate::dead_letters::DeadLetters;
use crate::directory::Directory;
use crate::mailbox::{BoundedMailbox, Dispatch, Mailbox, MailboxKind, UnboundedMailbox};
use crate::message::envelope::StartInvocation;
use crate::scheduler::Scheduler;
use crate::supervision::handle::SupervisedCell;
use crate::supervision::{Supervised, Supervisor, SupervisorHandle};
use crate::util::{Address, Logger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageState {
    Running,
    Closing,
    Closed,
}

struct RootGuardians {
    private_root: Arc<dyn ActorHandle>,
    public_root: Arc<dyn ActorHandle>,
    private_supervision: SupervisorHandle,
    public_supervision: SupervisorHandle,
}

struct StageInner {
    config: StageConfig,
    directory: Directory,
    dead_letters: Arc<DeadLetters>,
    scheduler: Scheduler,
    supervisors: DashMap<String, SupervisorHandle>,
    roots: OnceLock<RootGuardians>,
    state: RwLock<StageState>,
    logger: Logger,
}

/// Root container of an actor population. Cheap to clone.
///
/// Must be created inside a tokio runtime: the guardians' dispatch
/// workers are tokio tasks.
///
/// # Example
/// ```rust,ignore
/// use stagework::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), StageError> {
///     let stage = Stage::new(StageConfig::default())?;
///
///     let counter: Counter =
///         stage.actor_for(Definition::new("Counter", Address::unique()))?;
///     counter.increment().await;
///
///     stage.close().await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Stage {
    inner: Arc<StageInner>,
}

impl Stage {
    /// Build a stage, its services, and its root guardians.
    pub fn new(config: StageConfig) -> Result<Self, StageError> {
        config.validate()?;
        let inner = Arc::new(StageInner {
            directory: Directory::new(config.directory_shards, config.directory_shard_capacity),
            dead_letters: Arc::new(DeadLetters::new()),
            scheduler: Scheduler::new(config.scheduler_resolution),
            supervisors: DashMap::new(),
            roots: OnceLock::new(),
            state: RwLock::new(StageState::Running),
            logger: Logger::named("stage"),
            config,
        });
        let stage = Self { inner };

        let private_ref: ActorRef<PrivateRootActor> = stage.spawn_cell::<PrivateRootActor>(
            Definition::new("private-root", Address::unique()),
            Arc::new(|_definition: &Definition| PrivateRootActor),
            None,
            None,
        )?;
        let private_supervision = SupervisorHandle::for_supervisor(&private_ref);
        let private_root = private_ref.handle();

        let public_ref: ActorRef<PublicRootActor> = stage.spawn_cell::<PublicRootActor>(
            Definition::new("public-root", Address::unique()),
            Arc::new(|_definition: &Definition| PublicRootActor),
            Some(Arc::clone(&private_root)),
            Some(private_supervision.clone()),
        )?;
        let public_supervision = SupervisorHandle::for_supervisor(&public_ref);
        let public_root = public_ref.handle();

        let _ = stage.inner.roots.set(RootGuardians {
            private_root,
            public_root,
            private_supervision,
            public_supervision,
        });
        Ok(stage)
    }

    /// Create a top-level actor under the public root.
    pub fn actor_for<P: Protocol>(&self, definition: Definition) -> Result<P, StageError> {
        let roots = self.roots()?;
        let reference = self.spawn_cell::<P::Body>(
            definition,
            Arc::new(P::instantiate),
            Some(Arc::clone(&roots.public_root)),
            Some(roots.public_supervision.clone()),
        )?;
        Ok(P::from_ref(reference))
    }

    /// Create a top-level actor supervised by a named supervisor.
    pub fn actor_for_supervised<P: Protocol>(
        &self,
        definition: Definition,
        supervisor_name: &str,
    ) -> Result<P, StageError> {
        let supervisor = self.supervisor_named(supervisor_name)?;
        let roots = self.roots()?;
        let reference = self.spawn_cell::<P::Body>(
            definition,
            Arc::new(P::instantiate),
            Some(Arc::clone(&roots.public_root)),
            Some(supervisor),
        )?;
        Ok(P::from_ref(reference))
    }

    /// Create a supervisor actor under the private root and register it
    /// under `name`.
    pub fn supervisor_for<P>(&self, name: &str, definition: Definition) -> Result<P, StageError>
    where
        P: Protocol,
        P::Body: Supervisor,
    {
        let roots = self.roots()?;
        let reference = self.spawn_cell::<P::Body>(
            definition,
            Arc::new(P::instantiate),
            Some(Arc::clone(&roots.private_root)),
            Some(roots.private_supervision.clone()),
        )?;
        self.inner
            .supervisors
            .insert(name.to_owned(), SupervisorHandle::for_supervisor(&reference));
        Ok(P::from_ref(reference))
    }

    /// Associate a logical name with an existing supervisor actor.
    pub fn register_supervisor<P>(&self, name: &str, proxy: &P)
    where
        P: Protocol,
        P::Body: Supervisor,
    {
        self.inner.supervisors.insert(
            name.to_owned(),
            SupervisorHandle::for_supervisor(proxy.reference()),
        );
    }

    /// Look up a live actor by address. Returns the same underlying cell
    /// for repeated lookups; `None` for stopped or never-registered
    /// addresses, or when `P` does not match the registered actor.
    pub fn actor_of<P: Protocol>(&self, address: &Address) -> Option<P> {
        let handle = self.inner.directory.get(address)?;
        let cell = handle.as_any_arc().downcast::<ActorCell<P::Body>>().ok()?;
        Some(P::from_ref(ActorRef::from_cell(cell)))
    }

    /// The stage's dead-letter sink.
    pub fn dead_letters(&self) -> &DeadLetters {
        &self.inner.dead_letters
    }

    /// The stage's scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// The configuration the stage runs with.
    pub fn config(&self) -> &StageConfig {
        &self.inner.config
    }

    /// Registered actors, root guardians included.
    pub fn actor_count(&self) -> usize {
        self.inner.directory.size()
    }

    /// True once `close` has been called.
    pub fn is_closed(&self) -> bool {
        *self.inner.state.read() != StageState::Running
    }

    /// Stop every actor (children before parents), then the guardians,
    /// then cancel the scheduler. Idempotent; bounded by the configured
    /// close timeout.
    pub async fn close(&self) -> Result<(), StageError> {
        {
            let mut state = self.inner.state.write();
            match *state {
                StageState::Running => *state = StageState::Closing,
                StageState::Closing | StageState::Closed => return Ok(()),
            }
        }
        self.inner.logger.info("stage closing");
        let close_timeout = self.inner.config.close_timeout;
        let outcome = timeout(close_timeout, self.close_internal()).await;
        *self.inner.state.write() = StageState::Closed;
        match outcome {
            Ok(()) => Ok(()),
            Err(_) => Err(StageError::CloseTimeout(close_timeout)),
        }
    }

    async fn close_internal(&self) {
        if let Some(roots) = self.inner.roots.get() {
            roots.public_root.stop().await;
            roots.private_root.stop().await;
        }
        self.inner.scheduler.close();
        self.inner.supervisors.clear();
        self.inner.directory.clear();
    }

    pub(crate) fn supervisor_named(&self, name: &str) -> Result<SupervisorHandle, StageError> {
        self.inner
            .supervisors
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StageError::UnknownSupervisor(name.to_owned()))
    }

    pub(crate) fn spawn_child<P: Protocol>(
        &self,
        definition: Definition,
        parent: Arc<dyn ActorHandle>,
        supervisor: Option<SupervisorHandle>,
    ) -> Result<P, StageError> {
        let supervisor = match supervisor {
            Some(handle) => handle,
            None => self.roots()?.public_supervision.clone(),
        };
        let reference = self.spawn_cell::<P::Body>(
            definition,
            Arc::new(P::instantiate),
            Some(parent),
            Some(supervisor),
        )?;
        Ok(P::from_ref(reference))
    }

    pub(crate) fn release(&self, address: &Address) {
        self.inner.directory.unregister(address);
    }

    fn roots(&self) -> Result<&RootGuardians, StageError> {
        self.inner.roots.get().ok_or(StageError::NotInitialized)
    }

    fn spawn_cell<A: Actor>(
        &self,
        definition: Definition,
        factory: Arc<dyn Fn(&Definition) -> A + Send + Sync>,
        parent: Option<Arc<dyn ActorHandle>>,
        supervisor: Option<SupervisorHandle>,
    ) -> Result<ActorRef<A>, StageError> {
        if *self.inner.state.read() != StageState::Running {
            return Err(StageError::Closed);
        }

        let kind = definition
            .mailbox_kind()
            .unwrap_or(self.inner.config.default_mailbox);
        let address = definition.address().clone();
        let label = definition.type_name().to_owned();
        let mailbox: Arc<dyn Mailbox<A>> = match kind {
            MailboxKind::Unbounded => Arc::new(UnboundedMailbox::new(
                label,
                address.clone(),
                Arc::clone(&self.inner.dead_letters),
            )),
            MailboxKind::Bounded { capacity, policy } => Arc::new(BoundedMailbox::new(
                label,
                address.clone(),
                Arc::clone(&self.inner.dead_letters),
                capacity,
                policy,
            )),
        };

        let cell = Arc::new(ActorCell::new(
            definition,
            factory,
            Arc::clone(&mailbox),
            self.clone(),
            parent.as_ref().map(Arc::downgrade),
            supervisor.clone(),
        ));
        let dispatcher: Arc<dyn Dispatch<A>> = Arc::clone(&cell) as Arc<dyn Dispatch<A>>;
        mailbox.attach(Arc::downgrade(&dispatcher));
        drop(dispatcher);
        ActorCell::install(&cell)?;

        self.inner
            .directory
            .register(address, Arc::clone(&cell) as Arc<dyn ActorHandle>);
        if let Some(parent) = parent {
            parent.adopt(Arc::clone(&cell) as Arc<dyn ActorHandle>);
        }
        if let Some(supervisor) = &supervisor {
            supervisor
                .roster()
                .add(Supervised::from_cell(
                    Arc::clone(&cell) as Arc<dyn SupervisedCell>
                ));
        }
        mailbox.send(Box::new(StartInvocation));
        Ok(ActorRef::from_cell(cell))
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("actors", &self.actor_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}
