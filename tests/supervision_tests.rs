//! Supervision: directives, strategies, escalation, and intensity bounds.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use stagework::prelude::*;
use stagework::testkit::{await_assert, await_state_value};
use tokio::time::sleep;

struct Bump;

impl Message for Bump {
    const MESSAGE_TYPE: &'static str = "bump";
    type Reply = ();
}

struct Crash;

impl Message for Crash {
    const MESSAGE_TYPE: &'static str = "crash";
    type Reply = ();
}

struct Value;

impl Message for Value {
    const MESSAGE_TYPE: &'static str = "value";
    type Reply = u64;
}

struct SlowBump {
    entered: Arc<AtomicBool>,
}

impl Message for SlowBump {
    const MESSAGE_TYPE: &'static str = "slow-bump";
    type Reply = ();
}

struct FlakyActor {
    count: u64,
}

#[async_trait]
impl Actor for FlakyActor {
    fn observable_state(&self) -> ObservableState {
        ObservableState::empty().with("count", self.count)
    }
}

#[async_trait]
impl Handler<Bump> for FlakyActor {
    async fn handle(
        &mut self,
        _message: Bump,
        _environment: &mut Environment<Self>,
    ) -> Result<(), ActorError> {
        self.count += 1;
        Ok(())
    }
}

#[async_trait]
impl Handler<Crash> for FlakyActor {
    async fn handle(
        &mut self,
        _message: Crash,
        _environment: &mut Environment<Self>,
    ) -> Result<(), ActorError> {
        Err("intentional failure".into())
    }
}

#[async_trait]
impl Handler<Value> for FlakyActor {
    async fn handle(
        &mut self,
        _message: Value,
        _environment: &mut Environment<Self>,
    ) -> Result<u64, ActorError> {
        Ok(self.count)
    }
}

#[async_trait]
impl Handler<SlowBump> for FlakyActor {
    async fn handle(
        &mut self,
        message: SlowBump,
        _environment: &mut Environment<Self>,
    ) -> Result<(), ActorError> {
        message.entered.store(true, Ordering::SeqCst);
        sleep(Duration::from_millis(100)).await;
        self.count += 1;
        Ok(())
    }
}

struct Flaky {
    reference: ActorRef<FlakyActor>,
}

impl Flaky {
    fn bump(&self) -> Completion<()> {
        self.reference.send(Bump)
    }

    fn crash(&self) -> Completion<()> {
        self.reference.send(Crash)
    }

    fn value(&self) -> Completion<u64> {
        self.reference.send(Value)
    }

    fn slow_bump(&self, entered: Arc<AtomicBool>) -> Completion<()> {
        self.reference.send(SlowBump { entered })
    }
}

impl Protocol for Flaky {
    type Body = FlakyActor;

    fn type_name() -> &'static str {
        "Flaky"
    }

    fn instantiate(_definition: &Definition) -> FlakyActor {
        FlakyActor { count: 0 }
    }

    fn from_ref(reference: ActorRef<FlakyActor>) -> Self {
        Self { reference }
    }

    fn reference(&self) -> &ActorRef<FlakyActor> {
        &self.reference
    }
}

macro_rules! supervisor_fixture {
    ($body:ident, $proxy:ident, $directive:expr, $strategy:expr) => {
        struct $body;

        #[async_trait]
        impl Actor for $body {}

        #[async_trait]
        impl Supervisor for $body {
            fn supervision_strategy(&self) -> SupervisionStrategy {
                $strategy
            }

            fn decide_directive(
                &mut self,
                _fault: &Fault,
                _supervised: &Supervised,
                _strategy: &SupervisionStrategy,
            ) -> Directive {
                $directive
            }
        }

        struct $proxy {
            reference: ActorRef<$body>,
        }

        impl Protocol for $proxy {
            type Body = $body;

            fn type_name() -> &'static str {
                stringify!($proxy)
            }

            fn instantiate(_definition: &Definition) -> $body {
                $body
            }

            fn from_ref(reference: ActorRef<$body>) -> Self {
                Self { reference }
            }

            fn reference(&self) -> &ActorRef<$body> {
                &self.reference
            }
        }
    };
}

supervisor_fixture!(
    RestartingSupervisorActor,
    RestartingSupervisor,
    Directive::Restart,
    SupervisionStrategy::default()
);
supervisor_fixture!(
    ResumingSupervisorActor,
    ResumingSupervisor,
    Directive::Resume,
    SupervisionStrategy::default()
);
supervisor_fixture!(
    StoppingSupervisorActor,
    StoppingSupervisor,
    Directive::Stop,
    SupervisionStrategy::default()
);
supervisor_fixture!(
    EscalatingSupervisorActor,
    EscalatingSupervisor,
    Directive::Escalate,
    SupervisionStrategy::default()
);
supervisor_fixture!(
    LimitedRestartSupervisorActor,
    LimitedRestartSupervisor,
    Directive::Restart,
    SupervisionStrategy::new(Some(1), Duration::from_secs(60), SupervisionScope::One)
);
supervisor_fixture!(
    AllScopeSupervisorActor,
    AllScopeSupervisor,
    Directive::Restart,
    SupervisionStrategy::forever(SupervisionScope::All)
);

#[tokio::test]
async fn test_caller_observes_handler_failure() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let _supervisor: RestartingSupervisor = stage
        .supervisor_for("restarting", Definition::new("RestartingSupervisor", Address::unique()))
        .unwrap();
    let flaky: Flaky = stage
        .actor_for_supervised(Definition::new("Flaky", Address::unique()), "restarting")
        .unwrap();

    let fault = flaky.crash().await.fault().unwrap();
    assert!(fault.to_string().contains("intentional failure"));
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_restart_resets_state() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let _supervisor: RestartingSupervisor = stage
        .supervisor_for("restarting", Definition::new("RestartingSupervisor", Address::unique()))
        .unwrap();
    let flaky: Flaky = stage
        .actor_for_supervised(Definition::new("Flaky", Address::unique()), "restarting")
        .unwrap();

    flaky.bump().await;
    flaky.bump().await;
    assert_eq!(flaky.value().await.value(), Some(2));

    flaky.crash().await;

    assert!(
        await_state_value(flaky.reference(), "count", &json!(0), Duration::from_secs(2)).await,
        "restart did not reset the counter"
    );
    assert_eq!(flaky.reference().restart_count(), 1);

    flaky.bump().await;
    assert_eq!(flaky.value().await.value(), Some(1));
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_resume_preserves_state() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let _supervisor: ResumingSupervisor = stage
        .supervisor_for("resuming", Definition::new("ResumingSupervisor", Address::unique()))
        .unwrap();
    let flaky: Flaky = stage
        .actor_for_supervised(Definition::new("Flaky", Address::unique()), "resuming")
        .unwrap();

    flaky.bump().await;
    flaky.bump().await;
    flaky.crash().await;

    assert_eq!(flaky.value().await.value(), Some(2));
    flaky.bump().await;
    assert_eq!(flaky.value().await.value(), Some(3));
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_stop_directive_stops_the_actor() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let _supervisor: StoppingSupervisor = stage
        .supervisor_for("stopping", Definition::new("StoppingSupervisor", Address::unique()))
        .unwrap();
    let address = Address::unique();
    let flaky: Flaky = stage
        .actor_for_supervised(Definition::new("Flaky", address.clone()), "stopping")
        .unwrap();

    flaky.crash().await;

    assert!(await_assert(Duration::from_secs(2), || flaky.is_stopped()).await);
    assert!(flaky.bump().await.is_dropped());
    assert!(stage.actor_of::<Flaky>(&address).is_none());
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_escalation_reaches_the_root() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    // The escalating supervisor hands the failure to the private root,
    // which restarts the supervised actor.
    let _supervisor: EscalatingSupervisor = stage
        .supervisor_for("escalating", Definition::new("EscalatingSupervisor", Address::unique()))
        .unwrap();
    let flaky: Flaky = stage
        .actor_for_supervised(Definition::new("Flaky", Address::unique()), "escalating")
        .unwrap();

    flaky.bump().await;
    flaky.crash().await;

    assert!(
        await_state_value(flaky.reference(), "count", &json!(0), Duration::from_secs(2)).await,
        "escalated failure did not restart the actor"
    );
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_intensity_breach_demotes_restart_to_stop() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let _supervisor: LimitedRestartSupervisor = stage
        .supervisor_for("limited", Definition::new("LimitedRestartSupervisor", Address::unique()))
        .unwrap();
    let flaky: Flaky = stage
        .actor_for_supervised(Definition::new("Flaky", Address::unique()), "limited")
        .unwrap();

    // First failure: within intensity, restarts.
    flaky.crash().await;
    assert!(
        await_state_value(flaky.reference(), "count", &json!(0), Duration::from_secs(2)).await
    );
    assert!(!flaky.is_stopped());

    // Second failure inside the period: bound exceeded, stopped.
    flaky.crash().await;
    assert!(await_assert(Duration::from_secs(2), || flaky.is_stopped()).await);
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_all_scope_applies_directive_to_siblings() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let _supervisor: AllScopeSupervisor = stage
        .supervisor_for("all-scope", Definition::new("AllScopeSupervisor", Address::unique()))
        .unwrap();
    let first: Flaky = stage
        .actor_for_supervised(Definition::new("Flaky1", Address::unique()), "all-scope")
        .unwrap();
    let second: Flaky = stage
        .actor_for_supervised(Definition::new("Flaky2", Address::unique()), "all-scope")
        .unwrap();

    first.bump().await;
    second.bump().await;
    second.bump().await;

    first.crash().await;

    assert!(
        await_state_value(first.reference(), "count", &json!(0), Duration::from_secs(2)).await
    );
    assert!(
        await_state_value(second.reference(), "count", &json!(0), Duration::from_secs(2)).await,
        "sibling was not restarted by the All scope"
    );
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_all_scope_restart_waits_for_in_flight_sibling_delivery() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let _supervisor: AllScopeSupervisor = stage
        .supervisor_for("all-scope", Definition::new("AllScopeSupervisor", Address::unique()))
        .unwrap();
    let first: Flaky = stage
        .actor_for_supervised(Definition::new("Flaky1", Address::unique()), "all-scope")
        .unwrap();
    let second: Flaky = stage
        .actor_for_supervised(Definition::new("Flaky2", Address::unique()), "all-scope")
        .unwrap();

    // Park the sibling inside a handler, then fail the first actor while
    // that delivery is still in flight.
    let entered = Arc::new(AtomicBool::new(false));
    let slow = second.slow_bump(Arc::clone(&entered));
    assert!(await_assert(Duration::from_secs(1), || entered.load(Ordering::SeqCst)).await);

    first.crash().await;

    // The sibling's restart serializes behind the in-flight delivery:
    // the slow bump completes against the old body, then the fresh body
    // starts at zero.
    assert!(slow.await.is_completed());
    assert!(
        await_state_value(second.reference(), "count", &json!(0), Duration::from_secs(2)).await,
        "sibling restart did not wait out the in-flight delivery"
    );

    second.bump().await;
    assert_eq!(second.value().await.value(), Some(1));
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_register_existing_supervisor() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let supervisor: ResumingSupervisor = stage
        .actor_for(Definition::new("ResumingSupervisor", Address::unique()))
        .unwrap();
    stage.register_supervisor("registered-resume", &supervisor);

    let flaky: Flaky = stage
        .actor_for_supervised(Definition::new("Flaky", Address::unique()), "registered-resume")
        .unwrap();

    flaky.bump().await;
    flaky.crash().await;
    assert_eq!(flaky.value().await.value(), Some(1));
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_unknown_supervisor_name_is_an_error() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let result = stage
        .actor_for_supervised::<Flaky>(Definition::new("Flaky", Address::unique()), "nobody");
    assert!(matches!(result, Err(StageError::UnknownSupervisor(_))));
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_default_public_root_restarts_user_actors() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let flaky: Flaky = stage
        .actor_for(Definition::new("Flaky", Address::unique()))
        .unwrap();

    flaky.bump().await;
    flaky.crash().await;

    assert!(
        await_state_value(flaky.reference(), "count", &json!(0), Duration::from_secs(2)).await,
        "public root did not restart the crashed actor"
    );
    stage.close().await.unwrap();
}
