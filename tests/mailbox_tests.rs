//! Mailbox behavior: suspension, overflow policies, and closed delivery.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use stagework::prelude::*;
use stagework::testkit::{await_assert, TestDeadLettersListener};

struct Ping;

impl Message for Ping {
    const MESSAGE_TYPE: &'static str = "ping";
    type Reply = ();
}

struct Deliver(u64);

impl Message for Deliver {
    const MESSAGE_TYPE: &'static str = "deliver";
    type Reply = ();
}

struct RecorderActor {
    seen: Arc<Mutex<Vec<u64>>>,
}

#[async_trait]
impl Actor for RecorderActor {}

#[async_trait]
impl Handler<Ping> for RecorderActor {
    async fn handle(
        &mut self,
        _message: Ping,
        _environment: &mut Environment<Self>,
    ) -> Result<(), ActorError> {
        Ok(())
    }
}

#[async_trait]
impl Handler<Deliver> for RecorderActor {
    async fn handle(
        &mut self,
        message: Deliver,
        _environment: &mut Environment<Self>,
    ) -> Result<(), ActorError> {
        self.seen.lock().push(message.0);
        Ok(())
    }
}

struct Recorder {
    reference: ActorRef<RecorderActor>,
}

impl Recorder {
    fn ping(&self) -> Completion<()> {
        self.reference.send(Ping)
    }

    fn deliver(&self, value: u64) -> Completion<()> {
        self.reference.send(Deliver(value))
    }
}

impl Protocol for Recorder {
    type Body = RecorderActor;

    fn type_name() -> &'static str {
        "Recorder"
    }

    fn instantiate(definition: &Definition) -> RecorderActor {
        RecorderActor {
            seen: definition
                .parameters()
                .get::<Arc<Mutex<Vec<u64>>>>(0)
                .cloned()
                .unwrap(),
        }
    }

    fn from_ref(reference: ActorRef<RecorderActor>) -> Self {
        Self { reference }
    }

    fn reference(&self) -> &ActorRef<RecorderActor> {
        &self.reference
    }
}

/// Spawn a recorder and wait until its start work has drained, so
/// suspension tests see an empty queue.
async fn recorder_on(stage: &Stage, mailbox: MailboxKind) -> (Recorder, Arc<Mutex<Vec<u64>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder: Recorder = stage
        .actor_for(
            Definition::new("Recorder", Address::unique())
                .with_parameters(stagework::parameters![Arc::clone(&seen)])
                .with_mailbox(mailbox),
        )
        .unwrap();
    recorder.ping().await;
    (recorder, seen)
}

#[tokio::test]
async fn test_suspend_buffers_resume_drains() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let (recorder, seen) = recorder_on(&stage, MailboxKind::Unbounded).await;

    recorder.reference().mailbox().suspend();
    for value in 1..=5 {
        let _ = recorder.deliver(value);
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(seen.lock().is_empty(), "suspended mailbox delivered");
    assert_eq!(recorder.reference().mailbox().size(), 5);
    assert!(recorder.reference().mailbox().is_suspended());
    assert!(recorder.reference().mailbox().is_receivable());

    recorder.reference().mailbox().resume();
    assert!(await_assert(Duration::from_secs(1), || seen.lock().len() == 5).await);
    assert_eq!(seen.lock().clone(), vec![1, 2, 3, 4, 5]);
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_drop_oldest_evicts_head() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let (recorder, seen) = recorder_on(
        &stage,
        MailboxKind::Bounded {
            capacity: 3,
            policy: OverflowPolicy::DropOldest,
        },
    )
    .await;

    recorder.reference().mailbox().suspend();
    let completions: Vec<Completion<()>> = (1..=5).map(|value| recorder.deliver(value)).collect();
    recorder.reference().mailbox().resume();

    let mut outcomes = Vec::new();
    for completion in completions {
        outcomes.push(completion.await);
    }
    assert!(outcomes[0].is_dropped());
    assert!(outcomes[1].is_dropped());
    assert!(outcomes[2].is_completed());
    assert!(outcomes[3].is_completed());
    assert!(outcomes[4].is_completed());

    assert_eq!(seen.lock().clone(), vec![3, 4, 5]);
    assert_eq!(recorder.reference().mailbox().dropped_count(), 2);
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_drop_newest_rejects_incoming() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let (recorder, seen) = recorder_on(
        &stage,
        MailboxKind::Bounded {
            capacity: 2,
            policy: OverflowPolicy::DropNewest,
        },
    )
    .await;

    recorder.reference().mailbox().suspend();
    let completions: Vec<Completion<()>> = (1..=4).map(|value| recorder.deliver(value)).collect();
    recorder.reference().mailbox().resume();

    let mut outcomes = Vec::new();
    for completion in completions {
        outcomes.push(completion.await);
    }
    assert!(outcomes[0].is_completed());
    assert!(outcomes[1].is_completed());
    assert!(outcomes[2].is_dropped());
    assert!(outcomes[3].is_dropped());

    assert_eq!(seen.lock().clone(), vec![1, 2]);
    assert_eq!(recorder.reference().mailbox().dropped_count(), 2);
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_reject_routes_to_dead_letters() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let listener = Arc::new(TestDeadLettersListener::new());
    stage
        .dead_letters()
        .register_listener(Arc::clone(&listener) as Arc<dyn DeadLettersListener>);

    let (recorder, seen) = recorder_on(
        &stage,
        MailboxKind::Bounded {
            capacity: 2,
            policy: OverflowPolicy::Reject,
        },
    )
    .await;

    recorder.reference().mailbox().suspend();
    let completions: Vec<Completion<()>> = (1..=5).map(|value| recorder.deliver(value)).collect();

    assert!(listener.await_count(3, Duration::from_secs(1)).await);
    assert_eq!(recorder.reference().mailbox().dropped_count(), 3);

    recorder.reference().mailbox().resume();
    let mut outcomes = Vec::new();
    for completion in completions {
        outcomes.push(completion.await);
    }
    assert!(outcomes[0].is_completed());
    assert!(outcomes[1].is_completed());
    assert!(outcomes[2].is_dropped());
    assert!(outcomes[3].is_dropped());
    assert!(outcomes[4].is_dropped());

    assert_eq!(seen.lock().clone(), vec![1, 2]);
    for record in listener.records() {
        assert_eq!(record.representation(), "Recorder::deliver");
        assert_eq!(record.destination(), recorder.address());
    }
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_send_after_stop_becomes_dead_letter() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let listener = Arc::new(TestDeadLettersListener::new());
    stage
        .dead_letters()
        .register_listener(Arc::clone(&listener) as Arc<dyn DeadLettersListener>);

    let (recorder, seen) = recorder_on(&stage, MailboxKind::Unbounded).await;
    recorder.reference().stop().await;
    assert!(recorder.is_stopped());
    assert!(recorder.reference().mailbox().is_closed());

    let delivery = recorder.deliver(9).await;
    assert!(delivery.is_dropped());
    assert!(listener.await_count(1, Duration::from_secs(1)).await);
    assert!(seen.lock().is_empty());
    stage.close().await.unwrap();
}

#[tokio::test]
async fn test_closed_mailbox_drains_queued_messages_to_dead_letters() {
    let stage = Stage::new(StageConfig::default()).unwrap();
    let listener = Arc::new(TestDeadLettersListener::new());
    stage
        .dead_letters()
        .register_listener(Arc::clone(&listener) as Arc<dyn DeadLettersListener>);

    let (recorder, seen) = recorder_on(&stage, MailboxKind::Unbounded).await;
    recorder.reference().mailbox().suspend();
    let pending: Vec<Completion<()>> = (1..=3).map(|value| recorder.deliver(value)).collect();

    recorder.reference().stop().await;

    for completion in pending {
        assert!(completion.await.is_dropped());
    }
    assert!(listener.await_count(3, Duration::from_secs(1)).await);
    assert!(seen.lock().is_empty());
    stage.close().await.unwrap();
}
