use std::sync::{Arc, Mutex};
use std::time::Duration;

use companion_model::PromptMessage;
use companion_test_model::{PresetOutcome, ScriptedProvider};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

use super::{REPLY_ERROR_PREFIX, Session, SessionBuilder, Snapshot};
use crate::conversation::{ChatRole, ConversationSeed, SeedMessage};

fn seeds() -> Vec<ConversationSeed> {
    vec![
        ConversationSeed {
            id: "alpha".to_owned(),
            title: "Alpha".to_owned(),
            description: "First thread".to_owned(),
            timestamp: "09:24".to_owned(),
            pinned: false,
            unread: 2,
            messages: vec![
                SeedMessage {
                    role: ChatRole::User,
                    content: "u1".to_owned(),
                },
                SeedMessage {
                    role: ChatRole::Assistant,
                    content: "a1".to_owned(),
                },
            ],
        },
        ConversationSeed {
            id: "beta".to_owned(),
            title: "Beta".to_owned(),
            description: "Second thread".to_owned(),
            timestamp: "08:10".to_owned(),
            pinned: false,
            unread: 0,
            messages: vec![],
        },
    ]
}

struct Harness {
    session: Session,
    provider: ScriptedProvider,
    idle_rx: watch::Receiver<u32>,
}

fn harness() -> Harness {
    let provider = ScriptedProvider::default();
    let (idle_tx, idle_rx) = watch::channel(0u32);
    let session =
        SessionBuilder::with_completion_provider(provider.clone())
            .with_system_prompt("Answer briefly.")
            .with_conversations(seeds())
            .on_idle(move || {
                idle_tx.send_modify(|count| *count += 1);
            })
            .build();
    Harness {
        session,
        provider,
        idle_rx,
    }
}

async fn wait_for_idle(idle_rx: &mut watch::Receiver<u32>, target: u32) {
    timeout(
        Duration::from_millis(500),
        idle_rx.wait_for(|count| *count >= target),
    )
    .await
    .unwrap()
    .unwrap();
}

fn log_of(snapshot: &Snapshot, id: &str) -> Vec<(ChatRole, String)> {
    snapshot
        .conversations
        .iter()
        .find(|c| c.id() == id)
        .unwrap()
        .messages()
        .iter()
        .map(|m| (m.role(), m.content().to_owned()))
        .collect()
}

#[tokio::test]
async fn test_submit_round_trip() {
    let mut h = harness();
    h.provider
        .add_outcome(PresetOutcome::Reply("hi there".to_owned()));

    h.session.submit("hello");
    wait_for_idle(&mut h.idle_rx, 1).await;

    let snapshot = h.session.snapshot().await;
    assert_eq!(
        log_of(&snapshot, "alpha"),
        vec![
            (ChatRole::User, "u1".to_owned()),
            (ChatRole::Assistant, "a1".to_owned()),
            (ChatRole::User, "hello".to_owned()),
            (ChatRole::Assistant, "hi there".to_owned()),
        ]
    );
    assert!(!snapshot.typing);
    assert_eq!(h.provider.recorded_requests().len(), 1);
}

#[tokio::test]
async fn test_blank_submission_is_ignored() {
    let h = harness();
    h.session.submit("   \n");

    let snapshot = h.session.snapshot().await;
    assert_eq!(log_of(&snapshot, "alpha").len(), 2);
    assert!(!snapshot.typing);
    assert!(h.provider.recorded_requests().is_empty());
}

#[tokio::test]
async fn test_payload_is_system_prompt_plus_full_log() {
    let mut h = harness();
    h.provider
        .add_outcome(PresetOutcome::Reply("sure".to_owned()));

    h.session.submit("hello");
    wait_for_idle(&mut h.idle_rx, 1).await;

    let recorded = h.provider.recorded_requests();
    assert_eq!(recorded.len(), 1);
    assert_eq!(
        recorded[0].messages,
        vec![
            PromptMessage::System("Answer briefly.".to_owned()),
            PromptMessage::User("u1".to_owned()),
            PromptMessage::Assistant("a1".to_owned()),
            PromptMessage::User("hello".to_owned()),
        ]
    );
}

#[tokio::test]
async fn test_failure_is_surfaced_as_reply() {
    let mut h = harness();
    h.provider.add_outcome(PresetOutcome::transport_failure(
        "completion request failed (500): server error",
    ));

    h.session.submit("hello");
    wait_for_idle(&mut h.idle_rx, 1).await;

    let snapshot = h.session.snapshot().await;
    let log = log_of(&snapshot, "alpha");
    // Exactly one user message was appended, plus the error reply.
    assert_eq!(log.len(), 4);
    assert_eq!(log[2], (ChatRole::User, "hello".to_owned()));

    let (role, content) = &log[3];
    assert_eq!(*role, ChatRole::Assistant);
    assert!(content.starts_with(REPLY_ERROR_PREFIX));
    assert!(content.contains("server error"));
    assert!(!snapshot.typing);
}

#[tokio::test]
async fn test_superseding_submission_suppresses_the_first() {
    let mut h = harness();
    h.provider.add_outcome(PresetOutcome::Stall);
    h.provider
        .add_outcome(PresetOutcome::Reply("second reply".to_owned()));

    h.session.submit("x");
    h.session.select_conversation("beta");
    h.session.submit("y");
    wait_for_idle(&mut h.idle_rx, 1).await;

    let snapshot = h.session.snapshot().await;
    // The first conversation keeps its user message but never receives
    // a reply from the superseded request.
    assert_eq!(
        log_of(&snapshot, "alpha").last().unwrap(),
        &(ChatRole::User, "x".to_owned())
    );
    assert_eq!(
        log_of(&snapshot, "beta"),
        vec![
            (ChatRole::User, "y".to_owned()),
            (ChatRole::Assistant, "second reply".to_owned()),
        ]
    );
    assert_eq!(snapshot.active_id, "beta");
    assert!(!snapshot.typing);
}

#[tokio::test]
async fn test_superseded_settlement_leaves_typing_untouched() {
    let h = harness();
    h.provider.add_outcome(PresetOutcome::Stall);
    h.provider.add_outcome(PresetOutcome::Stall);

    h.session.submit("x");
    h.session.submit("y");

    // Give the first request's cancelled settlement time to come back.
    sleep(Duration::from_millis(50)).await;

    let snapshot = h.session.snapshot().await;
    // The second request is still in flight in the active conversation,
    // so disposing of the first one must not hide the indicator.
    assert!(snapshot.typing);
    let log = log_of(&snapshot, "alpha");
    assert_eq!(log.len(), 4);
    assert!(log.iter().skip(2).all(|(role, _)| *role == ChatRole::User));
    assert_eq!(*h.idle_rx.borrow(), 0);
}

#[tokio::test]
async fn test_background_reply_lands_in_original_conversation() {
    let mut h = harness();
    h.provider
        .add_outcome(PresetOutcome::Reply("done".to_owned()));
    h.provider.set_delay(Duration::from_millis(50));

    h.session.submit("x");
    h.session.select_conversation("beta");
    wait_for_idle(&mut h.idle_rx, 1).await;

    let snapshot = h.session.snapshot().await;
    assert_eq!(
        log_of(&snapshot, "alpha").last().unwrap(),
        &(ChatRole::Assistant, "done".to_owned())
    );
    assert!(log_of(&snapshot, "beta").is_empty());
    assert_eq!(snapshot.active_id, "beta");
    assert!(!snapshot.typing);
}

#[tokio::test]
async fn test_switching_clears_typing_immediately() {
    let h = harness();
    h.provider.add_outcome(PresetOutcome::Stall);

    h.session.submit("x");
    let snapshot = h.session.snapshot().await;
    assert!(snapshot.typing);

    h.session.select_conversation("beta");
    let snapshot = h.session.snapshot().await;
    assert!(!snapshot.typing);

    // Switching back does not resurrect the indicator either, even
    // though the request is still in flight.
    h.session.select_conversation("alpha");
    let snapshot = h.session.snapshot().await;
    assert!(!snapshot.typing);
    assert_eq!(*h.idle_rx.borrow(), 0);
}

#[tokio::test]
async fn test_unknown_selection_is_ignored() {
    let h = harness();
    h.provider.add_outcome(PresetOutcome::Stall);

    h.session.submit("x");
    h.session.select_conversation("gamma");

    let snapshot = h.session.snapshot().await;
    assert_eq!(snapshot.active_id, "alpha");
    // The indicator is still cleared: any context switch attempt hides
    // it.
    assert!(!snapshot.typing);
}

#[tokio::test]
async fn test_submission_resets_unread() {
    let mut h = harness();
    h.provider.add_outcome(PresetOutcome::Reply("ok".to_owned()));

    let snapshot = h.session.snapshot().await;
    assert_eq!(snapshot.conversations[0].unread(), 2);

    h.session.submit("hello");
    wait_for_idle(&mut h.idle_rx, 1).await;

    let snapshot = h.session.snapshot().await;
    assert_eq!(snapshot.conversations[0].unread(), 0);
}

#[tokio::test]
async fn test_observer_callbacks() {
    let provider = ScriptedProvider::default();
    provider.add_outcome(PresetOutcome::Reply("pong".to_owned()));

    let messages = Arc::new(Mutex::new(Vec::new()));
    let updates = Arc::new(Mutex::new(Vec::new()));
    let (idle_tx, mut idle_rx) = watch::channel(0u32);

    let session =
        SessionBuilder::with_completion_provider(provider)
            .with_conversations(seeds())
            .on_message({
                let messages = Arc::clone(&messages);
                move |conversation_id, message| {
                    messages.lock().unwrap().push((
                        conversation_id.to_owned(),
                        message.role(),
                        message.content().to_owned(),
                    ));
                }
            })
            .on_update({
                let updates = Arc::clone(&updates);
                move |snapshot| {
                    updates.lock().unwrap().push(snapshot.typing);
                }
            })
            .on_idle(move || {
                idle_tx.send_modify(|count| *count += 1);
            })
            .build();

    session.submit("ping");
    wait_for_idle(&mut idle_rx, 1).await;

    assert_eq!(
        *messages.lock().unwrap(),
        vec![
            ("alpha".to_owned(), ChatRole::User, "ping".to_owned()),
            ("alpha".to_owned(), ChatRole::Assistant, "pong".to_owned()),
        ]
    );
    let updates = updates.lock().unwrap();
    assert_eq!(updates.first(), Some(&true));
    assert_eq!(updates.last(), Some(&false));
}
