//! Message relay and typing indicators

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::TestApp;

const WAIT: Duration = Duration::from_secs(2);

fn new_message(content: &str) -> serde_json::Value {
    json!({
        "event": "new-message",
        "data": {"conversationId": "c1", "members": ["a", "b"], "content": content}
    })
}

#[tokio::test]
async fn test_message_reaches_members_and_is_persisted_once() {
    let mut app = TestApp::new();
    let mut a = app.connect("a");
    let mut b = app.connect("b");
    let mut c = app.connect("c");

    app.send(&a, new_message("hi"));

    for client in [&mut a, &mut b] {
        let frames = client.drain();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event, "new-message");
        assert_eq!(frames[0].data["message"]["content"], "hi");
        assert_eq!(frames[0].data["message"]["sender"]["id"], "a");
        assert_eq!(frames[0].data["message"]["conversationId"], "c1");
        assert_eq!(frames[1].event, "new-message-alert");
        assert_eq!(frames[1].data, json!({"conversationId": "c1"}));
    }
    assert!(c.drain().is_empty());

    let written = tokio::time::timeout(WAIT, app.writes.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(written.sender_id.as_str(), "a");
    assert_eq!(written.conversation_id.as_str(), "c1");
    assert_eq!(written.content, "hi");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(app.writes.try_recv().is_err());
}

#[tokio::test]
async fn test_message_is_persisted_after_sender_disconnects() {
    let mut app = TestApp::new();
    let a = app.connect("a");
    let _b = app.connect("b");

    app.send(&a, new_message("bye"));
    app.disconnect(&a);

    let written = tokio::time::timeout(WAIT, app.writes.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(written.content, "bye");
}

#[tokio::test]
async fn test_persist_failure_is_reported_to_sender() {
    let mut app = TestApp::with_failing_store(2);
    let mut a = app.connect("a");
    let mut b = app.connect("b");

    app.send(&a, new_message("lost"));

    // Both attempts are made before giving up.
    for _ in 0..2 {
        tokio::time::timeout(WAIT, app.writes.recv()).await.unwrap().unwrap();
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    let frames = a.drain();
    let events: Vec<_> = frames.iter().map(|f| f.event.as_str()).collect();
    assert_eq!(events, vec!["new-message", "new-message-alert", "message-persist-failed"]);
    assert_eq!(frames[2].data["conversationId"], "c1");
    assert_eq!(frames[2].data["messageId"], frames[0].data["message"]["id"]);

    assert_eq!(b.events(), vec!["new-message", "new-message-alert"]);
}

#[tokio::test]
async fn test_retry_recovers_from_transient_failure() {
    let mut app = TestApp::with_failing_store(1);
    let mut a = app.connect("a");

    app.send(
        &a,
        json!({"event": "new-message", "data": {"conversationId": "c1", "members": ["a"], "content": "again"}}),
    );

    for _ in 0..2 {
        tokio::time::timeout(WAIT, app.writes.recv()).await.unwrap().unwrap();
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(a.events(), vec!["new-message", "new-message-alert"]);
}

#[tokio::test]
async fn test_typing_reaches_other_members_only() {
    let app = TestApp::new();
    let mut a = app.connect("a");
    let mut b = app.connect("b");
    let mut c = app.connect("c");

    app.send(
        &a,
        json!({"event": "typing-start", "data": {"conversationId": "c1", "members": ["a", "b"]}}),
    );
    app.send(
        &a,
        json!({"event": "typing-stop", "data": {"conversationId": "c1", "members": ["a", "b"]}}),
    );

    assert_eq!(b.events(), vec!["typing-start", "typing-stop"]);
    assert!(a.drain().is_empty());
    assert!(c.drain().is_empty());
}

#[tokio::test]
async fn test_invalid_frames_are_answered_with_errors() {
    let app = TestApp::new();
    let mut a = app.connect("a");
    let mut b = app.connect("b");

    app.send(&a, json!({"event": "new-message", "data": {"conversationId": "c1", "members": ["b"], "content": ""}}));
    app.send(&a, json!({"event": "self-destruct", "data": {}}));

    let codes: Vec<_> = a
        .drain()
        .into_iter()
        .map(|f| {
            assert_eq!(f.event, "error");
            f.data["code"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(codes, vec!["invalid-payload", "unknown-event"]);
    assert!(b.drain().is_empty());
}
