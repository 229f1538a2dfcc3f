//! Presence broadcasts

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_disconnect_broadcasts_remaining_online_users() {
    let app = TestApp::new();
    let mut a = app.connect("a");
    let b = app.connect("b");
    let mut c = app.connect("c");

    assert!(app.disconnect(&b));

    for client in [&mut a, &mut c] {
        let frames = client.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "online-users");
        assert_eq!(frames[0].data, json!(["a", "c"]));
    }
    assert!(!app.state.gateway.registry().contains(b.user_id()));
}

#[tokio::test]
async fn test_reconnect_replaces_previous_connection() {
    let app = TestApp::new();
    let mut old = app.connect("a");
    let mut new = app.connect("a");
    let b = app.connect("b");

    app.send(
        &b,
        json!({"event": "typing-start", "data": {"conversationId": "c1", "members": ["a"]}}),
    );
    assert!(old.drain().is_empty());
    assert_eq!(new.events(), vec!["typing-start"]);

    // Closing the displaced socket leaves the replacement registered.
    assert!(!app.disconnect(&old));
    assert!(app.state.gateway.presence().is_online(new.user_id()));
    assert_eq!(app.state.gateway.connection_count(), 2);
}

#[tokio::test]
async fn test_leave_and_rejoin_conversation() {
    let app = TestApp::new();
    let mut a = app.connect("a");
    let mut b = app.connect("b");

    app.send(
        &a,
        json!({"event": "conversation-left", "data": {"userId": "a", "members": ["a", "b"]}}),
    );
    assert_eq!(b.drain()[0].data, json!(["b"]));
    assert_eq!(a.drain()[0].data, json!(["b"]));

    app.send(
        &a,
        json!({"event": "conversation-joined", "data": {"userId": "a", "members": ["a", "b"]}}),
    );
    let frames = b.drain();
    assert_eq!(frames[0].event, "online-users");
    assert_eq!(frames[0].data, json!(["a", "b"]));
}
