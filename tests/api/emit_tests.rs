//! Internal emit endpoint tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

use crate::common::{body_json, TestApp, SERVICE_TOKEN};

fn emit_request(extra: Option<(&str, String)>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/internal/emit")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some((name, value)) = extra {
        builder = builder.header(name, value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn service() -> Option<(&'static str, String)> {
    Some(("x-internal-token", SERVICE_TOKEN.to_string()))
}

#[tokio::test]
async fn test_emit_delivers_to_online_users_only() {
    let app = TestApp::new();
    let mut a = app.connect("a");
    let mut c = app.connect("c");

    let body = json!({"event": "friend-request", "users": ["a", "b"], "data": {"from": "z"}});
    let response = app.request(emit_request(service(), body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"delivered": 1}));

    let frames = a.drain();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].event, "friend-request");
    assert_eq!(frames[0].data, json!({"from": "z"}));
    assert!(c.drain().is_empty());
}

#[test_case(None ; "no credential")]
#[test_case(Some(("authorization", "Bearer token-c".to_string())) ; "user bearer token")]
#[test_case(Some(("cookie", "chat-token=token-c".to_string())) ; "user session cookie")]
#[test_case(Some(("x-internal-token", "token-c".to_string())) ; "user token as service token")]
#[tokio::test]
async fn test_emit_rejects_anything_but_the_service_token(credential: Option<(&str, String)>) {
    let app = TestApp::new();
    let mut a = app.connect("a");

    let body = json!({"event": "friend-request", "users": ["a"]});
    let response = app.request(emit_request(credential, body)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(a.drain().is_empty());
}

#[test_case("new-message")]
#[test_case("online-users")]
#[test_case("message-persist-failed")]
#[tokio::test]
async fn test_emit_refuses_gateway_event_names(event: &str) {
    let app = TestApp::new();
    let mut a = app.connect("a");

    let body = json!({"event": event, "users": ["a"], "data": {"sender": {"id": "b"}}});
    let response = app.request(emit_request(service(), body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(a.drain().is_empty());
}

#[tokio::test]
async fn test_emit_rejects_empty_recipient_list() {
    let app = TestApp::new();

    let body = json!({"event": "x", "users": []});
    let response = app.request(emit_request(service(), body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "users: must name at least one user"
    );
}
