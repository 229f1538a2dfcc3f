//! Handshake authentication tests
//!
//! The upgrade itself needs a real socket; these only check that the
//! credential gate runs before it.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use test_case::test_case;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_handshake_without_credential_is_rejected() {
    let app = TestApp::new();

    let response = app.get("/ws").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], 10003);
    assert_eq!(app.state.gateway.connection_count(), 0);
}

#[test_case(header::COOKIE, "chat-token=bogus" ; "bad cookie")]
#[test_case(header::AUTHORIZATION, "Bearer bogus" ; "bad bearer")]
#[tokio::test]
async fn test_handshake_with_invalid_credential_is_rejected(name: header::HeaderName, value: &str) {
    let app = TestApp::new();

    let response = app
        .request(Request::builder().uri("/ws").header(name, value).body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.state.gateway.presence().is_empty());
}

#[test_case(header::COOKIE, "chat-token=token-a" ; "cookie")]
#[test_case(header::AUTHORIZATION, "Bearer token-a" ; "bearer")]
#[tokio::test]
async fn test_valid_credential_passes_the_gate(name: header::HeaderName, value: &str) {
    let app = TestApp::new();

    // Not an upgrade request, so the extractor refuses it after auth.
    let response = app
        .request(Request::builder().uri("/ws").header(name, value).body(Body::empty()).unwrap())
        .await;

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.status().is_client_error());
}
