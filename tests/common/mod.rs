//! Common Test Utilities
//!
//! In-process application state with fake collaborators: a static
//! credential table instead of JWT + users table, and a message store that
//! records writes on a channel.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tower::ServiceExt;

use chat_realtime::application::services::{AuthError, CredentialVerifier};
use chat_realtime::config::*;
use chat_realtime::domain::{
    DurableId, DurableMessage, MessageStore, PersistError, UserId, UserIdentity,
};
use chat_realtime::presentation::http::create_router;
use chat_realtime::presentation::websocket::{ConnectionContext, ConnectionHandle, OutboundFrame};
use chat_realtime::startup::AppState;

/// Resolves `token-<id>` credentials for a fixed set of users.
pub struct StaticVerifier {
    users: HashMap<String, UserIdentity>,
}

impl StaticVerifier {
    pub fn new(users: &[(&str, &str)]) -> Self {
        let users = users
            .iter()
            .map(|(id, name)| (format!("token-{id}"), UserIdentity::new(*id, *name)))
            .collect();
        Self { users }
    }
}

#[async_trait]
impl CredentialVerifier for StaticVerifier {
    async fn verify(&self, raw: &str) -> Result<UserIdentity, AuthError> {
        self.users.get(raw).cloned().ok_or(AuthError::InvalidToken)
    }
}

/// Message store that reports every write and can be told to time out.
pub struct RecordingStore {
    writes: UnboundedSender<DurableMessage>,
    failures_left: AtomicU32,
    next_id: AtomicU32,
}

impl RecordingStore {
    pub fn new(failures: u32) -> (Self, UnboundedReceiver<DurableMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Self {
            writes: tx,
            failures_left: AtomicU32::new(failures),
            next_id: AtomicU32::new(1),
        };
        (store, rx)
    }
}

#[async_trait]
impl MessageStore for RecordingStore {
    async fn write_message(&self, message: &DurableMessage) -> Result<DurableId, PersistError> {
        let _ = self.writes.send(message.clone());
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(PersistError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(DurableId(self.next_id.fetch_add(1, Ordering::SeqCst) as i64))
    }
}

/// Service token accepted by `/internal/*` in tests
pub const SERVICE_TOKEN: &str = "internal-service-token-for-integration-tests";

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "postgres://postgres@127.0.0.1:1/chat".into(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout: 1,
        },
        jwt: JwtSettings {
            secret: "integration-test-secret-with-enough-length".into(),
            cookie_name: "chat-token".into(),
        },
        snowflake: SnowflakeSettings {
            machine_id: 1,
            epoch: 1420070400000,
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        websocket: WebSocketSettings {
            max_message_size: 65536,
            max_frame_size: 16384,
        },
        persistence: PersistenceSettings {
            max_attempts: 2,
            initial_backoff_ms: 0,
        },
        internal: InternalSettings {
            emit_token: Some(SERVICE_TOKEN.into()),
        },
        environment: "test".into(),
    }
}

/// Test application: state plus the router built from it
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub writes: UnboundedReceiver<DurableMessage>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_failing_store(0)
    }

    /// Store fails its first `failures` writes.
    pub fn with_failing_store(failures: u32) -> Self {
        // Never connected unless a handler touches the database.
        let db = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://postgres@127.0.0.1:1/chat")
            .expect("lazy pool");

        let (store, writes) = RecordingStore::new(failures);
        let verifier = StaticVerifier::new(&[("a", "Alice"), ("b", "Bob"), ("c", "Carol")]);
        let state = AppState::new(db, Arc::new(store), Arc::new(verifier), test_settings());
        let router = create_router(state.clone());

        Self {
            state,
            router,
            writes,
        }
    }

    /// Admit `user` directly to the gateway, bypassing the socket.
    pub fn connect(&self, user: &str) -> Client {
        let identity = UserIdentity::new(user, user.to_uppercase());
        let (handle, rx) = ConnectionHandle::new();
        self.state.gateway.admit(&identity.id, handle.clone());
        Client {
            ctx: ConnectionContext::new(identity, handle),
            rx,
        }
    }

    pub fn disconnect(&self, client: &Client) -> bool {
        self.state
            .gateway
            .disconnect(&client.ctx.identity.id, client.ctx.connection_id())
    }

    /// Feed a raw text frame from `client` through the event router.
    pub fn send(&self, client: &Client, frame: serde_json::Value) {
        let _ = self.state.events.handle_text(&client.ctx, &frame.to_string());
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }
}

/// One admitted connection and the frames written to it
pub struct Client {
    pub ctx: ConnectionContext,
    pub rx: UnboundedReceiver<OutboundFrame>,
}

impl Client {
    pub fn user_id(&self) -> &UserId {
        &self.ctx.identity.id
    }

    /// Everything delivered so far.
    pub fn drain(&mut self) -> Vec<OutboundFrame> {
        std::iter::from_fn(|| self.rx.try_recv().ok()).collect()
    }

    pub fn events(&mut self) -> Vec<String> {
        self.drain().into_iter().map(|f| f.event).collect()
    }
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
