//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::application::services::{
    CredentialVerifier, JwtCredentialVerifier, PersistenceService, RetryPolicy,
};
use crate::config::Settings;
use crate::domain::MessageStore;
use crate::infrastructure::database;
use crate::infrastructure::repositories::{PgMessageStore, PgUserRepository};
use crate::presentation::http::routes;
use crate::presentation::http::handlers::health;
use crate::presentation::middleware::cors;
use crate::presentation::websocket::{EventRouter, Gateway, MessageRelay};
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub gateway: Arc<Gateway>,
    pub events: Arc<EventRouter>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the realtime core around the given collaborators.
    pub fn new(
        db: PgPool,
        store: Arc<dyn MessageStore>,
        verifier: Arc<dyn CredentialVerifier>,
        settings: Settings,
    ) -> Self {
        let gateway = Arc::new(Gateway::new());
        let persistence =
            PersistenceService::new(store, RetryPolicy::from(&settings.persistence));
        let relay = MessageRelay::new(Arc::clone(&gateway), persistence);
        let events = Arc::new(EventRouter::new(Arc::clone(&gateway), relay));

        Self {
            db,
            gateway,
            events,
            verifier,
            settings: Arc::new(settings),
        }
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id as u64,
            0u64,
            settings.snowflake.epoch,
        ));

        let store: Arc<dyn MessageStore> = Arc::new(PgMessageStore::new(db.clone(), snowflake));
        let users = Arc::new(PgUserRepository::new(db.clone()));
        let verifier: Arc<dyn CredentialVerifier> =
            Arc::new(JwtCredentialVerifier::new(&settings.jwt, users));

        let cors_layer = cors::create_cors_layer(&settings.cors);
        let addr = settings.server_addr();
        let state = AppState::new(db, store, verifier, settings);

        let router = routes::create_router(state)
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer);

        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until ctrl-c
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
