//! Database Module
//!
//! PostgreSQL pool shared by the identity lookup, the message store and the
//! readiness probe.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DatabaseSettings;

pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout))
        .connect(&settings.url)
        .await?;

    tracing::debug!(
        max_connections = settings.max_connections,
        min_connections = settings.min_connections,
        "PostgreSQL pool ready"
    );
    Ok(pool)
}
