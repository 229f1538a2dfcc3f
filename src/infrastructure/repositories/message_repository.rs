//! Message Repository Implementation
//!
//! Durable message writes. Each row gets a snowflake id generated here,
//! independent of the ephemeral id members already received.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{DurableId, DurableMessage, MessageStore, PersistError};
use crate::shared::snowflake::SnowflakeGenerator;

pub struct PgMessageStore {
    pool: PgPool,
    snowflake: Arc<SnowflakeGenerator>,
}

impl PgMessageStore {
    pub fn new(pool: PgPool, snowflake: Arc<SnowflakeGenerator>) -> Self {
        Self { pool, snowflake }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn write_message(&self, message: &DurableMessage) -> Result<DurableId, PersistError> {
        let id = self.snowflake.generate();

        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, conversation_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(message.sender_id.as_str())
        .bind(message.conversation_id.as_str())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                PersistError::Rejected(format!(
                    "Unknown sender or conversation: {}",
                    db_err.message()
                ))
            }
            _ => PersistError::Database(e),
        })?;

        Ok(DurableId(id))
    }
}
