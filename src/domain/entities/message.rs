//! Message representations and the durable store trait.
//!
//! A chat message exists in two shapes. [`EphemeralMessage`] is what
//! connected members see immediately; it carries a generated UUID that is
//! never reused as a storage key. [`DurableMessage`] is the write request
//! handed to the store, which assigns its own [`DurableId`].

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{ConversationId, DurableId, UserId, UserIdentity};

/// Sender as shown to recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenderSummary {
    pub id: UserId,
    pub name: String,
}

/// Client-facing message, broadcast before it is durable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EphemeralMessage {
    pub id: Uuid,
    pub content: String,
    pub sender: SenderSummary,
    pub conversation_id: ConversationId,
    pub created_at: String,
}

impl EphemeralMessage {
    pub fn new(sender: &UserIdentity, conversation_id: ConversationId, content: String) -> Self {
        Self::at(sender, conversation_id, content, Utc::now())
    }

    fn at(
        sender: &UserIdentity,
        conversation_id: ConversationId,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            sender: SenderSummary {
                id: sender.id.clone(),
                name: sender.name.clone(),
            },
            conversation_id,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Write request for the durable store.
#[derive(Debug, Clone, PartialEq)]
pub struct DurableMessage {
    pub sender_id: UserId,
    pub conversation_id: ConversationId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl DurableMessage {
    pub fn new(sender_id: UserId, conversation_id: ConversationId, content: String) -> Self {
        Self {
            sender_id,
            conversation_id,
            content,
            created_at: Utc::now(),
        }
    }
}

/// Durable write failures.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Write rejected: {0}")]
    Rejected(String),
}

impl PersistError {
    /// Whether trying the same write again can succeed.
    ///
    /// Connection and pool failures are transient. A statement the server
    /// refused, or a write the store rejected, fails the same way every time.
    pub fn is_transient(&self) -> bool {
        match self {
            PersistError::Database(sqlx::Error::Database(_)) => false,
            PersistError::Database(sqlx::Error::PoolClosed) => false,
            PersistError::Database(_) => true,
            PersistError::Rejected(_) => false,
        }
    }
}

/// Durable message store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist one message and return the id the store assigned to it.
    async fn write_message(&self, message: &DurableMessage) -> Result<DurableId, PersistError>;
}
