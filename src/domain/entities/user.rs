//! User identity and its lookup trait.
//!
//! Accounts live in the REST service's `users` table; the gateway only ever
//! reads the three fields it attaches to a connection.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::UserId;
use crate::shared::error::AppError;

/// Identity attached to a connection at handshake time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// Read-only identity lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find the identity for a user id, `None` if the account does not exist.
    async fn find_identity(&self, id: &UserId) -> Result<Option<UserIdentity>, AppError>;
}
