//! User Repository Implementation
//!
//! Read-only lookup of the identity a credential names. Accounts are owned
//! by the login service; this side never writes them. `users.id` is a text
//! key, the same string the token's `sub` carries, so the lookup hits the
//! primary key directly.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{UserId, UserIdentity, UserRepository};
use crate::shared::error::AppError;

/// Database row for the identity columns of the users table
#[derive(Debug, sqlx::FromRow)]
struct IdentityRow {
    id: String,
    name: String,
    avatar_url: Option<String>,
}

impl IdentityRow {
    fn into_identity(self) -> UserIdentity {
        UserIdentity {
            id: UserId::new(self.id),
            name: self.name,
            avatar: self.avatar_url,
        }
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_identity(&self, id: &UserId) -> Result<Option<UserIdentity>, AppError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id,
                   COALESCE(display_name, username) AS name,
                   avatar_url
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(IdentityRow::into_identity))
    }
}
