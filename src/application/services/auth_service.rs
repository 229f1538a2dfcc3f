//! Authentication Service
//!
//! Verifies the handshake credential. Tokens are issued by the login
//! service; this side only decodes them and resolves the identity.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::domain::{UserId, UserIdentity, UserRepository};

/// Credential verification seam used by the authentication gate.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Resolve a raw credential to the identity it was issued for.
    async fn verify(&self, raw: &str) -> Result<UserIdentity, AuthError>;
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credential")]
    MissingCredential,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unknown user")]
    UnknownUser,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Verifies HMAC-signed JWTs and loads the identity they name.
pub struct JwtCredentialVerifier<R: UserRepository> {
    users: Arc<R>,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl<R: UserRepository> JwtCredentialVerifier<R> {
    pub fn new(settings: &JwtSettings, users: Arc<R>) -> Self {
        Self {
            users,
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }
}

#[async_trait]
impl<R: UserRepository> CredentialVerifier for JwtCredentialVerifier<R> {
    async fn verify(&self, raw: &str) -> Result<UserIdentity, AuthError> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let claims = self.decode_claims(token)?;
        let subject = claims.sub.trim();
        if subject.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        self.users
            .find_identity(&UserId::from(subject))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::UnknownUser)
    }
}
