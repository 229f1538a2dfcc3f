//! Application Services
//!
//! ## Available Services
//!
//! - **AuthService**: handshake credential verification
//! - **PersistenceService**: durable message writes with retry

pub mod auth_service;
pub mod persistence_service;

pub use auth_service::{AuthError, Claims, CredentialVerifier, JwtCredentialVerifier};
pub use persistence_service::{PersistenceService, RetryPolicy};
