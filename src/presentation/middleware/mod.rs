//! Middleware
//!
//! Tower middleware for request processing.

pub mod auth;
pub mod cors;

pub use auth::{
    auth_middleware, extract_credential, internal_auth_middleware, AuthUser, INTERNAL_TOKEN_HEADER,
};
pub use cors::create_cors_layer;
