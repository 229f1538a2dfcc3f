//! Shared Utilities
//!
//! HTTP error type, durable id generation, validation helpers.

pub mod error;
pub mod snowflake;
pub mod validation;
