//! # Application Layer
//!
//! Services that coordinate domain collaborators on behalf of the gateway.

pub mod services;
