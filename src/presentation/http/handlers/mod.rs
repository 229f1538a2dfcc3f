//! HTTP Handlers

pub mod emit;
pub mod health;
