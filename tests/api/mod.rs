//! HTTP API Tests

mod emit_tests;
mod handshake_tests;
mod health_tests;
