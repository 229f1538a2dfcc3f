//! HTTP Layer
//!
//! Routes for the handshake, probes, metrics, and the internal emit hook.

pub mod handlers;
pub mod routes;

pub use routes::create_router;
