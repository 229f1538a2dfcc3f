//! # Chat Realtime
//!
//! Realtime layer of a chat application:
//! - Authenticated WebSocket handshake (session cookie or bearer token)
//! - Presence tracking with `online-users` snapshots
//! - Fan-out of messages, alerts, and typing indicators to conversation members
//! - Detached durable writes of relayed messages to PostgreSQL
//!
//! ## Module Structure
//!
//! ```text
//! chat_realtime/
//! +-- config/         Configuration management
//! +-- domain/         Identities, messages, storage traits
//! +-- application/    Credential verification, persistence with retry
//! +-- infrastructure/ PostgreSQL repositories, metrics
//! +-- presentation/   HTTP routes, middleware, WebSocket gateway
//! +-- shared/         Errors, snowflake IDs, validation helpers
//! ```

// Configuration module
pub mod config;

// Domain layer
pub mod domain;

// Application layer
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
