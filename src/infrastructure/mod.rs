//! Infrastructure Layer
//!
//! - Database pool and repositories (PostgreSQL)
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod repositories;
