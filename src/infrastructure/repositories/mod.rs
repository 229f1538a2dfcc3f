//! Repository Implementations
//!
//! PostgreSQL implementations of the domain's storage traits.

pub mod message_repository;
pub mod user_repository;

pub use message_repository::PgMessageStore;
pub use user_repository::PgUserRepository;
