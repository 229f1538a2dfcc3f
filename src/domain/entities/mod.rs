//! # Domain Entities
//!
//! - **UserIdentity**: who holds a connection
//! - **EphemeralMessage / DurableMessage**: the two shapes of a chat message
//!
//! ## Collaborator Traits
//!
//! [`UserRepository`] and [`MessageStore`] are the only data access the
//! gateway performs. Both are implemented in the infrastructure layer.

mod message;
mod user;

pub use message::{
    DurableMessage, EphemeralMessage, MessageStore, PersistError, SenderSummary,
};
pub use user::{UserIdentity, UserRepository};

#[cfg(test)]
pub use message::MockMessageStore;
#[cfg(test)]
pub use user::MockUserRepository;
