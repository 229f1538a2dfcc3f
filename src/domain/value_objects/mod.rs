//! # Value Objects
//!
//! Immutable identifier types shared by entities and events.

mod ids;

pub use ids::{ConversationId, DurableId, UserId};
