//! # Domain Layer
//!
//! Identities, message shapes and the collaborator traits the gateway
//! depends on. No transport or storage code lives here.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
