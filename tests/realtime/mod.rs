//! Gateway flow tests
//!
//! Connections are admitted straight into the gateway; frames go through
//! the same event router the socket loop uses.

mod messaging_tests;
mod presence_tests;
