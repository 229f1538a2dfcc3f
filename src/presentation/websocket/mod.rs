//! WebSocket Gateway
//!
//! Presence tracking and event fan-out for connected users.
//!
//! ```text
//! handshake -> auth middleware -> Gateway::admit
//!   loop: frame -> EventRouter -> { MessageRelay | broadcast | presence }
//!   close -> Gateway::disconnect -> online-users to everyone else
//! ```

pub mod connection;
pub mod gateway;
pub mod handler;
pub mod messages;
pub mod presence;
pub mod registry;
pub mod relay;
pub mod router;
pub mod session;

pub use connection::{ConnectionHandle, ConnectionId, OutboundFrame};
pub use gateway::Gateway;
pub use handler::ws_handler;
pub use messages::{ClientEvent, PayloadError, ServerEvent};
pub use presence::PresenceTracker;
pub use registry::ConnectionRegistry;
pub use relay::MessageRelay;
pub use router::EventRouter;
pub use session::ConnectionContext;
