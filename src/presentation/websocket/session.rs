//! Per-connection context

use std::time::{Duration, Instant};

use super::connection::{ConnectionHandle, ConnectionId};
use crate::domain::UserIdentity;

/// Identity and write handle of an admitted connection.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub identity: UserIdentity,
    pub handle: ConnectionHandle,
    pub connected_at: Instant,
}

impl ConnectionContext {
    pub fn new(identity: UserIdentity, handle: ConnectionHandle) -> Self {
        Self {
            identity,
            handle,
            connected_at: Instant::now(),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.handle.id()
    }

    pub fn uptime(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
