//! WebSocket Gateway
//!
//! Owns the connection registry and the presence tracker, and fans events
//! out to whichever members are currently connected. Delivery is best
//! effort: an offline member is skipped, nothing is queued or retried.
//!
//! Every change that touches presence (connect, disconnect, join, leave)
//! runs under the gateway's transition lock, so a registry update and the
//! presence update that goes with it are never interleaved with another
//! user's transition. Lock order: transition lock, then registry or
//! presence. Frames are sent after the lock is released.

use parking_lot::Mutex;

use super::connection::{ConnectionHandle, ConnectionId, OutboundFrame};
use super::messages::ServerEvent;
use super::presence::PresenceTracker;
use super::registry::ConnectionRegistry;
use crate::domain::UserId;
use crate::infrastructure::metrics;

#[derive(Default)]
pub struct Gateway {
    registry: ConnectionRegistry,
    presence: PresenceTracker,
    transitions: Mutex<()>,
}

impl Gateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Register an authenticated connection and mark its user online.
    pub fn admit(&self, user_id: &UserId, handle: ConnectionHandle) {
        let connection_id = handle.id();
        let previous = {
            let _guard = self.transitions.lock();
            let previous = self.registry.register(user_id.clone(), handle);
            self.presence.mark_online(user_id);
            self.record_gauges();
            previous
        };

        if let Some(previous) = previous {
            tracing::info!(
                user_id = %user_id,
                replaced = %previous.id(),
                connection_id = %connection_id,
                "Connection replaced by newer login"
            );
        }
        tracing::info!(user_id = %user_id, connection_id = %connection_id, "Connection registered");
    }

    /// Cleanup for a closed connection.
    ///
    /// When the connection was still the user's registered one, the user goes
    /// offline and every remaining connection receives the new online set.
    /// A connection already replaced by a newer login changes nothing.
    pub fn disconnect(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        let snapshot = {
            let _guard = self.transitions.lock();
            if !self.registry.unregister_connection(user_id, connection_id) {
                None
            } else {
                self.presence.mark_offline(user_id);
                self.record_gauges();
                Some(self.presence.snapshot())
            }
        };

        let Some(snapshot) = snapshot else {
            tracing::debug!(
                user_id = %user_id,
                connection_id = %connection_id,
                "Replaced connection closed"
            );
            return false;
        };

        let reached = self.broadcast_all_except(&ServerEvent::OnlineUsers(snapshot), connection_id);
        tracing::info!(
            user_id = %user_id,
            connection_id = %connection_id,
            notified = reached,
            "Connection unregistered"
        );
        true
    }

    /// Mark a user online for a conversation and push the online set to its members.
    ///
    /// Only users with a live connection can be marked online.
    pub fn join(&self, user_id: &UserId, members: &[UserId]) -> usize {
        let snapshot = {
            let _guard = self.transitions.lock();
            if self.registry.contains(user_id) {
                self.presence.mark_online(user_id);
                self.record_gauges();
            }
            self.presence.snapshot()
        };
        self.broadcast(members, &ServerEvent::OnlineUsers(snapshot))
    }

    /// Mark a user offline for a conversation and push the online set to its members.
    pub fn leave(&self, user_id: &UserId, members: &[UserId]) -> usize {
        let snapshot = {
            let _guard = self.transitions.lock();
            self.presence.mark_offline(user_id);
            self.record_gauges();
            self.presence.snapshot()
        };
        self.broadcast(members, &ServerEvent::OnlineUsers(snapshot))
    }

    fn record_gauges(&self) {
        metrics::set_websocket_connections(self.registry.len());
        metrics::set_online_users(self.presence.len());
    }

    /// Emit to every connected member, the sender included.
    pub fn broadcast(&self, members: &[UserId], event: &ServerEvent) -> usize {
        let targets = self.registry.resolve(members);
        deliver(&targets, event.to_frame(), None)
    }

    /// Emit to every connected member except the originating connection.
    pub fn broadcast_except(
        &self,
        members: &[UserId],
        event: &ServerEvent,
        origin: ConnectionId,
    ) -> usize {
        let targets = self.registry.resolve(members);
        deliver(&targets, event.to_frame(), Some(origin))
    }

    /// Emit to every live connection but `origin`.
    pub fn broadcast_all_except(&self, event: &ServerEvent, origin: ConnectionId) -> usize {
        deliver(&self.registry.all(), event.to_frame(), Some(origin))
    }

    /// Push an already-built frame to the listed users.
    pub fn emit(&self, users: &[UserId], frame: OutboundFrame) -> usize {
        let targets = self.registry.resolve(users);
        deliver(&targets, frame, None)
    }

    /// Send to one user's live connection, if any.
    pub fn send_to_user(&self, user_id: &UserId, event: &ServerEvent) -> bool {
        match self.registry.get(user_id) {
            Some(handle) => deliver(&[handle], event.to_frame(), None) == 1,
            None => false,
        }
    }
}

fn deliver(targets: &[ConnectionHandle], frame: OutboundFrame, skip: Option<ConnectionId>) -> usize {
    let mut delivered = 0;
    for handle in targets {
        if Some(handle.id()) == skip {
            continue;
        }
        if handle.send(frame.clone()) {
            delivered += 1;
        } else {
            tracing::debug!(connection_id = %handle.id(), event = %frame.event, "Writer gone, frame dropped");
        }
    }
    metrics::record_event_emitted(&frame.event, delivered);
    delivered
}
