//! Connection Registry
//!
//! Maps a user id to its single live connection. A newer connection for the
//! same user replaces the older entry (last connection wins).

use std::collections::HashSet;

use dashmap::DashMap;

use super::connection::{ConnectionHandle, ConnectionId};
use crate::domain::UserId;

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<UserId, ConnectionHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `user_id` to `handle`, returning the handle it displaced.
    pub fn register(&self, user_id: UserId, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        self.connections.insert(user_id, handle)
    }

    /// Remove the mapping for `user_id`. No-op when absent.
    pub fn unregister(&self, user_id: &UserId) -> Option<ConnectionHandle> {
        self.connections.remove(user_id).map(|(_, handle)| handle)
    }

    /// Remove the mapping only if it still points at `connection_id`.
    ///
    /// A connection that was replaced by a newer login must not evict its
    /// successor when it finally closes.
    pub fn unregister_connection(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        self.connections
            .remove_if(user_id, |_, handle| handle.id() == connection_id)
            .is_some()
    }

    /// Live handles for the given users. Offline users are skipped and
    /// duplicate ids resolve once.
    pub fn resolve<'a, I>(&self, user_ids: I) -> Vec<ConnectionHandle>
    where
        I: IntoIterator<Item = &'a UserId>,
    {
        let mut seen = HashSet::new();
        user_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.connections.get(id).map(|entry| entry.value().clone()))
            .collect()
    }

    pub fn get(&self, user_id: &UserId) -> Option<ConnectionHandle> {
        self.connections.get(user_id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.connections.contains_key(user_id)
    }

    /// Every live handle.
    pub fn all(&self) -> Vec<ConnectionHandle> {
        self.connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
