//! Presence Tracker
//!
//! The set of user ids currently considered online.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::domain::UserId;

#[derive(Default)]
pub struct PresenceTracker {
    online: RwLock<HashSet<UserId>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the user was not online before.
    pub fn mark_online(&self, user_id: &UserId) -> bool {
        self.online.write().insert(user_id.clone())
    }

    /// Returns `true` if the user was online before.
    pub fn mark_offline(&self, user_id: &UserId) -> bool {
        self.online.write().remove(user_id)
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.online.read().contains(user_id)
    }

    /// Full online set, sorted so repeated broadcasts are byte-identical.
    pub fn snapshot(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.online.read().iter().cloned().collect();
        users.sort();
        users
    }

    pub fn len(&self) -> usize {
        self.online.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.online.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snapshot_after_transitions() {
        let presence = PresenceTracker::new();
        let a = UserId::from("a");
        let b = UserId::from("b");

        presence.mark_online(&a);
        presence.mark_online(&b);
        presence.mark_offline(&a);

        assert_eq!(presence.snapshot(), vec![b]);
    }

    #[test]
    fn test_transitions_report_change() {
        let presence = PresenceTracker::new();
        let a = UserId::from("a");

        assert!(presence.mark_online(&a));
        assert!(!presence.mark_online(&a));
        assert!(presence.is_online(&a));
        assert!(presence.mark_offline(&a));
        assert!(!presence.mark_offline(&a));
        assert!(presence.is_empty());
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let presence = PresenceTracker::new();
        for id in ["carol", "alice", "bob"] {
            presence.mark_online(&UserId::from(id));
        }
        let names: Vec<_> = presence
            .snapshot()
            .iter()
            .map(|id| id.as_str().to_string())
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert_eq!(presence.len(), 3);
    }
}
