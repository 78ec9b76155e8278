//! Connection registry — maps users to their live connection(s).
//!
//! Two tables are kept:
//!
//! - `by_user`: which connection(s) targeted events for a user go to. Under
//!   [`ConnectionPolicy::LastWriterWins`] this holds at most one entry per
//!   user and a new registration overwrites the old one.
//! - `handles`: every live connection, registered or superseded, used for
//!   frame delivery and the disconnect presence broadcast.
//!
//! Every operation is a single shard-locked `DashMap` operation, so
//! concurrent handlers cannot lose each other's updates.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use chathub_core::config::ConnectionPolicy;
use chathub_core::types::id::{ConnectionId, UserId};

use super::handle::ConnectionHandle;

/// Thread-safe registry of live connections.
#[derive(Debug)]
pub struct ConnectionRegistry {
    /// Registration policy.
    policy: ConnectionPolicy,
    /// User ID → registered connection IDs (in registration order).
    by_user: DashMap<UserId, Vec<ConnectionId>>,
    /// Connection ID → handle for every live connection.
    handles: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new(policy: ConnectionPolicy) -> Self {
        Self {
            policy,
            by_user: DashMap::new(),
            handles: DashMap::new(),
        }
    }

    /// The registration policy in effect.
    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    /// Registers `connection_id` as a target for `user_id`.
    ///
    /// Under last-writer-wins the previous mapping is overwritten
    /// unconditionally and the superseded connection ID is returned.
    pub fn register(&self, user_id: UserId, connection_id: ConnectionId) -> Option<ConnectionId> {
        match self.policy {
            ConnectionPolicy::LastWriterWins => self
                .by_user
                .insert(user_id, vec![connection_id])
                .and_then(|previous| previous.into_iter().find(|c| *c != connection_id)),
            ConnectionPolicy::MultiDevice => {
                let mut conns = self.by_user.entry(user_id).or_default();
                if !conns.contains(&connection_id) {
                    conns.push(connection_id);
                }
                None
            }
        }
    }

    /// Removes every mapping for `user_id`. No-op if absent.
    pub fn unregister(&self, user_id: UserId) -> bool {
        self.by_user.remove(&user_id).is_some()
    }

    /// Removes `connection_id` from `user_id`'s mapping only if it is still
    /// registered there. A superseded connection closing leaves the newer
    /// registration intact.
    pub fn unregister_connection(&self, user_id: UserId, connection_id: ConnectionId) -> bool {
        let removed = match self.by_user.get_mut(&user_id) {
            Some(mut conns) => {
                let before = conns.len();
                conns.retain(|c| *c != connection_id);
                conns.len() < before
            }
            None => false,
        };

        if removed {
            self.by_user.remove_if(&user_id, |_, conns| conns.is_empty());
        }
        removed
    }

    /// Resolves users to their registered connection IDs.
    ///
    /// Users without a live connection are skipped. Duplicate users in the
    /// input do not produce duplicate connections.
    pub fn resolve(&self, user_ids: &[UserId]) -> Vec<ConnectionId> {
        let mut seen_users = HashSet::with_capacity(user_ids.len());
        let mut resolved = Vec::with_capacity(user_ids.len());

        for user_id in user_ids {
            if !seen_users.insert(*user_id) {
                continue;
            }
            if let Some(conns) = self.by_user.get(user_id) {
                resolved.extend(conns.iter().copied());
            }
        }

        resolved
    }

    /// Checks whether `user_id` has any registered connection.
    pub fn is_registered(&self, user_id: UserId) -> bool {
        self.by_user.contains_key(&user_id)
    }

    /// Number of users with a registered connection.
    pub fn registered_user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Adds a live connection handle.
    pub fn attach(&self, handle: Arc<ConnectionHandle>) {
        self.handles.insert(handle.id, handle);
    }

    /// Removes a live connection handle. Returns it only on the first call.
    pub fn detach(&self, connection_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.handles.remove(&connection_id).map(|(_, handle)| handle)
    }

    /// Gets a live connection handle.
    pub fn handle(&self, connection_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.handles.get(&connection_id).map(|entry| entry.value().clone())
    }

    /// Returns all live connection handles.
    pub fn all_handles(&self) -> Vec<Arc<ConnectionHandle>> {
        self.handles.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.handles.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(ConnectionPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use chathub_core::types::principal::Principal;

    use super::*;

    #[test]
    fn test_last_writer_wins() {
        let registry = ConnectionRegistry::new(ConnectionPolicy::LastWriterWins);
        let user = UserId::new();
        let c1 = ConnectionId::new();
        let c2 = ConnectionId::new();

        assert_eq!(registry.register(user, c1), None);
        assert_eq!(registry.register(user, c2), Some(c1));
        assert_eq!(registry.resolve(&[user]), vec![c2]);
    }

    #[test]
    fn test_reregistering_same_connection_reports_nothing_superseded() {
        let registry = ConnectionRegistry::new(ConnectionPolicy::LastWriterWins);
        let user = UserId::new();
        let c1 = ConnectionId::new();

        registry.register(user, c1);
        assert_eq!(registry.register(user, c1), None);
        assert_eq!(registry.resolve(&[user]), vec![c1]);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = ConnectionRegistry::default();
        let user = UserId::new();
        registry.register(user, ConnectionId::new());

        assert!(registry.unregister(user));
        assert!(!registry.unregister(user));
        assert!(registry.resolve(&[user]).is_empty());
    }

    #[test]
    fn test_stale_connection_does_not_evict_newer_one() {
        let registry = ConnectionRegistry::new(ConnectionPolicy::LastWriterWins);
        let user = UserId::new();
        let c1 = ConnectionId::new();
        let c2 = ConnectionId::new();

        registry.register(user, c1);
        registry.register(user, c2);

        assert!(!registry.unregister_connection(user, c1));
        assert_eq!(registry.resolve(&[user]), vec![c2]);

        assert!(registry.unregister_connection(user, c2));
        assert!(!registry.is_registered(user));
    }

    #[test]
    fn test_resolve_skips_unknown_and_duplicate_users() {
        let registry = ConnectionRegistry::default();
        let alice = UserId::new();
        let bob = UserId::new();
        let carol = UserId::new();
        let ca = ConnectionId::new();
        let cb = ConnectionId::new();
        registry.register(alice, ca);
        registry.register(bob, cb);

        let resolved = registry.resolve(&[alice, carol, bob, alice]);
        assert_eq!(resolved, vec![ca, cb]);
        assert!(registry.resolve(&[carol]).is_empty());
        assert!(registry.resolve(&[]).is_empty());
    }

    #[test]
    fn test_multi_device_resolves_every_connection() {
        let registry = ConnectionRegistry::new(ConnectionPolicy::MultiDevice);
        let user = UserId::new();
        let phone = ConnectionId::new();
        let laptop = ConnectionId::new();

        assert_eq!(registry.register(user, phone), None);
        assert_eq!(registry.register(user, laptop), None);
        registry.register(user, laptop);
        assert_eq!(registry.resolve(&[user]), vec![phone, laptop]);

        assert!(registry.unregister_connection(user, phone));
        assert_eq!(registry.resolve(&[user]), vec![laptop]);
        assert!(registry.is_registered(user));

        assert!(registry.unregister_connection(user, laptop));
        assert!(!registry.is_registered(user));
        assert_eq!(registry.registered_user_count(), 0);
    }

    #[test]
    fn test_detach_returns_handle_once() {
        let registry = ConnectionRegistry::default();
        let (tx, _rx) = mpsc::channel(1);
        let handle = Arc::new(ConnectionHandle::new(
            Principal::new(UserId::new(), "Alice"),
            tx,
        ));
        let id = handle.id;

        registry.attach(handle);
        assert_eq!(registry.connection_count(), 1);
        assert!(registry.handle(id).is_some());

        assert!(registry.detach(id).is_some());
        assert!(registry.detach(id).is_none());
        assert_eq!(registry.connection_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_are_not_lost() {
        let registry = Arc::new(ConnectionRegistry::default());
        let users: Vec<UserId> = (0..64).map(|_| UserId::new()).collect();

        let mut tasks = Vec::new();
        for user in users.clone() {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                registry.register(user, ConnectionId::new());
            }));
        }
        for task in tasks {
            task.await.expect("task");
        }

        assert_eq!(registry.registered_user_count(), users.len());
        assert_eq!(registry.resolve(&users).len(), users.len());
    }
}
