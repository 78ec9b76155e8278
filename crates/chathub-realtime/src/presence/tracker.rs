//! Presence tracker — the set of users currently considered online.
//!
//! Presence is driven by explicit chat join/leave signals and by
//! disconnects, not by connection state alone. Snapshots list users in the
//! order they first came online.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use chathub_core::types::id::UserId;

/// Per-user presence record.
#[derive(Debug, Clone, Copy)]
struct PresenceEntry {
    /// Insertion sequence number, used to order snapshots
    seq: u64,
    /// When the user came online
    since: DateTime<Utc>,
}

/// An online user as reported by the presence API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUser {
    /// User ID
    pub user_id: UserId,
    /// When the user came online
    pub since: DateTime<Utc>,
}

/// Tracks which users are online.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    /// User ID → presence record
    online: DashMap<UserId, PresenceEntry>,
    /// Monotonic insertion counter
    next_seq: AtomicU64,
}

impl PresenceTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user as online.
    ///
    /// Returns `true` if the user was not online before. Marking an online
    /// user again keeps their original position.
    pub fn mark_online(&self, user_id: UserId) -> bool {
        let mut inserted = false;
        self.online.entry(user_id).or_insert_with(|| {
            inserted = true;
            PresenceEntry {
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                since: Utc::now(),
            }
        });
        inserted
    }

    /// Mark a user as offline. Returns `true` if they were online.
    pub fn mark_offline(&self, user_id: UserId) -> bool {
        self.online.remove(&user_id).is_some()
    }

    /// Check whether a user is online
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.online.contains_key(&user_id)
    }

    /// Number of online users
    pub fn online_count(&self) -> usize {
        self.online.len()
    }

    /// Online users in first-online order
    pub fn snapshot(&self) -> Vec<UserId> {
        self.ordered().into_iter().map(|(user_id, _)| user_id).collect()
    }

    /// Online users with the time they came online, in first-online order
    pub fn snapshot_detailed(&self) -> Vec<OnlineUser> {
        self.ordered()
            .into_iter()
            .map(|(user_id, entry)| OnlineUser {
                user_id,
                since: entry.since,
            })
            .collect()
    }

    fn ordered(&self) -> Vec<(UserId, PresenceEntry)> {
        let mut entries: Vec<(UserId, PresenceEntry)> = self
            .online
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        entries.sort_by_key(|(_, entry)| entry.seq);
        entries
    }
}
