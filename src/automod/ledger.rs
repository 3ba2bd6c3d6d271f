//! Strike ledger
//!
//! In-memory per-community, per-member strike counters. Entries are
//! created lazily on the first infraction and reset to zero after a
//! successful escalation. Counts live for the life of the process.

use crate::automod::gateway::{CommunityId, MemberId};
use dashmap::DashMap;
use std::sync::Arc;

/// Concurrent map of accumulated strikes keyed by (community, member)
///
/// The map's entry lock is the per-key critical section: an increment
/// and the count it returns are atomic with respect to any other
/// infraction for the same member.
#[derive(Clone, Debug, Default)]
pub struct StrikeLedger {
    counts: Arc<DashMap<(CommunityId, MemberId), u32>>,
}

impl StrikeLedger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: Arc::new(DashMap::new()),
        }
    }

    /// Atomically increment a member's strike count and return the new
    /// value
    pub fn increment(&self, community: CommunityId, member: MemberId) -> u32 {
        let mut entry = self.counts.entry((community, member)).or_insert(0);
        *entry = entry.saturating_add(1);
        *entry
    }

    /// Set a member's strike count back to zero. Used after a
    /// successful escalation.
    pub fn reset(&self, community: CommunityId, member: MemberId) {
        if let Some(mut entry) = self.counts.get_mut(&(community, member)) {
            *entry = 0;
        }
    }

    /// Remove a member's entry entirely. Out-of-band operator reset.
    pub fn clear(&self, community: CommunityId, member: MemberId) {
        self.counts.remove(&(community, member));
    }

    /// Current strike count for a member, 0 if absent
    #[must_use]
    pub fn get(&self, community: CommunityId, member: MemberId) -> u32 {
        self.counts
            .get(&(community, member))
            .map_or(0, |entry| *entry)
    }
}
