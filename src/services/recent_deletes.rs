//! Recently deleted links
//!
//! A resolve that read storage before a delete can still write its snapshot
//! into the cache after the delete has evicted it. Deleted link ids are kept
//! here for a grace period so the resolver can drop such snapshots.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::trace;
use uuid::Uuid;

/// How long a deleted id is remembered. Must outlast a storage read plus a
/// cache write.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(60);

pub struct RecentDeletes {
    grace: Duration,
    entries: DashMap<Uuid, Instant>,
}

impl Default for RecentDeletes {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}

impl RecentDeletes {
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            entries: DashMap::new(),
        }
    }

    /// Records a deleted link. Lapsed entries are dropped on the way.
    pub fn mark(&self, link_id: Uuid) {
        let now = Instant::now();
        self.entries
            .retain(|_, deleted_at| now.duration_since(*deleted_at) < self.grace);
        self.entries.insert(link_id, now);
        trace!("Link {} marked deleted", link_id);
    }

    pub fn contains(&self, link_id: &Uuid) -> bool {
        self.entries
            .get(link_id)
            .is_some_and(|deleted_at| deleted_at.elapsed() < self.grace)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
