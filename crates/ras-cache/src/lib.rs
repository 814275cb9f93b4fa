//! The in-memory tier of the three-tier trust engine.

mod entry;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

pub use entry::CacheEntry;

/// Thread-safe per-client cache. Structural mutations (insert/remove) go
/// through `DashMap`'s internal sharded locks; per-client state updates lock
/// only that client's `CacheEntry`.
#[derive(Default)]
pub struct TrustCache {
    entries: DashMap<i64, Arc<CacheEntry>>,
}

impl TrustCache {
    pub fn new() -> Self {
        TrustCache {
            entries: DashMap::new(),
        }
    }

    pub fn insert(&self, id: i64, reg_time: DateTime<Utc>, ik_cert_pem: impl Into<String>) -> Arc<CacheEntry> {
        let entry = Arc::new(CacheEntry::new(reg_time, ik_cert_pem));
        self.entries.insert(id, entry.clone());
        entry
    }

    pub fn get(&self, id: i64) -> Option<Arc<CacheEntry>> {
        self.entries.get(&id).map(|e| e.clone())
    }

    pub fn remove(&self, id: i64) -> Option<Arc<CacheEntry>> {
        self.entries.remove(&id).map(|(_, v)| v)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invokes `f` for every cached `(id, entry)` pair. Used by
    /// `get_all_nodes` and `update_all_nodes` in `ras-trustmgr`.
    pub fn for_each(&self, mut f: impl FnMut(i64, &Arc<CacheEntry>)) {
        for item in self.entries.iter() {
            f(*item.key(), item.value());
        }
    }
}
