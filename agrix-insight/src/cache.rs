//! Snapshot cache owned by the fetch orchestrator
//!
//! Replaces ad hoc "already fetched" flags with one explicit entity. Entries
//! are keyed by record kind; filters are applied client-side to a cached
//! snapshot, so the snapshot itself does not depend on filter state.
//!
//! Eviction:
//! - selecting a kind evicts every entry of another kind
//! - entries older than `max_age` are stale and dropped on lookup
//! - [`SnapshotCache::invalidate`] drops everything

use crate::model::RecordKind;
use crate::snapshot::Snapshot;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
pub struct SnapshotCache {
    entries: HashMap<RecordKind, Arc<Snapshot>>,
    max_age: Duration,
}

impl SnapshotCache {
    pub fn new(max_age: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            max_age,
        }
    }

    /// Fresh snapshot for `kind`, if cached
    pub fn get(&mut self, kind: RecordKind) -> Option<Arc<Snapshot>> {
        let snapshot = self.entries.get(&kind)?;
        if self.is_stale(snapshot) {
            tracing::debug!(kind = %kind, "Cached snapshot is stale");
            self.entries.remove(&kind);
            return None;
        }
        Some(Arc::clone(snapshot))
    }

    pub fn insert(&mut self, snapshot: Arc<Snapshot>) {
        self.entries.insert(snapshot.kind, snapshot);
    }

    /// Keep only entries of `kind`
    pub fn select_kind(&mut self, kind: RecordKind) {
        let before = self.entries.len();
        self.entries.retain(|k, _| *k == kind);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!(kind = %kind, evicted, "Evicted snapshots of other kinds");
        }
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_stale(&self, snapshot: &Snapshot) -> bool {
        match snapshot.age().to_std() {
            Ok(age) => age > self.max_age,
            // Negative age: clock moved backwards; keep the entry
            Err(_) => false,
        }
    }
}
