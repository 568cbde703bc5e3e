//! Immutable per-view snapshot of one record kind

use crate::model::{Record, RecordKind};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Full result of one bulk fetch
///
/// Snapshots are shared as `Arc<Snapshot>` and never mutated after
/// construction; a refetch produces a new one that replaces the old
/// wholesale.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub kind: RecordKind,
    pub records: Vec<Record>,
    pub fetched_at: DateTime<Utc>,
    /// Fetch that produced this snapshot
    pub fetch_id: Uuid,
}

impl Snapshot {
    pub fn new(kind: RecordKind, records: Vec<Record>, fetch_id: Uuid) -> Self {
        Self {
            kind,
            records,
            fetched_at: agrix_common::time::now(),
            fetch_id,
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Age of the snapshot relative to now
    pub fn age(&self) -> chrono::Duration {
        agrix_common::time::now() - self.fetched_at
    }
}
