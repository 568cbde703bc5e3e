//! Cross-record enricher
//!
//! Left-joins rows to the farmer that owns them. The farmer index is built
//! once per fetch cycle; a row whose `farmer_id` is missing or unknown gets
//! the [`UNKNOWN`] identity and is kept.

use crate::model::{Farmer, Record, RecordId};
use std::collections::HashMap;
use tracing::debug;

/// Placeholder for an unresolved farmer name or barangay
pub const UNKNOWN: &str = "Unknown";

/// Joined identity of one farmer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmerIdentity {
    pub name: String,
    pub barangay: String,
}

impl FarmerIdentity {
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            barangay: UNKNOWN.to_string(),
        }
    }

    fn of(farmer: &Farmer) -> Self {
        Self {
            name: farmer.display_name().unwrap_or_else(|| UNKNOWN.to_string()),
            barangay: farmer
                .barangay
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .unwrap_or(UNKNOWN)
                .to_string(),
        }
    }
}

/// `farmer_id → identity` lookup
#[derive(Debug, Clone, Default)]
pub struct FarmerIndex {
    by_id: HashMap<RecordId, FarmerIdentity>,
}

impl FarmerIndex {
    /// Index farmers by id; farmers without an id are skipped
    pub fn build(farmers: &[Farmer]) -> Self {
        let by_id = farmers
            .iter()
            .filter_map(|f| f.id.clone().map(|id| (id, FarmerIdentity::of(f))))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, id: &RecordId) -> Option<&FarmerIdentity> {
        self.by_id.get(id)
    }

    /// Identity for an optional reference, defaulting to [`UNKNOWN`]
    pub fn lookup(&self, id: Option<&RecordId>) -> FarmerIdentity {
        id.and_then(|id| self.get(id))
            .cloned()
            .unwrap_or_else(FarmerIdentity::unknown)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Attach `farmer_name` and `barangay` to every non-farmer row
pub fn enrich(mut records: Vec<Record>, index: &FarmerIndex) -> Vec<Record> {
    let mut misses = 0usize;

    for record in records.iter_mut() {
        if matches!(record, Record::Farmer(_)) {
            continue;
        }
        let identity = match record.farmer_id().and_then(|id| index.get(id)) {
            Some(identity) => identity.clone(),
            None => {
                misses += 1;
                FarmerIdentity::unknown()
            }
        };
        record.set_identity(identity.name, identity.barangay);
    }

    if misses > 0 {
        debug!(misses, farmers = index.len(), "Rows without a matching farmer");
    }
    records
}
