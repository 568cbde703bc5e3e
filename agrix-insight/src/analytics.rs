//! Analytics dataset: every kind fetched in one cycle

use crate::aggregate::{aggregate, aggregate_all, monthly_totals, CategorySummary, MonthlyTotals};
use crate::category::Category;
use crate::model::{Record, RecordKind};
use serde::Serialize;

/// Enriched rows of every kind from one fetch cycle
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsDataset {
    pub farmers: Vec<Record>,
    pub crops: Vec<Record>,
    pub rice: Vec<Record>,
    pub livestock: Vec<Record>,
    pub operators: Vec<Record>,
    pub high_value_crops: Vec<Record>,
}

impl AnalyticsDataset {
    pub fn records(&self, kind: RecordKind) -> &[Record] {
        match kind {
            RecordKind::Farmer => &self.farmers,
            RecordKind::Crop => &self.crops,
            RecordKind::Rice => &self.rice,
            RecordKind::Livestock => &self.livestock,
            RecordKind::Operator => &self.operators,
            RecordKind::HighValueCrop => &self.high_value_crops,
        }
    }

    /// Rows of the kinds `category` draws from
    pub fn source_records(&self, category: Category) -> Vec<Record> {
        category
            .definition()
            .sources
            .iter()
            .flat_map(|source| self.records(source.kind).iter().cloned())
            .collect()
    }

    pub fn summary(&self, category: Category) -> CategorySummary {
        aggregate(&self.source_records(category), category)
    }

    /// Summaries of every category in evaluation order
    pub fn summaries(&self) -> Vec<CategorySummary> {
        let all: Vec<Record> = RecordKind::ALL
            .into_iter()
            .flat_map(|kind| self.records(kind).iter().cloned())
            .collect();
        aggregate_all(&all)
    }

    pub fn monthly(&self, category: Category) -> MonthlyTotals {
        monthly_totals(&self.source_records(category), category)
    }

    pub fn len(&self) -> usize {
        RecordKind::ALL
            .into_iter()
            .map(|kind| self.records(kind).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
