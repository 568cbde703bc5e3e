//! Filter option discovery over a snapshot

use crate::model::Record;
use agrix_common::time::{current_year, year_month};
use serde::Serialize;
use std::collections::BTreeSet;

/// Months offered by the month filter
pub const MONTH_OPTIONS: [u32; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

/// Values the view's filters can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Sorted, unique, non-empty
    pub barangays: Vec<String>,
    pub months: Vec<u32>,
    /// Descending; the current year when no record is dated
    pub years: Vec<i32>,
}

impl FilterOptions {
    pub fn from_records(records: &[Record]) -> Self {
        Self {
            barangays: barangay_options(records),
            months: MONTH_OPTIONS.to_vec(),
            years: year_options(records),
        }
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self::from_records(&[])
    }
}

pub fn barangay_options(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(Record::barangay)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn year_options(records: &[Record]) -> Vec<i32> {
    let years: BTreeSet<i32> = records
        .iter()
        .filter_map(Record::created_at)
        .filter_map(year_month)
        .map(|(year, _)| year)
        .collect();

    if years.is_empty() {
        return vec![current_year()];
    }
    years.into_iter().rev().collect()
}
