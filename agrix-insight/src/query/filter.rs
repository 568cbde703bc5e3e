//! Filter stages of `compute_view`
//!
//! Applied in a fixed order: free-text search, barangay, then the
//! `created_at` date filter. Each stage only narrows the previous one.

use super::state::Filters;
use crate::extract::resolve_quantity;
use crate::model::{format_quantity, Record, Scalar};
use agrix_common::time::year_month;

/// Indices of the records that pass every active filter, in snapshot order
pub fn apply_filters(records: &[Record], filters: &Filters) -> Vec<usize> {
    let needle = filters.search_term().map(str::to_lowercase);

    records
        .iter()
        .enumerate()
        .filter(|(_, r)| needle.as_deref().map_or(true, |n| matches_search(r, n)))
        .filter(|(_, r)| matches_barangay(r, filters.barangay.as_deref()))
        .filter(|(_, r)| matches_date(r, filters.month, filters.year))
        .map(|(idx, _)| idx)
        .collect()
}

/// Case-insensitive substring match over the kind's search fields
///
/// `needle` must already be lower-cased.
pub fn matches_search(record: &Record, needle: &str) -> bool {
    search_fields(record)
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

pub fn matches_barangay(record: &Record, barangay: Option<&str>) -> bool {
    match barangay {
        None => true,
        Some(wanted) => record.barangay() == Some(wanted),
    }
}

/// Year/month filter on `created_at`
///
/// With either dimension set, records without a parseable `created_at` are
/// excluded.
pub fn matches_date(record: &Record, month: Option<u32>, year: Option<i32>) -> bool {
    if month.is_none() && year.is_none() {
        return true;
    }
    let Some((y, m)) = record.created_at().and_then(year_month) else {
        return false;
    };
    year.map_or(true, |wanted| wanted == y) && month.map_or(true, |wanted| wanted == m)
}

/// Text fields searched for each record kind
pub fn search_fields(record: &Record) -> Vec<String> {
    let mut fields: Vec<Option<String>> = match record {
        Record::Farmer(r) => vec![
            r.display_name(),
            r.contact_number.clone(),
            r.email.clone(),
            r.address.clone(),
        ],
        Record::Crop(r) | Record::HighValueCrop(r) => vec![
            r.crop_type.clone(),
            r.resolved_crop().map(str::to_string),
            r.area.as_ref().map(Scalar::as_text),
            resolve_quantity(r).map(format_quantity),
        ],
        Record::Rice(r) => vec![
            r.variety.clone(),
            r.area.as_ref().map(Scalar::as_text),
            resolve_quantity(r).map(format_quantity),
        ],
        Record::Livestock(r) => vec![
            r.animal_type.clone(),
            r.subcategory.clone(),
            r.quantity.as_ref().map(Scalar::as_text),
        ],
        // Species only: a pond named after a species must not match
        Record::Operator(r) => vec![r.cultured_species.clone()],
    };

    match record {
        Record::Operator(_) => {}
        Record::Farmer(_) => fields.push(record.barangay().map(str::to_string)),
        _ => {
            fields.push(record.farmer_name());
            fields.push(record.barangay().map(str::to_string));
        }
    }

    fields.into_iter().flatten().collect()
}
