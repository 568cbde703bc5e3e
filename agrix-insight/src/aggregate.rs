//! Aggregator: per-category production summaries
//!
//! Summaries are recomputed from scratch on every call; nothing here holds
//! state between calls, so aggregating the same rows twice gives identical
//! results.

use crate::category::Category;
use crate::classify::classify;
use crate::extract::{extract_record, source_of};
use crate::model::Record;
use crate::normalize::aggregation_label;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One canonical label and its accumulated quantity (always > 0)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryItem {
    pub name: String,
    pub value: f64,
}

/// Item with its share of the category total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemShare {
    pub name: String,
    pub value: f64,
    pub percent: f64,
}

/// Totals for one category, items sorted by value descending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub display_name: &'static str,
    pub unit: &'static str,
    pub total: f64,
    pub items: Vec<CategoryItem>,
}

impl CategorySummary {
    fn empty(category: Category) -> Self {
        Self {
            category,
            display_name: category.display_name(),
            unit: category.unit(),
            total: 0.0,
            items: Vec::new(),
        }
    }

    /// Share of `value` in the total, 0 when the total is 0
    pub fn percentage(&self, value: f64) -> f64 {
        if self.total == 0.0 {
            0.0
        } else {
            value / self.total * 100.0
        }
    }

    pub fn percentages(&self) -> Vec<ItemShare> {
        self.items
            .iter()
            .map(|item| ItemShare {
                name: item.name.clone(),
                value: item.value,
                percent: self.percentage(item.value),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Label → quantity accumulator that remembers first-seen order
#[derive(Default)]
struct Accumulator {
    items: Vec<CategoryItem>,
    index: HashMap<String, usize>,
}

impl Accumulator {
    fn add(&mut self, name: String, quantity: f64) {
        match self.index.get(&name) {
            Some(&idx) => self.items[idx].value += quantity,
            None => {
                self.index.insert(name.clone(), self.items.len());
                self.items.push(CategoryItem {
                    name,
                    value: quantity,
                });
            }
        }
    }

    fn into_sorted(mut self) -> Vec<CategoryItem> {
        // sort_by is stable: ties keep first-seen order
        self.items
            .sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
        self.items
    }
}

/// Summarize the rows of `records` that classify into `category`
pub fn aggregate(records: &[Record], category: Category) -> CategorySummary {
    let mut acc = Accumulator::default();

    for record in records.iter().filter(|r| classify(r) == Some(category)) {
        let Some(extraction) = extract_record(record, category) else {
            continue;
        };
        if extraction.quantity <= 0.0 {
            continue;
        }
        acc.add(
            aggregation_label(category, &extraction.label),
            extraction.quantity,
        );
    }

    let items = acc.into_sorted();
    let total = items.iter().map(|item| item.value).sum();

    CategorySummary {
        total,
        items,
        ..CategorySummary::empty(category)
    }
}

/// Summaries for every category in evaluation order
pub fn aggregate_all(records: &[Record]) -> Vec<CategorySummary> {
    Category::ALL
        .into_iter()
        .map(|category| aggregate(records, category))
        .collect()
}

/// Quantity produced in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: u32,
    pub value: f64,
}

/// Per-month totals of one category
///
/// Only the embedded payload carries a month. Rows without a recognizable
/// one are summed into `unspecified` instead of being assigned a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub category: Category,
    /// Always 12 entries, January first
    pub months: Vec<MonthTotal>,
    pub unspecified: f64,
}

impl MonthlyTotals {
    pub fn total(&self) -> f64 {
        self.months.iter().map(|m| m.value).sum::<f64>() + self.unspecified
    }
}

/// Group the category's extracted quantities by payload month
pub fn monthly_totals(records: &[Record], category: Category) -> MonthlyTotals {
    let mut months: Vec<MonthTotal> = (1..=12).map(|month| MonthTotal { month, value: 0.0 }).collect();
    let mut unspecified = 0.0;

    for record in records.iter().filter(|r| classify(r) == Some(category)) {
        let Some(extraction) = extract_record(record, category) else {
            continue;
        };
        if extraction.quantity <= 0.0 {
            continue;
        }

        let month = source_of(record)
            .and_then(|s| s.production_data())
            .and_then(|p| p.month_number());

        match month {
            Some(m) => months[(m - 1) as usize].value += extraction.quantity,
            None => unspecified += extraction.quantity,
        }
    }

    MonthlyTotals {
        category,
        months,
        unspecified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CropRecord, OperatorRecord, Scalar};
    use serde_json::json;

    fn crop(value: serde_json::Value) -> Record {
        Record::Crop(serde_json::from_value::<CropRecord>(value).unwrap())
    }

    #[test]
    fn test_stable_sort_keeps_first_seen_on_ties() {
        let records = vec![
            crop(json!({"crop_type": "Spices", "crop_value": "Ginger", "quantity": 5})),
            crop(json!({"crop_type": "Spices", "crop_value": "Garlic", "quantity": 5})),
            crop(json!({"crop_type": "Spices", "crop_value": "Chili", "quantity": 9})),
        ];

        let summary = aggregate(&records, Category::Spices);
        let names: Vec<&str> = summary.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Chili", "Ginger", "Garlic"]);
        assert_eq!(summary.total, 19.0);
    }

    #[test]
    fn test_zero_quantity_rows_dropped() {
        let records = vec![
            crop(json!({"crop_type": "Legumes", "crop_value": "Peanut"})),
            crop(json!({"crop_type": "Legumes", "crop_value": "Soybean", "quantity": "0"})),
        ];
        let summary = aggregate(&records, Category::Legumes);
        assert!(summary.is_empty());
        assert_eq!(summary.total, 0.0);
    }

    #[test]
    fn test_fish_merges_crop_and_operator_rows() {
        let records = vec![
            crop(json!({"crop_type": "Fish", "crop_value": "Tilapia", "quantity": 30})),
            Record::Operator(OperatorRecord {
                cultured_species: Some("Nile Tilapia".to_string()),
                production_kg: Some(Scalar::Number(70.0)),
                ..Default::default()
            }),
            Record::Operator(OperatorRecord {
                cultured_species: Some("bangus".to_string()),
                production_kg: Some(Scalar::Text("25".to_string())),
                ..Default::default()
            }),
        ];

        let summary = aggregate(&records, Category::Fish);
        assert_eq!(
            summary.items,
            vec![
                CategoryItem {
                    name: "Tilapia".to_string(),
                    value: 100.0
                },
                CategoryItem {
                    name: "Milkfish/Bangus".to_string(),
                    value: 25.0
                },
            ]
        );
    }

    #[test]
    fn test_percentages() {
        let records = vec![
            crop(json!({"crop_type": "Banana", "crop_value": "Lakatan", "quantity": 30})),
            crop(json!({"crop_type": "Banana", "crop_value": "Saba", "quantity": 10})),
        ];
        let shares = aggregate(&records, Category::Banana).percentages();
        assert_eq!(shares[0].percent, 75.0);
        assert_eq!(shares[1].percent, 25.0);
    }

    #[test]
    fn test_percentage_with_zero_total() {
        let summary = aggregate(&[], Category::Rice);
        assert_eq!(summary.percentage(10.0), 0.0);
        assert!(summary.percentages().is_empty());
    }

    #[test]
    fn test_aggregate_all_in_category_order() {
        let ids: Vec<Category> = aggregate_all(&[]).into_iter().map(|s| s.category).collect();
        assert_eq!(ids, Category::ALL.to_vec());
    }

    #[test]
    fn test_monthly_totals_with_unspecified() {
        let hvc = |payload: serde_json::Value| {
            Record::HighValueCrop(
                serde_json::from_value::<CropRecord>(json!({
                    "crop_type": "High Value Crops",
                    "production_data": payload.to_string()
                }))
                .unwrap(),
            )
        };
        let records = vec![
            hvc(json!({"crop": "Ampalaya", "month": "3", "quantity": 12})),
            hvc(json!({"crop": "Eggplant", "month": "March", "quantity": 8})),
            hvc(json!({"crop": "Okra", "month": "December", "quantity": 4})),
            hvc(json!({"crop": "Squash", "quantity": 6})),
            hvc(json!({"crop": "Tomato", "month": "soon", "quantity": 1})),
        ];

        let monthly = monthly_totals(&records, Category::HighValueCrops);
        assert_eq!(monthly.months.len(), 12);
        assert_eq!(monthly.months[2].value, 20.0);
        assert_eq!(monthly.months[11].value, 4.0);
        assert_eq!(monthly.unspecified, 7.0);
        assert_eq!(monthly.total(), 31.0);
    }
}
