//! Aggregation pipeline tests: extract → classify → normalize → aggregate

use agrix_insight::aggregate::{aggregate, aggregate_all, CategoryItem};
use agrix_insight::enrich::{enrich, FarmerIndex, UNKNOWN};
use agrix_insight::model::{CropRecord, LivestockRecord, OperatorRecord, RiceRecord};
use agrix_insight::{Category, Record};
use serde_json::json;

fn crop(value: serde_json::Value) -> Record {
    Record::Crop(serde_json::from_value::<CropRecord>(value).unwrap())
}

fn mixed_records() -> Vec<Record> {
    vec![
        crop(json!({"crop_type": "Legumes", "production_data": "{\"crop\":\"Peanut\",\"quantity\":\"7\"}"})),
        crop(json!({"crop_type": "Banana", "crop_value": "Lakatan", "yield_amount": "40"})),
        crop(json!({"crop_type": "Banana", "crop_value": "Saba", "production": 12.5})),
        crop(json!({"crop_type": "Spices", "crop_value": "Ginger", "quantity": "3"})),
        crop(json!({"crop_type": "Corn", "crop_value": "White", "quantity": "100"})),
        crop(json!({"crop_type": "Legumes", "production_data": "{broken"})),
        Record::Rice(serde_json::from_value::<RiceRecord>(json!({"variety": "Jasmine", "quantity": 8})).unwrap()),
        Record::Rice(serde_json::from_value::<RiceRecord>(json!({"variety": "rc 222", "production": "0"})).unwrap()),
        Record::Livestock(serde_json::from_value::<LivestockRecord>(json!({"animal_type": "Native Chicken", "quantity": "25"})).unwrap()),
        Record::Livestock(serde_json::from_value::<LivestockRecord>(json!({"animal_type": "Baboy", "quantity": 4})).unwrap()),
        Record::Operator(serde_json::from_value::<OperatorRecord>(json!({"cultured_species": "Bangus", "production_kg": "300"})).unwrap()),
    ]
}

#[test]
fn test_case_variants_fold_to_one_title_cased_item() {
    let records = vec![
        crop(json!({"crop_type": "Legumes", "production_data": "{\"crop\":\"Mung Bean\",\"quantity\":\"10\"}"})),
        crop(json!({"crop_type": "Legumes", "production_data": "{\"crop\":\"mung bean\",\"quantity\":\"5\"}"})),
    ];

    let summary = aggregate(&records, Category::Legumes);

    assert_eq!(summary.total, 15.0);
    assert_eq!(
        summary.items,
        vec![CategoryItem {
            name: "Mung Bean".to_string(),
            value: 15.0
        }]
    );
}

#[test]
fn test_folded_key_independent_of_row_order() {
    let records = vec![
        crop(json!({"crop_type": "Legumes", "production_data": "{\"crop\":\"mung bean\",\"quantity\":\"5\"}"})),
        crop(json!({"crop_type": "Legumes", "production_data": "{\"crop\":\"Mung Bean\",\"quantity\":\"10\"}"})),
    ];
    assert_eq!(aggregate(&records, Category::Legumes).items[0].name, "Mung Bean");
}

#[test]
fn test_rice_line_code_upper_cased() {
    let records = vec![Record::Rice(
        serde_json::from_value::<RiceRecord>(json!({"variety": "RC160", "production": "20"})).unwrap(),
    )];

    let summary = aggregate(&records, Category::Rice);

    assert_eq!(summary.total, 20.0);
    assert_eq!(summary.items.len(), 1);
    assert_eq!(summary.items[0].name, "RC160");
    assert_eq!(summary.items[0].value, 20.0);
}

#[test]
fn test_unjoined_livestock_still_aggregated() {
    let index = FarmerIndex::build(&[]);
    let records = enrich(
        vec![Record::Livestock(
            serde_json::from_value::<LivestockRecord>(json!({
                "farmer_id": 404,
                "animal_type": "Goat",
                "quantity": 6
            }))
            .unwrap(),
        )],
        &index,
    );

    assert_eq!(records[0].farmer_name().as_deref(), Some(UNKNOWN));
    assert_eq!(records[0].barangay(), Some(UNKNOWN));

    let summary = aggregate(&records, Category::Livestock);
    assert_eq!(summary.total, 6.0);
    assert_eq!(summary.items[0].name, "Goat");
}

#[test]
fn test_aggregate_is_idempotent() {
    let records = mixed_records();
    for category in Category::ALL {
        assert_eq!(aggregate(&records, category), aggregate(&records, category));
    }
}

#[test]
fn test_total_equals_item_sum_and_items_positive() {
    for summary in aggregate_all(&mixed_records()) {
        let sum: f64 = summary.items.iter().map(|i| i.value).sum();
        assert_eq!(summary.total, sum, "{}", summary.display_name);
        assert!(summary.items.iter().all(|i| i.value > 0.0));
        assert!(summary
            .items
            .windows(2)
            .all(|pair| pair[0].value >= pair[1].value));
    }
}

#[test]
fn test_mixed_dataset_summaries() {
    let summaries = aggregate_all(&mixed_records());
    let by_category = |c: Category| summaries.iter().find(|s| s.category == c).unwrap();

    assert_eq!(by_category(Category::Banana).total, 52.5);
    assert_eq!(by_category(Category::Banana).items[0].name, "Lakatan");
    assert_eq!(by_category(Category::Legumes).total, 7.0);
    assert_eq!(by_category(Category::Spices).total, 3.0);
    // Zero production rice row dropped
    assert_eq!(by_category(Category::Rice).items.len(), 1);
    assert_eq!(by_category(Category::Rice).items[0].name, "Jasmine Rice");
    assert_eq!(by_category(Category::Livestock).items[0].name, "Chicken");
    assert_eq!(by_category(Category::Livestock).items[1].name, "Swine");
    assert_eq!(by_category(Category::Fish).items[0].name, "Milkfish/Bangus");
    assert!(by_category(Category::HighValueCrops).is_empty());
}

#[test]
fn test_percentages_never_nan() {
    for summary in aggregate_all(&[]) {
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.percentage(0.0), 0.0);
        assert_eq!(summary.percentage(5.0), 0.0);
    }

    let summary = aggregate(&mixed_records(), Category::Banana);
    let total: f64 = summary.percentages().iter().map(|s| s.percent).sum();
    assert!((total - 100.0).abs() < 1e-9);
}
