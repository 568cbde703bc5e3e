//! Derivation of the nested record kinds from the farmer list
//!
//! Crop, high-value crop and rice rows live under their farmer. Crops and
//! high-value crops are complementary splits of the same nested list on the
//! high-value type tag.

use crate::category::is_high_value_tag;
use crate::model::{CropRecord, Farmer, Record, RecordId, RiceRecord};

/// Nested crop rows that are not tagged high-value
pub fn crops(farmers: &[Farmer]) -> Vec<Record> {
    nested_crops(farmers, false)
        .map(Record::Crop)
        .collect()
}

/// Nested crop rows tagged high-value
pub fn high_value_crops(farmers: &[Farmer]) -> Vec<Record> {
    nested_crops(farmers, true)
        .map(Record::HighValueCrop)
        .collect()
}

/// Nested rice rows
pub fn rice(farmers: &[Farmer]) -> Vec<Record> {
    farmers
        .iter()
        .flat_map(|farmer| {
            farmer.rice.iter().flatten().map(move |row| RiceRecord {
                farmer_id: owner(row.farmer_id.as_ref(), farmer),
                ..row.clone()
            })
        })
        .map(Record::Rice)
        .collect()
}

/// Farmer rows as records
pub fn farmers(farmers: &[Farmer]) -> Vec<Record> {
    farmers.iter().cloned().map(Record::Farmer).collect()
}

fn nested_crops(farmers: &[Farmer], high_value: bool) -> impl Iterator<Item = CropRecord> + '_ {
    farmers.iter().flat_map(move |farmer| {
        farmer
            .crops
            .iter()
            .flatten()
            .filter(move |row| is_high_value_tag(row.crop_type.as_deref()) == high_value)
            .map(move |row| CropRecord {
                farmer_id: owner(row.farmer_id.as_ref(), farmer),
                ..row.clone()
            })
    })
}

/// The row's own farmer reference, else its parent's id
fn owner(own: Option<&RecordId>, parent: &Farmer) -> Option<RecordId> {
    own.or(parent.id.as_ref()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<Farmer> {
        serde_json::from_value(json!([
            {
                "id": 1,
                "name": "Maria",
                "crops": [
                    {"id": 10, "crop_type": "Legumes", "crop_value": "Peanut"},
                    {"id": 11, "crop_type": "High Value Crops", "crop_value": "Ampalaya"}
                ],
                "rice": [{"id": 20, "variety": "Dinorado", "farmer_id": 1}]
            },
            {
                "id": 2,
                "name": "Pedro",
                "crops": [{"id": 12, "crop_type": "high value crops ", "farmer_id": 5}]
            },
            {"id": 3, "name": "Ana"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_crop_split_is_complementary() {
        let farmers = sample();
        let crops = crops(&farmers);
        let hvc = high_value_crops(&farmers);

        assert_eq!(crops.len(), 1);
        assert_eq!(hvc.len(), 2);
        assert!(crops.iter().all(|r| matches!(r, Record::Crop(_))));
        assert!(hvc.iter().all(|r| matches!(r, Record::HighValueCrop(_))));
    }

    #[test]
    fn test_parent_id_fills_missing_reference() {
        let farmers = sample();
        let hvc = high_value_crops(&farmers);

        assert_eq!(hvc[0].farmer_id(), Some(&RecordId::from(1)));
        // An explicit reference is kept
        assert_eq!(hvc[1].farmer_id(), Some(&RecordId::from(5)));
    }

    #[test]
    fn test_rice_flattened() {
        let rows = rice(&sample());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].farmer_id(), Some(&RecordId::from(1)));
    }

    #[test]
    fn test_farmers_as_records() {
        let rows = farmers(&sample());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].farmer_name().as_deref(), Some("Ana"));
    }
}
