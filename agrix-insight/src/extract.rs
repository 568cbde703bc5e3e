//! Field extractor
//!
//! Pulls a `{label, quantity}` pair out of a row. Each row shape exposes its
//! candidate fields through [`ProductionSource`]; the precedence rules live
//! here once:
//!
//! - label: payload `crop` → `crop_value` → type/species field →
//!   `"Unknown <Category>"`
//! - quantity: payload `quantity` → `quantity` → `yield_amount` →
//!   `production` → `production_kg`; the first candidate that parses to a
//!   finite number greater than zero wins, otherwise 0.
//!
//! Nothing here fails: malformed input degrades to "absent".

use crate::category::Category;
use crate::model::{
    non_blank, CropRecord, LivestockRecord, OperatorRecord, Record, RiceRecord, Scalar,
};
use crate::payload::ProductionData;

/// Label and quantity extracted from one row
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub label: String,
    /// 0 when no candidate field qualified
    pub quantity: f64,
}

/// Candidate fields a row offers to the extractor
pub trait ProductionSource {
    fn production_data(&self) -> Option<&ProductionData> {
        None
    }

    fn crop_value(&self) -> Option<&str> {
        None
    }

    /// Type or species column (`crop_type`, `variety`, `animal_type`, ...)
    fn type_label(&self) -> Option<&str>;

    /// Row-level quantity columns in precedence order
    fn quantity_fields(&self) -> Vec<Option<&Scalar>>;
}

impl ProductionSource for CropRecord {
    fn production_data(&self) -> Option<&ProductionData> {
        self.production_data.as_ref()
    }

    fn crop_value(&self) -> Option<&str> {
        self.crop_value.as_deref()
    }

    fn type_label(&self) -> Option<&str> {
        self.crop_type.as_deref()
    }

    fn quantity_fields(&self) -> Vec<Option<&Scalar>> {
        vec![
            self.quantity.as_ref(),
            self.yield_amount.as_ref(),
            self.production.as_ref(),
        ]
    }
}

impl ProductionSource for RiceRecord {
    fn type_label(&self) -> Option<&str> {
        self.variety.as_deref()
    }

    fn quantity_fields(&self) -> Vec<Option<&Scalar>> {
        vec![
            self.quantity.as_ref(),
            self.yield_amount.as_ref(),
            self.production.as_ref(),
        ]
    }
}

impl ProductionSource for LivestockRecord {
    fn type_label(&self) -> Option<&str> {
        non_blank(self.animal_type.as_deref()).or(self.subcategory.as_deref())
    }

    fn quantity_fields(&self) -> Vec<Option<&Scalar>> {
        vec![self.quantity.as_ref()]
    }
}

impl ProductionSource for OperatorRecord {
    fn type_label(&self) -> Option<&str> {
        self.cultured_species.as_deref()
    }

    fn quantity_fields(&self) -> Vec<Option<&Scalar>> {
        vec![self.production_kg.as_ref()]
    }
}

/// Extract `{label, quantity}` from a row
pub fn extract<S: ProductionSource + ?Sized>(source: &S, category: Category) -> Extraction {
    let label = resolve_label(source)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Unknown {}", category.display_name()));

    Extraction {
        label,
        quantity: resolve_quantity(source).unwrap_or(0.0),
    }
}

/// Extract from any record; farmer rows carry no production
pub fn extract_record(record: &Record, category: Category) -> Option<Extraction> {
    source_of(record).map(|source| extract(source, category))
}

/// Production view of a record, if it has one
pub fn source_of(record: &Record) -> Option<&dyn ProductionSource> {
    match record {
        Record::Farmer(_) => None,
        Record::Crop(r) | Record::HighValueCrop(r) => Some(r),
        Record::Rice(r) => Some(r),
        Record::Livestock(r) => Some(r),
        Record::Operator(r) => Some(r),
    }
}

/// First non-blank label candidate
pub fn resolve_label<S: ProductionSource + ?Sized>(source: &S) -> Option<&str> {
    source
        .production_data()
        .and_then(ProductionData::crop_label)
        .or_else(|| non_blank(source.crop_value()))
        .or_else(|| non_blank(source.type_label()))
}

/// First quantity candidate that is finite and positive
pub fn resolve_quantity<S: ProductionSource + ?Sized>(source: &S) -> Option<f64> {
    let payload_quantity = source.production_data().and_then(|p| p.quantity.as_ref());

    std::iter::once(payload_quantity)
        .chain(source.quantity_fields())
        .flatten()
        .filter_map(Scalar::as_f64)
        .find(|q| *q > 0.0)
}
