//! Record kinds and their row shapes as served by the record store
//!
//! All six kinds share an optional `barangay` and `created_at`; every kind
//! except Farmer references its farmer through `farmer_id`. Fields are
//! decoded leniently (see [`crate::lenient`]) so that one odd column never
//! drops a row.

use crate::lenient;
use crate::payload::{self, ProductionData};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Record kinds
// ============================================================================

/// One of the six structurally distinct record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Farmer,
    Crop,
    Rice,
    Livestock,
    Operator,
    HighValueCrop,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::Farmer,
        RecordKind::Crop,
        RecordKind::Rice,
        RecordKind::Livestock,
        RecordKind::Operator,
        RecordKind::HighValueCrop,
    ];

    /// Plural name used in views, events and the CLI
    pub fn wire_name(self) -> &'static str {
        match self {
            RecordKind::Farmer => "farmers",
            RecordKind::Crop => "crops",
            RecordKind::Rice => "rice",
            RecordKind::Livestock => "livestock",
            RecordKind::Operator => "operators",
            RecordKind::HighValueCrop => "high_value_crops",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "farmer" | "farmers" => Ok(RecordKind::Farmer),
            "crop" | "crops" => Ok(RecordKind::Crop),
            "rice" => Ok(RecordKind::Rice),
            "livestock" => Ok(RecordKind::Livestock),
            "operator" | "operators" => Ok(RecordKind::Operator),
            "high_value_crop" | "high_value_crops" | "hvc" => Ok(RecordKind::HighValueCrop),
            _ => Err(format!("unknown record kind: {s}")),
        }
    }
}

// ============================================================================
// Loosely typed values
// ============================================================================

/// Scalar column that may arrive as a number or as numeric text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl Scalar {
    /// Finite numeric value, if the scalar parses as one
    ///
    /// Thousands separators in text (`"1,250"`) are ignored.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            Scalar::Number(n) => *n,
            Scalar::Text(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
            Scalar::Flag(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Text form used for free-text search
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Number(n) => format_quantity(*n),
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Flag(b) => b.to_string(),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

/// Render a quantity without a trailing `.0` for whole numbers
pub fn format_quantity(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Record identifier; the store sends integers or strings interchangeably
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self(i.to_string()))
                } else {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.is_finite())
                        .map(|f| Self(format_quantity(f)))
                }
            }
            Value::String(s) if !s.trim().is_empty() => Some(Self::new(s.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// Row shapes
// ============================================================================

/// Farmer profile, optionally embedding its crop and rice rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Farmer {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub contact_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub barangay: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub created_at: Option<String>,
    /// `None` when the store omitted the relation (not the same as empty)
    #[serde(default, deserialize_with = "lenient::seq", skip_serializing_if = "Option::is_none")]
    pub crops: Option<Vec<CropRecord>>,
    #[serde(default, deserialize_with = "lenient::seq", skip_serializing_if = "Option::is_none")]
    pub rice: Option<Vec<RiceRecord>>,
}

impl Farmer {
    /// Display name: `name` if set, else the non-blank name parts joined
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = non_blank(self.name.as_deref()) {
            return Some(name.to_string());
        }

        let parts: Vec<&str> = [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .filter_map(|p| non_blank(p.as_deref()))
            .collect();

        (!parts.is_empty()).then(|| parts.join(" "))
    }

    /// Whether nested crop/rice rows must be fetched from the detail endpoint
    pub fn lacks_nested_rows(&self) -> bool {
        self.crops.is_none() || self.rice.is_none()
    }
}

/// Crop row (also the shape of high-value crop rows)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRecord {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub farmer_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub crop_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub crop_value: Option<String>,
    #[serde(default, deserialize_with = "lenient::scalar")]
    pub area: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient::scalar", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient::scalar", skip_serializing_if = "Option::is_none")]
    pub yield_amount: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient::scalar", skip_serializing_if = "Option::is_none")]
    pub production: Option<Scalar>,
    #[serde(
        default,
        deserialize_with = "payload::deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub production_data: Option<ProductionData>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub barangay: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub farmer_name: Option<String>,
}

impl CropRecord {
    /// Crop label as shown in inventory: payload crop, else `crop_value`
    pub fn resolved_crop(&self) -> Option<&str> {
        self.production_data
            .as_ref()
            .and_then(ProductionData::crop_label)
            .or_else(|| non_blank(self.crop_value.as_deref()))
    }
}

/// Rice production row (nested under farmers)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiceRecord {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub farmer_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub variety: Option<String>,
    #[serde(default, deserialize_with = "lenient::scalar")]
    pub area: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient::scalar", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient::scalar", skip_serializing_if = "Option::is_none")]
    pub yield_amount: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient::scalar", skip_serializing_if = "Option::is_none")]
    pub production: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub barangay: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub farmer_name: Option<String>,
}

/// Livestock / poultry headcount row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LivestockRecord {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub farmer_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub animal_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub subcategory: Option<String>,
    #[serde(default, deserialize_with = "lenient::scalar")]
    pub quantity: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub barangay: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub farmer_name: Option<String>,
}

/// Fishpond operator row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorRecord {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub farmer_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fishpond_location: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub cultured_species: Option<String>,
    #[serde(default, deserialize_with = "lenient::scalar")]
    pub area: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient::scalar", skip_serializing_if = "Option::is_none")]
    pub stocking_density: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient::scalar")]
    pub production_kg: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub barangay: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub farmer_name: Option<String>,
}

// ============================================================================
// Record
// ============================================================================

/// A row of any kind, as held in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Farmer(Farmer),
    Crop(CropRecord),
    Rice(RiceRecord),
    Livestock(LivestockRecord),
    Operator(OperatorRecord),
    HighValueCrop(CropRecord),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Farmer(_) => RecordKind::Farmer,
            Record::Crop(_) => RecordKind::Crop,
            Record::Rice(_) => RecordKind::Rice,
            Record::Livestock(_) => RecordKind::Livestock,
            Record::Operator(_) => RecordKind::Operator,
            Record::HighValueCrop(_) => RecordKind::HighValueCrop,
        }
    }

    pub fn barangay(&self) -> Option<&str> {
        let barangay = match self {
            Record::Farmer(r) => &r.barangay,
            Record::Crop(r) | Record::HighValueCrop(r) => &r.barangay,
            Record::Rice(r) => &r.barangay,
            Record::Livestock(r) => &r.barangay,
            Record::Operator(r) => &r.barangay,
        };
        non_blank(barangay.as_deref())
    }

    pub fn created_at(&self) -> Option<&str> {
        let created_at = match self {
            Record::Farmer(r) => &r.created_at,
            Record::Crop(r) | Record::HighValueCrop(r) => &r.created_at,
            Record::Rice(r) => &r.created_at,
            Record::Livestock(r) => &r.created_at,
            Record::Operator(r) => &r.created_at,
        };
        non_blank(created_at.as_deref())
    }

    /// Farmer this row belongs to (a farmer row references itself)
    pub fn farmer_id(&self) -> Option<&RecordId> {
        match self {
            Record::Farmer(r) => r.id.as_ref(),
            Record::Crop(r) | Record::HighValueCrop(r) => r.farmer_id.as_ref(),
            Record::Rice(r) => r.farmer_id.as_ref(),
            Record::Livestock(r) => r.farmer_id.as_ref(),
            Record::Operator(r) => r.farmer_id.as_ref(),
        }
    }

    /// Farmer name: a farmer's display name, else the joined `farmer_name`
    pub fn farmer_name(&self) -> Option<String> {
        let joined = match self {
            Record::Farmer(r) => return r.display_name(),
            Record::Crop(r) | Record::HighValueCrop(r) => &r.farmer_name,
            Record::Rice(r) => &r.farmer_name,
            Record::Livestock(r) => &r.farmer_name,
            Record::Operator(r) => &r.farmer_name,
        };
        non_blank(joined.as_deref()).map(str::to_string)
    }

    /// Overwrite the joined farmer identity; farmer rows are left untouched
    pub fn set_identity(&mut self, farmer_name: String, barangay: String) {
        let (name_slot, barangay_slot) = match self {
            Record::Farmer(_) => return,
            Record::Crop(r) | Record::HighValueCrop(r) => (&mut r.farmer_name, &mut r.barangay),
            Record::Rice(r) => (&mut r.farmer_name, &mut r.barangay),
            Record::Livestock(r) => (&mut r.farmer_name, &mut r.barangay),
            Record::Operator(r) => (&mut r.farmer_name, &mut r.barangay),
        };
        *name_slot = Some(farmer_name);
        *barangay_slot = Some(barangay);
    }
}

/// Trimmed text, `None` if blank
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
