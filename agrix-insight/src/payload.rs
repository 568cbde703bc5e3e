//! Embedded production payload
//!
//! Crop and high-value-crop rows carry a `production_data` column holding a
//! small JSON object (`crop`, `month`, `quantity`), usually as serialized
//! text. A payload that cannot be decoded is treated as empty: the row stays
//! usable with its own columns.

use crate::lenient::{scalar_from_value, type_name};
use crate::model::Scalar;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Decoded `production_data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Scalar>,
}

impl ProductionData {
    /// Decode serialized payload text; any failure yields an empty payload
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                tracing::debug!(error = %e, "Malformed production_data, treating as empty");
                Self::default()
            }
        }
    }

    /// Decode an already structured payload (or text holding one)
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            Value::String(text) => Self::parse(text),
            Value::Null => Self::default(),
            other => {
                tracing::debug!(found = type_name(other), "production_data is not an object");
                Self::default()
            }
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let crop = match map.get("crop") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Self {
            crop,
            month: map.get("month").and_then(scalar_from_value),
            quantity: map.get("quantity").and_then(scalar_from_value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.crop.is_none() && self.month.is_none() && self.quantity.is_none()
    }

    /// Crop label with surrounding whitespace removed, if non-blank
    pub fn crop_label(&self) -> Option<&str> {
        self.crop.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Calendar month (1-12) of the payload
    ///
    /// Accepts `5`, `"5"`, `"05"`, `"May"`, `"may"`, `"Sept"` and
    /// `"2023-05"`. Unrecognized values are `None`; no month is guessed.
    pub fn month_number(&self) -> Option<u32> {
        match self.month.as_ref()? {
            Scalar::Number(n) => month_from_f64(*n),
            Scalar::Text(text) => month_from_text(text),
            Scalar::Flag(_) => None,
        }
    }
}

fn month_from_f64(n: f64) -> Option<u32> {
    if n.fract() == 0.0 && (1.0..=12.0).contains(&n) {
        Some(n as u32)
    } else {
        None
    }
}

fn month_from_text(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(n) = text.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }

    // "2023-05" / "2023-05-14"
    let mut parts = text.split('-');
    if let (Some(year), Some(month)) = (parts.next(), parts.next()) {
        if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = month.parse::<u32>() {
                return (1..=12).contains(&n).then_some(n);
            }
        }
    }

    let lower = text.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(lower.as_str()))
        .map(|idx| idx as u32 + 1)
}

/// serde adapter for the `production_data` column
///
/// Absent or `null` is `None`; anything present decodes (possibly to an
/// empty payload) and never fails the row.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<ProductionData>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(ProductionData::from_value(&other)),
    })
}
