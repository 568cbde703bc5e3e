//! Lenient serde field adapters for record-store payloads
//!
//! The store sends the same logical field with different JSON types across
//! record kinds and over time (`"10"` vs `10`, `"7"` vs `7` for ids). Every
//! adapter here maps an unusable value to `None` instead of failing the
//! whole record.

use crate::model::{RecordId, Scalar};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Free text; numbers and booleans are rendered, containers dropped
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Number-or-text scalar
pub fn scalar<'de, D>(deserializer: D) -> Result<Option<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_from_value(&value))
}

pub(crate) fn scalar_from_value(value: &Value) -> Option<Scalar> {
    match value {
        Value::Number(n) => n.as_f64().map(Scalar::Number),
        Value::String(s) => Some(Scalar::Text(s.clone())),
        Value::Bool(b) => Some(Scalar::Flag(*b)),
        _ => None,
    }
}

/// Record id given as integer or text
pub fn id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(RecordId::from_value(&value))
}

/// Nested array of records
///
/// Absent or `null` stays `None` (the store did not send the relation).
/// A non-array becomes an empty list. Elements that do not decode are
/// skipped with a warning.
pub fn seq<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::Array(items) => Some(decode_items(items)),
        other => {
            tracing::warn!(found = %type_name(&other), "Expected nested array, ignoring value");
            Some(Vec::new())
        }
    })
}

/// Decode each element independently, dropping the ones that fail
pub(crate) fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable row");
                None
            }
        })
        .collect();

    if decoded.len() < total {
        tracing::debug!(kept = decoded.len(), total, "Decoded rows with skips");
    }
    decoded
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
