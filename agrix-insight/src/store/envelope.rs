//! Response envelope normalization
//!
//! List endpoints answer either with a bare array or with `{"data": [...]}`;
//! detail endpoints with the object itself or `{"data": {...}}`. Both are
//! reduced to one typed shape here so nothing downstream inspects raw
//! responses.

use super::{ListPage, StoreError};
use crate::lenient::{decode_items, type_name};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// List response body
///
/// `Bare` is listed first: a sequence must not be tried as the struct form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T = Value> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> Envelope<T> {
    pub fn into_rows(self) -> Vec<T> {
        match self {
            Envelope::Bare(rows) | Envelope::Wrapped { data: rows } => rows,
        }
    }
}

/// Decode a list body into rows, dropping rows that do not decode
pub fn decode_rows<T: DeserializeOwned>(body: Value) -> Result<ListPage<T>, StoreError> {
    let found = type_name(&body);
    let rows = serde_json::from_value::<Envelope>(body)
        .map_err(|_| StoreError::Parse(format!("expected array or {{data: array}}, found {found}")))?
        .into_rows();

    let received = rows.len();
    Ok(ListPage {
        rows: decode_items(rows),
        received,
    })
}

/// Decode a detail body, unwrapping a `data` object if present
pub fn decode_one<T: DeserializeOwned>(body: Value) -> Result<T, StoreError> {
    let inner = match body {
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };

    if !inner.is_object() {
        return Err(StoreError::Parse(format!(
            "expected object, found {}",
            type_name(&inner)
        )));
    }
    serde_json::from_value(inner).map_err(|e| StoreError::Parse(e.to_string()))
}
