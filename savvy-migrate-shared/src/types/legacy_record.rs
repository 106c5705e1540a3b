use serde_json::{Map, Value};

use crate::errors::ExtendedJsonError;
use crate::extended_json::unwrap_value;

/// Field holding the document id in a legacy export.
pub const LEGACY_ID_FIELD: &str = "_id";

/// One document read from a legacy export file.
///
/// The fields are stored after extended-JSON unwrapping, so `{"$oid": "x"}`
/// is already the plain string `"x"` and dates are RFC 3339 strings.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyRecord {
    fields: Map<String, Value>,
}

impl LegacyRecord {
    /// Builds a record from a raw export element.
    ///
    /// Returns `Ok(None)` when the element is not a JSON object.
    pub fn from_export(value: Value) -> Result<Option<Self>, ExtendedJsonError> {
        match unwrap_value(value)? {
            Value::Object(fields) => Ok(Some(Self { fields })),
            _ => Ok(None),
        }
    }

    /// The legacy document id, if the record carries a usable one.
    pub fn legacy_id(&self) -> Option<String> {
        self.fields.get(LEGACY_ID_FIELD).and_then(legacy_id_of)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Reads a document id from either a bare string or an `{"$oid": ...}` wrapper.
///
/// Wrapped ids are normally removed during unwrapping; the wrapper branch keeps
/// this usable on raw export values too.
pub fn legacy_id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Object(map) => map.get("$oid").and_then(legacy_id_of),
        _ => None,
    }
}
