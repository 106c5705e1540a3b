use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::errors::ExtendedJsonError;
use crate::extended_json::{millis_to_date, parse_date};
use crate::types::ColumnKind;

/// A typed, nullable column value ready to be bound into an insert.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Float(Option<f64>),
    Boolean(Option<bool>),
    Timestamp(Option<DateTime<Utc>>),
    Json(Option<Value>),
}

impl ColumnValue {
    /// The NULL value of the given kind.
    pub fn null(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Text => ColumnValue::Text(None),
            ColumnKind::Integer => ColumnValue::Integer(None),
            ColumnKind::Float => ColumnValue::Float(None),
            ColumnKind::Boolean => ColumnValue::Boolean(None),
            ColumnKind::Timestamp => ColumnValue::Timestamp(None),
            ColumnKind::Json => ColumnValue::Json(None),
        }
    }

    /// Coerces an unwrapped legacy value into the column's kind.
    ///
    /// Legacy documents are loosely typed, so numbers stored as strings and
    /// dates stored as epoch milliseconds are accepted. Anything that cannot be
    /// coerced is an error; a missing field or JSON `null` becomes NULL.
    pub fn from_legacy(
        column: &str,
        kind: ColumnKind,
        value: Option<&Value>,
    ) -> Result<Self, ExtendedJsonError> {
        let value = match value {
            None | Some(Value::Null) => return Ok(Self::null(kind)),
            Some(value) => value,
        };

        let coerced = match (kind, value) {
            (ColumnKind::Text, Value::String(s)) => Some(ColumnValue::Text(Some(s.clone()))),
            (ColumnKind::Text, Value::Number(n)) => Some(ColumnValue::Text(Some(n.to_string()))),
            (ColumnKind::Text, Value::Bool(b)) => Some(ColumnValue::Text(Some(b.to_string()))),

            (ColumnKind::Integer, Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(whole_f64_to_i64))
                .map(|i| ColumnValue::Integer(Some(i))),
            (ColumnKind::Integer, Value::String(s)) => {
                s.trim().parse::<i64>().ok().map(|i| ColumnValue::Integer(Some(i)))
            }

            (ColumnKind::Float, Value::Number(n)) => n.as_f64().map(|f| ColumnValue::Float(Some(f))),
            (ColumnKind::Float, Value::String(s)) => {
                s.trim().parse::<f64>().ok().map(|f| ColumnValue::Float(Some(f)))
            }

            (ColumnKind::Boolean, Value::Bool(b)) => Some(ColumnValue::Boolean(Some(*b))),
            (ColumnKind::Boolean, Value::String(s)) => match s.trim() {
                "true" => Some(ColumnValue::Boolean(Some(true))),
                "false" => Some(ColumnValue::Boolean(Some(false))),
                _ => None,
            },

            (ColumnKind::Timestamp, Value::String(s)) => {
                Some(ColumnValue::Timestamp(Some(parse_date(s)?)))
            }
            (ColumnKind::Timestamp, Value::Number(n)) => n
                .as_i64()
                .and_then(millis_to_date)
                .map(|date| ColumnValue::Timestamp(Some(date))),

            (ColumnKind::Json, other) => Some(ColumnValue::Json(Some(other.clone()))),

            _ => None,
        };

        coerced.ok_or_else(|| ExtendedJsonError::ColumnTypeMismatch {
            column: column.to_string(),
            expected: kind.to_string(),
            found: json_type_name(value).to_string(),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            ColumnValue::Text(None)
                | ColumnValue::Integer(None)
                | ColumnValue::Float(None)
                | ColumnValue::Boolean(None)
                | ColumnValue::Timestamp(None)
                | ColumnValue::Json(None)
        )
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(Some(s)) => Some(s),
            _ => None,
        }
    }
}

/// Accepts whole floats inside the i64 range; `as` would saturate outside it.
fn whole_f64_to_i64(f: f64) -> Option<i64> {
    let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&f);
    (in_range && f.fract() == 0.0).then_some(f as i64)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Column/value pairs for one relational insert. The id column is never part
/// of a row: the target store generates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRow {
    pub values: Vec<(&'static str, ColumnValue)>,
}

impl NewRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: &'static str, value: ColumnValue) {
        self.values.push((column, value));
    }

    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
