//! MongoDB extended-JSON normalisation.
//!
//! Export files produced by `mongoexport` wrap object ids, dates and some
//! numbers in single-key objects (`{"$oid": ...}`, `{"$date": ...}`,
//! `{"$numberLong": ...}`). [`unwrap_value`] walks a JSON tree and replaces
//! every wrapper with its plain representation:
//!
//! - `$oid` becomes the id string
//! - `$date` becomes an RFC 3339 string in UTC with millisecond precision
//! - `$numberInt` / `$numberLong` become JSON integers
//! - `$numberDouble` / `$numberDecimal` become JSON floats; `NaN` and the
//!   infinities have no JSON form and become `null`
//!
//! Objects of any other shape are unwrapped recursively and otherwise left intact.
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Number, Value};

use crate::errors::ExtendedJsonError;

const OID: &str = "$oid";
const DATE: &str = "$date";
const NUMBER_INT: &str = "$numberInt";
const NUMBER_LONG: &str = "$numberLong";
const NUMBER_DOUBLE: &str = "$numberDouble";
const NUMBER_DECIMAL: &str = "$numberDecimal";

/// Recursively replaces extended-JSON wrappers with plain JSON values.
///
/// # Errors
///
/// Returns an `ExtendedJsonError` when a wrapper is present but its payload
/// cannot be interpreted (an unparsable date, a non-numeric `$numberLong`, ...).
pub fn unwrap_value(value: Value) -> Result<Value, ExtendedJsonError> {
    match value {
        Value::Object(map) => unwrap_object(map),
        Value::Array(items) => items
            .into_iter()
            .map(unwrap_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other),
    }
}

fn unwrap_object(map: Map<String, Value>) -> Result<Value, ExtendedJsonError> {
    if map.len() == 1 {
        if let Some((key, inner)) = map.iter().next() {
            match key.as_str() {
                OID => return unwrap_oid(inner).map(Value::String),
                DATE => return unwrap_date(inner).map(|date| Value::String(format_date(&date))),
                NUMBER_INT | NUMBER_LONG => return unwrap_integer(key, inner),
                NUMBER_DOUBLE | NUMBER_DECIMAL => return unwrap_float(key, inner),
                _ => {}
            }
        }
    }

    let mut unwrapped = Map::with_capacity(map.len());
    for (key, inner) in map {
        unwrapped.insert(key, unwrap_value(inner)?);
    }
    Ok(Value::Object(unwrapped))
}

fn unwrap_oid(inner: &Value) -> Result<String, ExtendedJsonError> {
    match inner {
        Value::String(id) if !id.is_empty() => Ok(id.clone()),
        other => Err(ExtendedJsonError::InvalidObjectId(other.to_string())),
    }
}

fn unwrap_date(inner: &Value) -> Result<DateTime<Utc>, ExtendedJsonError> {
    match inner {
        Value::String(raw) => parse_date(raw),
        Value::Number(number) => number
            .as_i64()
            .and_then(millis_to_date)
            .ok_or_else(|| ExtendedJsonError::InvalidDate(number.to_string())),
        Value::Object(nested) => match nested.get(NUMBER_LONG) {
            Some(Value::String(raw)) if nested.len() == 1 => raw
                .parse::<i64>()
                .ok()
                .and_then(millis_to_date)
                .ok_or_else(|| ExtendedJsonError::InvalidDate(raw.clone())),
            _ => Err(ExtendedJsonError::InvalidDate(inner.to_string())),
        },
        other => Err(ExtendedJsonError::InvalidDate(other.to_string())),
    }
}

fn unwrap_integer(wrapper: &str, inner: &Value) -> Result<Value, ExtendedJsonError> {
    let parsed = match inner {
        Value::String(raw) => raw.parse::<i64>().ok(),
        Value::Number(number) => number.as_i64(),
        _ => None,
    };

    parsed
        .map(|n| Value::Number(n.into()))
        .ok_or_else(|| invalid_number(wrapper, inner))
}

fn unwrap_float(wrapper: &str, inner: &Value) -> Result<Value, ExtendedJsonError> {
    let parsed = match inner {
        Value::String(raw) => raw.parse::<f64>().ok(),
        Value::Number(number) => number.as_f64(),
        _ => None,
    };

    match parsed {
        Some(f) if !f.is_finite() => Ok(Value::Null),
        Some(f) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| invalid_number(wrapper, inner)),
        None => Err(invalid_number(wrapper, inner)),
    }
}

fn invalid_number(wrapper: &str, inner: &Value) -> ExtendedJsonError {
    ExtendedJsonError::InvalidNumber {
        wrapper: wrapper.to_string(),
        value: inner.to_string(),
    }
}

/// Parses an RFC 3339 timestamp into UTC.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, ExtendedJsonError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|_| ExtendedJsonError::InvalidDate(raw.to_string()))
}

/// Converts epoch milliseconds into a UTC timestamp.
pub fn millis_to_date(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Canonical textual form used for unwrapped `$date` values.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}
