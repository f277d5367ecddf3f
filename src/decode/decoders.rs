//! Decode hooks
//!
//! Converts parsed JSON into [`Value`]s, applying the identifier, date and
//! record hooks to every object from the innermost outwards.

use super::types::{Record, Value};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use indexmap::IndexMap;
use std::fmt;

/// Fields whose string numerals are widened to integers
pub const ID_FIELDS: &[&str] = &[
    "id",
    "week",
    "in_reply_to_id",
    "in_reply_to_account_id",
    "logins",
    "registrations",
    "statuses",
];

/// Fields parsed into timestamps
pub const DATE_FIELDS: &[&str] = &["created_at", "week"];

/// Why a body could not be decoded
///
/// Callers wrap this into the error appropriate for their layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The body is not JSON
    Json(String),
    /// A date field holds something that is not a date
    InvalidDate { field: String, value: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Json(message) => write!(f, "invalid JSON: {message}"),
            DecodeError::InvalidDate { field, value } => {
                write!(f, "Encountered invalid date in '{field}': {value}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Parse and decode a response body
pub fn decode_body(body: &str) -> Result<Value, DecodeError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| DecodeError::Json(e.to_string()))?;
    from_json(json)
}

/// Decode an already parsed JSON document
pub fn from_json(json: serde_json::Value) -> Result<Value, DecodeError> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => number(&n),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::List(
            items
                .into_iter()
                .map(from_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_json::Value::Object(map) => {
            let mut fields = IndexMap::new();
            for (key, value) in map {
                fields.insert(key, from_json(value)?);
            }
            widen_ids(&mut fields);
            parse_dates(&mut fields)?;
            Value::Record(Record::from_fields(fields))
        }
    })
}

fn number(n: &serde_json::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Integer(i128::from(i))
    } else if let Some(u) = n.as_u64() {
        Value::Integer(i128::from(u))
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn widen_ids(fields: &mut IndexMap<String, Value>) {
    for key in ID_FIELDS {
        if let Some(slot) = fields.get_mut(*key) {
            if let Value::String(s) = slot {
                // Non-numeric strings stay as they are.
                if let Ok(widened) = s.trim().parse::<i128>() {
                    *slot = Value::Integer(widened);
                }
            }
        }
    }
}

fn parse_dates(fields: &mut IndexMap<String, Value>) -> Result<(), DecodeError> {
    for key in DATE_FIELDS {
        let Some(slot) = fields.get_mut(*key) else {
            continue;
        };
        let parsed = match slot {
            Value::Null | Value::DateTime(_) => continue,
            Value::Integer(secs) => i64::try_from(*secs)
                .ok()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                .map(|dt| dt.fixed_offset()),
            Value::String(s) => parse_date_string(s),
            _ => None,
        };
        match parsed {
            Some(dt) => *slot = Value::DateTime(dt),
            None => {
                return Err(DecodeError::InvalidDate {
                    field: (*key).to_string(),
                    value: format!("{slot:?}"),
                })
            }
        }
    }
    Ok(())
}

/// Parse the date formats the API is known to emit
fn parse_date_string(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive).fixed_offset());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
}
