//! Decoded value types
//!
//! [`Value`] is the client-side rendition of a JSON document after the
//! decode hooks ran. [`Record`] is the read-only view over a JSON object.

use crate::error::{Error, Result};
use crate::pagination::Cursor;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use indexmap::{map, IndexMap};
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::ops::Index;

static NULL: Value = Value::Null;

/// A decoded JSON value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Integers, including identifiers widened from their string form
    Integer(i128),
    Float(f64),
    String(String),
    /// Timestamps from known date fields
    DateTime(DateTime<FixedOffset>),
    List(Vec<Value>),
    Record(Record),
}

impl Value {
    /// Short name of the variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_i128().and_then(|i| u64::try_from(i).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Look up a key when this value is a record
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_record().and_then(|r| r.get(key))
    }

    /// Convert back to plain JSON (timestamps as RFC 3339 strings)
    pub fn to_json(&self) -> serde_json::Value {
        // Serialization of Value never fails: keys are strings and floats
        // that are not finite become null.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Index<&str> for Value {
    type Output = Value;

    /// Missing keys and non-record values index to `Null`
    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, idx: usize) -> &Value {
        self.as_list().and_then(|l| l.get(idx)).unwrap_or(&NULL)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => {
                if let Ok(small) = i64::try_from(*i) {
                    serializer.serialize_i64(small)
                } else if let Ok(unsigned) = u64::try_from(*i) {
                    serializer.serialize_u64(unsigned)
                } else {
                    serializer.serialize_str(&i.to_string())
                }
            }
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::DateTime(dt) => {
                serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(record) => record.serialize(serializer),
        }
    }
}

// ============================================================================
// Record
// ============================================================================

/// Read-only view over a decoded JSON object
///
/// Fields keep the order the server sent them in. They are reachable by
/// key (`record["id"]`, [`Record::get`]) and by attribute-style lookup
/// ([`Record::attr`]), which fails with [`Error::FieldNotFound`] for
/// unknown names. Existing fields can never be reassigned.
///
/// The first and last records of a paginated page additionally carry the
/// cursors for the previous and next page. Cursors are hidden metadata and
/// never show up among the fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
    extra: IndexMap<String, Value>,
    next: Option<Box<Cursor>>,
    prev: Option<Box<Cursor>>,
}

impl Record {
    pub(crate) fn from_fields(fields: IndexMap<String, Value>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Attribute-style read
    pub fn attr(&self, name: &str) -> Result<&Value> {
        self.fields
            .get(name)
            .or_else(|| self.extra.get(name))
            .ok_or_else(|| Error::FieldNotFound {
                field: name.to_string(),
            })
    }

    /// Attach a client-side attribute
    ///
    /// Names that collide with a decoded field are rejected; the payload
    /// itself stays untouched and the attribute is only visible via
    /// [`Record::attr`].
    pub fn set_attr(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(Error::ReadOnly { field: name });
        }
        self.extra.insert(name, value);
        Ok(())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Cursor for the page after the one this record closes
    pub fn pagination_next(&self) -> Option<&Cursor> {
        self.next.as_deref()
    }

    /// Cursor for the page before the one this record opens
    pub fn pagination_prev(&self) -> Option<&Cursor> {
        self.prev.as_deref()
    }

    pub(crate) fn set_pagination_next(&mut self, cursor: Cursor) {
        self.next = Some(Box::new(cursor));
    }

    pub(crate) fn set_pagination_prev(&mut self, cursor: Cursor) {
        self.prev = Some(Box::new(cursor));
    }

    /// Deserialize the record's fields into a typed struct
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        let json = serde_json::to_value(self).map_err(|e| Error::Other(e.to_string()))?;
        serde_json::from_value(json).map_err(|e| Error::Other(e.to_string()))
    }
}

impl Index<&str> for Record {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&NULL)
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    fn sample() -> Record {
        let mut fields = IndexMap::new();
        fields.insert("id".to_string(), Value::Integer(7));
        fields.insert("acct".to_string(), Value::String("alice".into()));
        Record::from_fields(fields)
    }

    #[test]
    fn test_key_and_attr_access_agree() {
        let record = sample();
        assert_eq!(&record["id"], record.attr("id").unwrap());
        assert_eq!(record.get("acct").and_then(Value::as_str), Some("alice"));
    }

    #[test]
    fn test_missing_attr() {
        let record = sample();
        assert!(matches!(
            record.attr("nope"),
            Err(Error::FieldNotFound { .. })
        ));
        assert!(record["nope"].is_null());
    }

    #[test]
    fn test_existing_fields_read_only() {
        let mut record = sample();
        let err = record.set_attr("id", Value::Integer(8)).unwrap_err();
        assert!(matches!(err, Error::ReadOnly { .. }));
        assert_eq!(record["id"], Value::Integer(7));

        record.set_attr("seen", Value::Bool(true)).unwrap();
        assert_eq!(record.attr("seen").unwrap(), &Value::Bool(true));
        assert!(!record.contains_key("seen"));
    }

    #[test]
    fn test_fields_keep_server_order() {
        let value = crate::decode::decode_body(r#"{"uri": "u", "acct": "a", "id": "3", "bot": false}"#)
            .unwrap();
        let record = value.as_record().unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["uri", "acct", "id", "bot"]);
        assert_eq!(
            serde_json::to_string(record).unwrap(),
            r#"{"uri":"u","acct":"a","id":3,"bot":false}"#
        );
    }

    #[test]
    fn test_big_integer_serializes_as_number() {
        let json = Value::Integer(123_456_789_012_345_678).to_json();
        assert_eq!(json, serde_json::json!(123_456_789_012_345_678u64));
    }
}
