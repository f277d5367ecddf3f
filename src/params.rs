//! Parameter normalization
//!
//! Turns the named arguments of an API call into wire-ready key/value
//! pairs: absent values are dropped, lists expand to repeated `name[]`
//! pairs, and entity references collapse to bare identifiers.

use crate::decode::{Record, Value};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl ParamValue {
    fn render(&self) -> String {
        match self {
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Str(s) => s.clone(),
            ParamValue::List(items) => items.join(","),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Id> for ParamValue {
    fn from(value: Id) -> Self {
        Self::Str(value.0)
    }
}

impl From<Vec<Id>> for ParamValue {
    fn from(value: Vec<Id>) -> Self {
        Self::List(value.into_iter().map(|id| id.0).collect())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Normalized parameters for one request, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a parameter only when a value is present
    #[must_use]
    pub fn set_opt<V: Into<ParamValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Set a boolean parameter only when it is true
    ///
    /// Several endpoints treat any presence of a flag as "on".
    #[must_use]
    pub fn flag(mut self, key: impl Into<String>, value: bool) -> Self {
        if value {
            self.insert(key, true);
        }
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Wire form: list values become one `name[]` pair per element
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.0.len());
        for (key, value) in &self.0 {
            match value {
                ParamValue::List(items) => {
                    let name = format!("{key}[]");
                    for item in items {
                        pairs.push((name.clone(), item.clone()));
                    }
                }
                other => pairs.push((key.clone(), other.render())),
            }
        }
        pairs
    }
}

/// Parameters whose values never appear in logs
const REDACTED: &[&str] = &["password", "client_secret", "refresh_token", "code"];

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|(k, v)| {
                if REDACTED.contains(&k.as_str()) {
                    format!("{k}=<redacted>")
                } else {
                    format!("{k}={}", v.render())
                }
            })
            .collect();
        write!(f, "{{{}}}", rendered.join(", "))
    }
}

// ============================================================================
// Entity identifiers
// ============================================================================

/// A bare entity identifier as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that names an entity: a raw id or a decoded record carrying one
pub trait IntoId {
    fn into_id(self) -> Result<Id>;
}

impl IntoId for Id {
    fn into_id(self) -> Result<Id> {
        Ok(self)
    }
}

impl IntoId for &Id {
    fn into_id(self) -> Result<Id> {
        Ok(self.clone())
    }
}

impl IntoId for u64 {
    fn into_id(self) -> Result<Id> {
        Ok(Id(self.to_string()))
    }
}

impl IntoId for i64 {
    fn into_id(self) -> Result<Id> {
        Ok(Id(self.to_string()))
    }
}

impl IntoId for i128 {
    fn into_id(self) -> Result<Id> {
        Ok(Id(self.to_string()))
    }
}

impl IntoId for &str {
    fn into_id(self) -> Result<Id> {
        Ok(Id(self.to_string()))
    }
}

impl IntoId for String {
    fn into_id(self) -> Result<Id> {
        Ok(Id(self))
    }
}

impl IntoId for &Record {
    fn into_id(self) -> Result<Id> {
        match self.get("id") {
            Some(value) => value_to_id(value),
            None => Err(Error::illegal_argument("record has no 'id' field")),
        }
    }
}

impl IntoId for &Value {
    fn into_id(self) -> Result<Id> {
        match self {
            Value::Record(record) => record.into_id(),
            other => value_to_id(other),
        }
    }
}

fn value_to_id(value: &Value) -> Result<Id> {
    match value {
        Value::Integer(i) => Ok(Id(i.to_string())),
        Value::String(s) => Ok(Id(s.clone())),
        other => Err(Error::illegal_argument(format!(
            "cannot use {} as an id",
            other.kind()
        ))),
    }
}

/// Unpack a list of entity references
pub fn ids<I, T>(items: I) -> Result<Vec<Id>>
where
    I: IntoIterator<Item = T>,
    T: IntoId,
{
    items.into_iter().map(IntoId::into_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_absent_values_dropped() {
        let params = Params::new()
            .set("limit", 20u32)
            .set_opt::<String>("max_id", None)
            .set_opt("since_id", Some("5"));

        assert_eq!(params.len(), 2);
        assert!(!params.contains("max_id"));
        assert_eq!(params.get("since_id"), Some(&ParamValue::Str("5".into())));
    }

    #[test]
    fn test_false_flags_omitted() {
        let params = Params::new().flag("local", false).flag("pinned", true);
        assert!(!params.contains("local"));
        assert_eq!(params.get("pinned"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn test_lists_expand_with_brackets() {
        let params = Params::new()
            .set("status", "hi")
            .set("media_ids", vec![Id::new("1"), Id::new("2")]);

        assert_eq!(
            params.to_pairs(),
            vec![
                ("media_ids[]".to_string(), "1".to_string()),
                ("media_ids[]".to_string(), "2".to_string()),
                ("status".to_string(), "hi".to_string()),
            ]
        );
    }

    #[test]
    fn test_display_redacts_secrets() {
        let params = Params::new()
            .set("grant_type", "password")
            .set("username", "me@example.social")
            .set("password", "hunter2")
            .set("client_secret", "shh")
            .set("refresh_token", "refresh-me");

        let shown = params.to_string();
        assert!(shown.contains("username=me@example.social"));
        assert!(shown.contains("password=<redacted>"));
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("shh"));
        assert!(!shown.contains("refresh-me"));
        // The wire form is untouched.
        assert!(params.to_pairs().contains(&("password".to_string(), "hunter2".to_string())));
    }

    #[test]
    fn test_record_unwraps_to_id() {
        let value = decode::from_json(json!({"id": "109", "type": "image"})).unwrap();
        let record = value.as_record().unwrap();
        assert_eq!(record.into_id().unwrap(), Id::new("109"));
        assert_eq!((&value).into_id().unwrap(), Id::new("109"));
    }

    #[test]
    fn test_record_without_id_rejected() {
        let value = decode::from_json(json!({"url": "https://x"})).unwrap();
        let err = value.as_record().unwrap().into_id().unwrap_err();
        assert!(matches!(err, Error::IllegalArgument { .. }));
    }

    #[test]
    fn test_ids_mixed_sources() {
        let unpacked = ids(vec!["1", "2"]).unwrap();
        assert_eq!(unpacked, vec![Id::new("1"), Id::new("2")]);
        assert_eq!(42u64.into_id().unwrap().as_str(), "42");
    }
}
