//! Persisted query document
//!
//! The on-disk / on-wire form of a search configuration: a bool query of
//! function-score clauses. It is kept as untyped JSON because persisted
//! documents are allowed to be partial or written by other tools, and
//! reading them must degrade rather than fail.

use itemmap_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A hybrid search query document. Always a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct QueryDocument(Map<String, Value>);

impl QueryDocument {
    /// An empty document (`{}`)
    pub fn empty() -> Self {
        Self(Map::new())
    }

    /// Parse document text.
    ///
    /// A JSON string whose content is itself a JSON object is unwrapped,
    /// since documents have been persisted double-encoded.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        match value {
            Value::String(inner) => Self::from_json_str(&inner),
            other => Self::try_from(other),
        }
    }

    /// Wrap an already-built JSON object
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    #[inline]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Clauses in `query.bool.<bucket>`, empty when any level is missing
    pub fn clauses(&self, bucket: &str) -> &[Value] {
        self.0
            .get("query")
            .and_then(|q| q.get("bool"))
            .and_then(|b| b.get(bucket))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mutable clause list in `query.bool.<bucket>`, if present
    pub fn clauses_mut(&mut self, bucket: &str) -> Option<&mut Vec<Value>> {
        self.0
            .get_mut("query")
            .and_then(|q| q.get_mut("bool"))
            .and_then(|b| b.get_mut(bucket))
            .and_then(Value::as_array_mut)
    }

    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl Default for QueryDocument {
    fn default() -> Self {
        Self::empty()
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl TryFrom<Value> for QueryDocument {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::NotAnObject(value_type(&other))),
        }
    }
}

impl From<QueryDocument> for Value {
    fn from(doc: QueryDocument) -> Self {
        doc.into_value()
    }
}

impl FromStr for QueryDocument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json_str(s)
    }
}

impl fmt::Display for QueryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}
