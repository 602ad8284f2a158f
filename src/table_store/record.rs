//! # Stored Records
//!
//! A row as the remote store returns it: an opaque id, an optional
//! creation timestamp and a loosely typed field map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name to value map sent to and received from the store
pub type FieldMap = Map<String, Value>;

/// One row of the remote table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Opaque row id assigned by the store
    pub id: String,

    #[serde(
        rename = "createdTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<DateTime<Utc>>,

    /// The store omits empty cells entirely
    #[serde(default)]
    pub fields: FieldMap,
}

impl StoredRecord {
    pub fn new(id: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            created_time: None,
            fields,
        }
    }

    pub fn with_created_time(mut self, created_time: DateTime<Utc>) -> Self {
        self.created_time = Some(created_time);
        self
    }

    /// Text value of a field, if present and a string
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Numeric value of a field, if present and a number
    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Value::as_f64)
    }

    /// Overwrite the given fields, leaving all others untouched.
    ///
    /// A `null` value clears the field, matching the store's PATCH semantics.
    pub fn merge(&mut self, patch: FieldMap) {
        for (key, value) in patch {
            if value.is_null() {
                self.fields.remove(&key);
            } else {
                self.fields.insert(key, value);
            }
        }
    }
}
