//! # Review Model
//!
//! Typed view over the loosely typed rows of the remote table.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::table_store::{FieldMap, SortSpec, StoredRecord};

/// Remote column holding the book title
pub const TITLE_FIELD: &str = "Books";
/// Remote column holding the ISBN, the lookup key for updates
pub const ISBN_FIELD: &str = "ISBN";
/// Remote column holding the numeric rating
pub const RATING_FIELD: &str = "Rating";
/// Remote column holding free-form notes
pub const NOTES_FIELD: &str = "Notes";

/// Requested ordering of a review listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Sort on the rating column in this direction
    pub fn by_rating(self) -> SortSpec {
        match self {
            SortOrder::Ascending => SortSpec::ascending(RATING_FIELD),
            SortOrder::Descending => SortSpec::descending(RATING_FIELD),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Ascending),
            "DESC" => Ok(SortOrder::Descending),
            _ => Err(format!("sort must be ASC or DESC, got '{}'", s)),
        }
    }
}

/// Tri-state optional input.
///
/// Deserialized with `#[serde(default)]`: a missing key is `Absent`, an
/// explicit `null` is `Null`, anything else is `Value`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// A review to insert
///
/// The ISBN is optional only for the bare `/add-record` path; reviews
/// created without one can never be found by update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub title: String,
    pub isbn: Option<String>,
    pub rating: f64,
    pub notes: Option<String>,
}

impl NewReview {
    pub fn new(title: impl Into<String>, rating: f64) -> Self {
        Self {
            title: title.into(),
            isbn: None,
            rating,
            notes: None,
        }
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Field set sent to the store. Absent optional fields are not sent.
    pub fn into_fields(self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert(TITLE_FIELD.to_string(), Value::String(self.title));
        if let Some(isbn) = self.isbn {
            fields.insert(ISBN_FIELD.to_string(), Value::String(isbn));
        }
        fields.insert(RATING_FIELD.to_string(), rating_value(self.rating));
        if let Some(notes) = self.notes {
            fields.insert(NOTES_FIELD.to_string(), Value::String(notes));
        }
        fields
    }
}

/// A rating change addressed by ISBN
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewUpdate {
    pub isbn: String,
    pub rating: f64,
    pub notes: Patch<String>,
}

impl ReviewUpdate {
    pub fn new(isbn: impl Into<String>, rating: f64) -> Self {
        Self {
            isbn: isbn.into(),
            rating,
            notes: Patch::Absent,
        }
    }

    pub fn with_notes(mut self, notes: Patch<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Partial field set: rating always, notes per its patch state
    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert(RATING_FIELD.to_string(), rating_value(self.rating));
        match &self.notes {
            Patch::Absent => {}
            Patch::Null => {
                fields.insert(NOTES_FIELD.to_string(), Value::Null);
            }
            Patch::Value(notes) => {
                fields.insert(NOTES_FIELD.to_string(), Value::String(notes.clone()));
            }
        }
        fields
    }
}

/// Whole numbers go over the wire as integers, everything else as floats
fn rating_value(rating: f64) -> Value {
    if rating.fract() == 0.0 && rating.abs() < i64::MAX as f64 {
        Value::from(rating as i64)
    } else {
        serde_json::Number::from_f64(rating)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// A stored review as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRecord {
    pub id: String,

    #[serde(rename = "createdTime", skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,

    #[serde(rename = "Books", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "ISBN", skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,

    #[serde(rename = "Rating", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(rename = "Notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<StoredRecord> for ReviewRecord {
    fn from(record: StoredRecord) -> Self {
        Self {
            title: record.text(TITLE_FIELD).map(str::to_string),
            isbn: record.text(ISBN_FIELD).map(str::to_string),
            rating: record.number(RATING_FIELD),
            notes: record.text(NOTES_FIELD).map(str::to_string),
            created_time: record.created_time,
            id: record.id,
        }
    }
}
