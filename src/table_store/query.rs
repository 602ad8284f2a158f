//! # List Queries
//!
//! Structured description of a list call: an optional equality filter,
//! an optional single-field sort and an optional record bound.

use std::cmp::Ordering;

use serde_json::Value;

use super::record::{FieldMap, StoredRecord};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Wire representation used by the remote store
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Sort by a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Compare two records on the sort field.
    ///
    /// Records missing the field (or holding a non-numeric, non-string
    /// value) sort before everything else in ascending order.
    pub fn compare(&self, a: &StoredRecord, b: &StoredRecord) -> Ordering {
        let cmp = compare_values(a.fields.get(&self.field), b.fields.get(&self.field));
        match self.direction {
            SortDirection::Ascending => cmp,
            SortDirection::Descending => cmp.reverse(),
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let a = a.as_f64().unwrap_or(0.0);
            let b = b.as_f64().unwrap_or(0.0);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Null) | None, Some(Value::Null) | None) => Ordering::Equal,
        (Some(Value::Null) | None, Some(_)) => Ordering::Less,
        (Some(_), Some(Value::Null) | None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Equality filter on a single text field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEquals {
    pub field: String,
    pub value: String,
}

impl FieldEquals {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Render as a remote formula, e.g. `{ISBN} = '978\'0'`.
    ///
    /// Backslashes and single quotes in the value are escaped so caller
    /// input cannot terminate the string literal.
    pub fn to_formula(&self) -> String {
        let mut escaped = String::with_capacity(self.value.len());
        for c in self.value.chars() {
            match c {
                '\\' => escaped.push_str("\\\\"),
                '\'' => escaped.push_str("\\'"),
                c => escaped.push(c),
            }
        }
        format!("{{{}}} = '{}'", self.field, escaped)
    }

    /// Evaluate against a record's fields
    pub fn matches(&self, fields: &FieldMap) -> bool {
        match fields.get(&self.field) {
            Some(Value::String(s)) => s == &self.value,
            Some(Value::Number(n)) => n.to_string() == self.value,
            _ => false,
        }
    }
}

/// Parameters of a single list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: Option<FieldEquals>,
    pub sort: Option<SortSpec>,
    /// Upper bound on returned records; `None` fetches everything
    pub max_records: Option<usize>,
}

impl ListQuery {
    /// Every record, store-default order
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filtered(mut self, filter: FieldEquals) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sorted(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, max_records: usize) -> Self {
        self.max_records = Some(max_records);
        self
    }
}
