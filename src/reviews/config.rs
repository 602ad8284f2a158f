//! Record access configuration

use serde::{Deserialize, Serialize};

/// What to do when an ISBN lookup on update matches more than one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateIsbnPolicy {
    /// Refuse to write; report the ambiguity
    Reject,
    /// Update the first match in the store's default order
    First,
    /// Update every match
    All,
}

impl Default for DuplicateIsbnPolicy {
    fn default() -> Self {
        DuplicateIsbnPolicy::Reject
    }
}

/// Record access configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewsConfig {
    /// Page size when the caller does not ask for one (default: 10)
    #[serde(default = "default_max_records")]
    pub default_max_records: usize,

    /// Largest page a caller may ask for (default: 100, null = unbounded)
    #[serde(default = "default_max_records_cap")]
    pub max_records_cap: Option<usize>,

    #[serde(default)]
    pub duplicate_isbn_policy: DuplicateIsbnPolicy,
}

fn default_max_records() -> usize {
    10
}

fn default_max_records_cap() -> Option<usize> {
    Some(100)
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            default_max_records: default_max_records(),
            max_records_cap: default_max_records_cap(),
            duplicate_isbn_policy: DuplicateIsbnPolicy::default(),
        }
    }
}

impl ReviewsConfig {
    /// Check internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.default_max_records == 0 {
            return Err("reviews.default_max_records must be > 0".to_string());
        }
        if let Some(cap) = self.max_records_cap {
            if cap == 0 {
                return Err("reviews.max_records_cap must be > 0 or null".to_string());
            }
            if self.default_max_records > cap {
                return Err(format!(
                    "reviews.default_max_records ({}) exceeds reviews.max_records_cap ({})",
                    self.default_max_records, cap
                ));
            }
        }
        Ok(())
    }
}
