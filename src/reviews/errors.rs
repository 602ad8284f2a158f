//! # Review Errors

use thiserror::Error;

use crate::table_store::StoreError;

/// Result type for review operations
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Errors raised by record access
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReviewError {
    /// Caller input rejected before any remote call
    #[error("Invalid review input: {0}")]
    Invalid(String),

    /// Requested page larger than the configured cap
    #[error("max_records {0} exceeds maximum {1}")]
    LimitExceeded(usize, usize),

    /// ISBN is not unique and the policy forbids picking one
    #[error("ISBN {isbn} matches {matches} reviews")]
    AmbiguousIsbn { isbn: String, matches: usize },

    /// Remote store failure, propagated unchanged
    #[error(transparent)]
    Store(#[from] StoreError),
}
