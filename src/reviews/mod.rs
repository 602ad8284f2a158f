//! # Review Record Access
//!
//! List, create and update-by-ISBN over the remote review table.

pub mod config;
pub mod errors;
pub mod model;
pub mod service;

pub use config::{DuplicateIsbnPolicy, ReviewsConfig};
pub use errors::{ReviewError, ReviewResult};
pub use model::{NewReview, Patch, ReviewRecord, ReviewUpdate, SortOrder};
pub use service::{ReviewService, UpdateOutcome};
