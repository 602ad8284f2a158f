//! # Remote Table Store
//!
//! The seam between record access and the hosted table service.
//! `AirtableStore` talks to the real API; `MemoryTableStore` mirrors its
//! list/create/update semantics in process for tests.

pub mod airtable;
pub mod errors;
pub mod memory;
pub mod query;
pub mod record;

use std::future::Future;
use std::pin::Pin;

pub use airtable::{AirtableSettings, AirtableStore, DEFAULT_API_URL, PAGE_SIZE};
pub use errors::{StoreError, StoreResult};
pub use memory::{MemoryTableStore, StoreCalls};
pub use query::{FieldEquals, ListQuery, SortDirection, SortSpec};
pub use record::{FieldMap, StoredRecord};

/// Boxed future returned by every store primitive
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Primitives offered by a remote table store
pub trait TableStore: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// List records matching the query, in the order the query asks for
    /// (store-default order when no sort is given)
    fn list(&self, query: ListQuery) -> StoreFuture<'_, Vec<StoredRecord>>;

    /// Insert one record
    fn create(&self, fields: FieldMap) -> StoreFuture<'_, StoredRecord>;

    /// Partially update one record by row id; fields not named are untouched
    fn update<'a>(&'a self, record_id: &'a str, fields: FieldMap)
        -> StoreFuture<'a, StoredRecord>;
}
