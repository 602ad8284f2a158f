//! In-memory table store
//!
//! Applies filter, sort and bound the way the remote store does and counts
//! calls so tests can assert that no write (or no call at all) happened.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::query::ListQuery;
use super::record::{FieldMap, StoredRecord};
use super::{StoreFuture, TableStore};

/// Number of calls made per primitive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub list: usize,
    pub create: usize,
    pub update: usize,
}

impl StoreCalls {
    pub fn total(&self) -> usize {
        self.list + self.create + self.update
    }

    pub fn writes(&self) -> usize {
        self.create + self.update
    }
}

/// Table store held in process memory
#[derive(Default)]
pub struct MemoryTableStore {
    records: RwLock<Vec<StoredRecord>>,
    failure: Mutex<Option<StoreError>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing rows; ids are kept as given
    pub fn with_records(records: Vec<StoredRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Self::default()
        }
    }

    /// Make every subsequent call fail with `error` until cleared
    pub fn fail_with(&self, error: StoreError) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(error);
        }
    }

    pub fn clear_failure(&self) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = None;
        }
    }

    /// Copy of every row in insertion order
    pub fn snapshot(&self) -> Vec<StoredRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            list: self.list_calls.load(Ordering::SeqCst),
            create: self.create_calls.load(Ordering::SeqCst),
            update: self.update_calls.load(Ordering::SeqCst),
        }
    }

    fn check_failure(&self) -> StoreResult<()> {
        let failure = self
            .failure
            .lock()
            .map_err(|_| StoreError::Internal("Lock poisoned".to_string()))?;
        match failure.as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn list_sync(&self, query: &ListQuery) -> StoreResult<Vec<StoredRecord>> {
        self.check_failure()?;

        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Internal("Lock poisoned".to_string()))?;

        let mut matched: Vec<StoredRecord> = records
            .iter()
            .filter(|r| query.filter.as_ref().map_or(true, |f| f.matches(&r.fields)))
            .cloned()
            .collect();

        if let Some(sort) = &query.sort {
            // Stable, so ties keep insertion order
            matched.sort_by(|a, b| sort.compare(a, b));
        }

        if let Some(max) = query.max_records {
            matched.truncate(max);
        }

        Ok(matched)
    }

    fn create_sync(&self, fields: FieldMap) -> StoreResult<StoredRecord> {
        self.check_failure()?;

        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Internal("Lock poisoned".to_string()))?;

        // Empty cells are never stored
        let fields = fields.into_iter().filter(|(_, v)| !v.is_null()).collect();

        let id = format!("rec{}", &Uuid::new_v4().simple().to_string()[..14]);
        let record = StoredRecord::new(id, fields).with_created_time(Utc::now());
        records.push(record.clone());
        Ok(record)
    }

    fn update_sync(&self, record_id: &str, fields: FieldMap) -> StoreResult<StoredRecord> {
        self.check_failure()?;

        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Internal("Lock poisoned".to_string()))?;

        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| StoreError::api(404, "NOT_FOUND", format!("Record {} not found", record_id)))?;

        record.merge(fields);
        Ok(record.clone())
    }
}

impl TableStore for MemoryTableStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn list(&self, query: ListQuery) -> StoreFuture<'_, Vec<StoredRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { self.list_sync(&query) })
    }

    fn create(&self, fields: FieldMap) -> StoreFuture<'_, StoredRecord> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { self.create_sync(fields) })
    }

    fn update<'a>(
        &'a self,
        record_id: &'a str,
        fields: FieldMap,
    ) -> StoreFuture<'a, StoredRecord> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { self.update_sync(record_id, fields) })
    }
}
