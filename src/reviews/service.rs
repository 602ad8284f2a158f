//! Record access over an injected table store

use std::sync::Arc;

use crate::observability::Logger;
use crate::table_store::{FieldEquals, ListQuery, TableStore};

use super::config::{DuplicateIsbnPolicy, ReviewsConfig};
use super::errors::{ReviewError, ReviewResult};
use super::model::{NewReview, ReviewRecord, ReviewUpdate, SortOrder, ISBN_FIELD};

/// Result of an update addressed by ISBN
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// No row carries the ISBN; nothing was written
    NotFound,
    /// The rows as the store returned them after the write
    Updated(Vec<ReviewRecord>),
}

/// Review operations. One instance per process, shared across requests.
pub struct ReviewService {
    store: Arc<dyn TableStore>,
    config: ReviewsConfig,
}

impl ReviewService {
    pub fn new(store: Arc<dyn TableStore>, config: ReviewsConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ReviewsConfig {
        &self.config
    }

    /// Apply the default page size and enforce the configured cap
    pub fn resolve_limit(&self, requested: Option<usize>) -> ReviewResult<usize> {
        let limit = requested.unwrap_or(self.config.default_max_records);
        match self.config.max_records_cap {
            Some(cap) if limit > cap => Err(ReviewError::LimitExceeded(limit, cap)),
            _ => Ok(limit),
        }
    }

    /// List reviews.
    ///
    /// Unsorted: the store returns at most `max_records` rows in its own
    /// order. Sorted: every row is fetched sorted by rating, then the result
    /// is cut to `max_records` locally.
    pub async fn list(
        &self,
        sort: Option<SortOrder>,
        max_records: Option<usize>,
    ) -> ReviewResult<Vec<ReviewRecord>> {
        let limit = self.resolve_limit(max_records)?;

        let records = match sort {
            None => self.store.list(ListQuery::all().limit(limit)).await?,
            Some(order) => {
                let mut records = self
                    .store
                    .list(ListQuery::all().sorted(order.by_rating()))
                    .await?;
                records.truncate(limit);
                records
            }
        };

        Ok(records.into_iter().map(ReviewRecord::from).collect())
    }

    /// Insert one review
    pub async fn create(&self, review: NewReview) -> ReviewResult<ReviewRecord> {
        if !review.rating.is_finite() {
            return Err(ReviewError::Invalid("rating must be a finite number".to_string()));
        }

        let isbn = review.isbn.clone().unwrap_or_default();
        let record = self.store.create(review.into_fields()).await?;

        Logger::info(
            "REVIEW_CREATED",
            &[("isbn", isbn.as_str()), ("record_id", record.id.as_str())],
        );
        Ok(ReviewRecord::from(record))
    }

    /// Every review carrying the ISBN, in store order
    pub async fn find_by_isbn(&self, isbn: &str) -> ReviewResult<Vec<ReviewRecord>> {
        let query = ListQuery::all().filtered(FieldEquals::new(ISBN_FIELD, isbn));
        let records = self.store.list(query).await?;
        Ok(records.into_iter().map(ReviewRecord::from).collect())
    }

    /// Look up reviews by ISBN and update rating (and notes per the patch).
    ///
    /// Which matches are written is decided by `duplicate_isbn_policy`.
    pub async fn find_and_update(&self, update: ReviewUpdate) -> ReviewResult<UpdateOutcome> {
        if update.isbn.trim().is_empty() {
            return Err(ReviewError::Invalid("ISBN must not be empty".to_string()));
        }
        if !update.rating.is_finite() {
            return Err(ReviewError::Invalid("rating must be a finite number".to_string()));
        }

        let matches = self.find_by_isbn(&update.isbn).await?;

        let targets: Vec<ReviewRecord> = match (matches.len(), self.config.duplicate_isbn_policy) {
            (0, _) => {
                Logger::warn("REVIEW_UPDATE_NOT_FOUND", &[("isbn", update.isbn.as_str())]);
                return Ok(UpdateOutcome::NotFound);
            }
            (1, _) | (_, DuplicateIsbnPolicy::All) => matches,
            (_, DuplicateIsbnPolicy::First) => matches.into_iter().take(1).collect(),
            (n, DuplicateIsbnPolicy::Reject) => {
                let count = n.to_string();
                Logger::warn(
                    "REVIEW_UPDATE_AMBIGUOUS",
                    &[("isbn", update.isbn.as_str()), ("matches", count.as_str())],
                );
                return Err(ReviewError::AmbiguousIsbn {
                    isbn: update.isbn,
                    matches: n,
                });
            }
        };

        let fields = update.to_fields();
        let mut updated = Vec::with_capacity(targets.len());
        for target in &targets {
            let record = self.store.update(&target.id, fields.clone()).await?;
            Logger::info(
                "REVIEW_UPDATED",
                &[("isbn", update.isbn.as_str()), ("record_id", record.id.as_str())],
            );
            updated.push(ReviewRecord::from(record));
        }

        Ok(UpdateOutcome::Updated(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::model::Patch;
    use crate::table_store::{FieldMap, MemoryTableStore, StoreError, StoredRecord};
    use serde_json::{json, Value};

    fn fields(value: Value) -> FieldMap {
        value.as_object().cloned().unwrap()
    }

    fn service_with(records: Vec<StoredRecord>, config: ReviewsConfig) -> (Arc<MemoryTableStore>, ReviewService) {
        let store = Arc::new(MemoryTableStore::with_records(records));
        let service = ReviewService::new(store.clone(), config);
        (store, service)
    }

    fn library() -> Vec<StoredRecord> {
        vec![
            StoredRecord::new("rec1", fields(json!({"Books": "Emma", "ISBN": "111", "Rating": 3}))),
            StoredRecord::new("rec2", fields(json!({"Books": "Dune", "ISBN": "222", "Rating": 5, "Notes": "spice"}))),
            StoredRecord::new("rec3", fields(json!({"Books": "Ulysses", "ISBN": "333", "Rating": 1}))),
        ]
    }

    #[test]
    fn test_resolve_limit() {
        let (_, service) = service_with(vec![], ReviewsConfig::default());
        assert_eq!(service.resolve_limit(None).unwrap(), 10);
        assert_eq!(service.resolve_limit(Some(100)).unwrap(), 100);
        assert_eq!(
            service.resolve_limit(Some(101)),
            Err(ReviewError::LimitExceeded(101, 100))
        );
    }

    #[test]
    fn test_resolve_limit_unbounded() {
        let config = ReviewsConfig {
            max_records_cap: None,
            ..Default::default()
        };
        let (_, service) = service_with(vec![], config);
        assert_eq!(service.resolve_limit(Some(1_000_000)).unwrap(), 1_000_000);
    }

    #[tokio::test]
    async fn test_list_sorted_truncates_locally() {
        let (store, service) = service_with(library(), ReviewsConfig::default());

        let reviews = service.list(Some(SortOrder::Ascending), Some(2)).await.unwrap();
        let ratings: Vec<_> = reviews.iter().filter_map(|r| r.rating).collect();
        assert_eq!(ratings, vec![1.0, 3.0]);

        // Sorted listing fetches everything once
        assert_eq!(store.calls().list, 1);
    }

    #[tokio::test]
    async fn test_list_unsorted_uses_store_order() {
        let (_, service) = service_with(library(), ReviewsConfig::default());
        let reviews = service.list(None, None).await.unwrap();
        let ids: Vec<_> = reviews.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rec1", "rec2", "rec3"]);
    }

    #[tokio::test]
    async fn test_list_over_cap_makes_no_call() {
        let (store, service) = service_with(library(), ReviewsConfig::default());
        let err = service.list(None, Some(500)).await.unwrap_err();
        assert!(matches!(err, ReviewError::LimitExceeded(500, 100)));
        assert_eq!(store.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_nan_rating() {
        let (store, service) = service_with(vec![], ReviewsConfig::default());
        let err = service
            .create(NewReview::new("Emma", f64::NAN).with_isbn("111"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::Invalid(_)));
        assert_eq!(store.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_update_first_policy_touches_one_row() {
        let mut records = library();
        records.push(StoredRecord::new("rec4", fields(json!({"Books": "Emma (2nd ed.)", "ISBN": "111", "Rating": 2}))));
        let config = ReviewsConfig {
            duplicate_isbn_policy: DuplicateIsbnPolicy::First,
            ..Default::default()
        };
        let (store, service) = service_with(records, config);

        let outcome = service
            .find_and_update(ReviewUpdate::new("111", 4.0))
            .await
            .unwrap();

        match outcome {
            UpdateOutcome::Updated(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].id, "rec1");
            }
            UpdateOutcome::NotFound => panic!("expected update"),
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].number("Rating"), Some(4.0));
        assert_eq!(snapshot[3].number("Rating"), Some(2.0));
    }

    #[tokio::test]
    async fn test_update_all_policy_touches_every_match() {
        let mut records = library();
        records.push(StoredRecord::new("rec4", fields(json!({"ISBN": "111", "Rating": 2}))));
        let config = ReviewsConfig {
            duplicate_isbn_policy: DuplicateIsbnPolicy::All,
            ..Default::default()
        };
        let (store, service) = service_with(records, config);

        service
            .find_and_update(ReviewUpdate::new("111", 4.0))
            .await
            .unwrap();

        assert_eq!(store.calls().update, 2);
        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].number("Rating"), Some(4.0));
        assert_eq!(snapshot[3].number("Rating"), Some(4.0));
    }

    #[tokio::test]
    async fn test_update_reject_policy_writes_nothing() {
        let mut records = library();
        records.push(StoredRecord::new("rec4", fields(json!({"ISBN": "111", "Rating": 2}))));
        let (store, service) = service_with(records, ReviewsConfig::default());

        let err = service
            .find_and_update(ReviewUpdate::new("111", 4.0))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ReviewError::AmbiguousIsbn {
                isbn: "111".to_string(),
                matches: 2
            }
        );
        assert_eq!(store.calls().writes(), 0);
    }

    #[tokio::test]
    async fn test_update_clears_notes_on_null() {
        let (store, service) = service_with(library(), ReviewsConfig::default());

        service
            .find_and_update(ReviewUpdate::new("222", 4.0).with_notes(Patch::Null))
            .await
            .unwrap();

        let snapshot = store.snapshot();
        assert!(snapshot[1].fields.get("Notes").is_none());
        assert_eq!(snapshot[1].text("Books"), Some("Dune"));
    }

    #[tokio::test]
    async fn test_update_empty_isbn_rejected() {
        let (store, service) = service_with(library(), ReviewsConfig::default());
        let err = service
            .find_and_update(ReviewUpdate::new("  ", 4.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::Invalid(_)));
        assert_eq!(store.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let (store, service) = service_with(library(), ReviewsConfig::default());
        store.fail_with(StoreError::Timeout(10));

        let err = service.list(None, None).await.unwrap_err();
        assert_eq!(err, ReviewError::Store(StoreError::Timeout(10)));
    }
}
