//! Airtable REST client
//!
//! Implements `TableStore` against the Airtable v0 API:
//!
//! - `GET    {api}/{base}/{table}`          list (paged through `offset`)
//! - `POST   {api}/{base}/{table}`          create, body `{"fields": {...}}`
//! - `PATCH  {api}/{base}/{table}/{record}` partial update, same body
//!
//! Authentication is a bearer token. Every request is bounded by the
//! configured timeout; nothing is retried.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::observability::ObservationScope;

use super::errors::{StoreError, StoreResult};
use super::query::ListQuery;
use super::record::{FieldMap, StoredRecord};
use super::{StoreFuture, TableStore};

/// Largest page the API serves
pub const PAGE_SIZE: usize = 100;

/// Public API endpoint
pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

/// Connection settings for one table
#[derive(Debug, Clone)]
pub struct AirtableSettings {
    pub api_url: String,
    pub api_token: String,
    pub base_id: String,
    pub table_id: String,
    pub timeout: Duration,
}

/// One page of a list response
#[derive(Debug, Deserialize)]
struct ListPage {
    records: Vec<StoredRecord>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Serialize)]
struct FieldsBody<'a> {
    fields: &'a FieldMap,
}

/// Error envelope; the API uses both shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Detailed { error: ErrorDetail },
    Bare { error: String },
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<String>,
}

/// Table store backed by one Airtable table
pub struct AirtableStore {
    client: Client,
    table_url: Url,
    api_token: String,
    timeout_secs: u64,
}

impl AirtableStore {
    /// Build the client. Fails on an unparseable API URL or if the HTTP
    /// client cannot be constructed.
    pub fn new(settings: AirtableSettings) -> StoreResult<Self> {
        let mut table_url = Url::parse(&settings.api_url)
            .map_err(|e| StoreError::Internal(format!("Invalid API URL: {}", e)))?;

        table_url
            .path_segments_mut()
            .map_err(|_| StoreError::Internal("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&settings.base_id)
            .push(&settings.table_id);

        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| StoreError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            table_url,
            api_token: settings.api_token,
            timeout_secs: settings.timeout.as_secs(),
        })
    }

    /// URL of the table endpoint
    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn record_url(&self, record_id: &str) -> StoreResult<Url> {
        let mut url = self.table_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Internal("API URL cannot be a base".to_string()))?
            .push(record_id);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.api_token)
    }

    fn transport_error(&self, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout(self.timeout_secs)
        } else {
            StoreError::Transport(err.to_string())
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<T> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> StoreResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn list_params(query: &ListQuery, offset: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        let page_size = query
            .max_records
            .map_or(PAGE_SIZE, |max| max.clamp(1, PAGE_SIZE));
        params.push(("pageSize", page_size.to_string()));

        if let Some(max) = query.max_records {
            params.push(("maxRecords", max.to_string()));
        }
        if let Some(sort) = &query.sort {
            params.push(("sort[0][field]", sort.field.clone()));
            params.push(("sort[0][direction]", sort.direction.as_str().to_string()));
        }
        if let Some(filter) = &query.filter {
            params.push(("filterByFormula", filter.to_formula()));
        }
        if let Some(offset) = offset {
            params.push(("offset", offset.to_string()));
        }

        params
    }

    async fn list_all(&self, query: ListQuery) -> StoreResult<Vec<StoredRecord>> {
        if query.max_records == Some(0) {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let params = Self::list_params(&query, offset.as_deref());
            let page: ListPage = self
                .send(self.client.get(self.table_url.clone()).query(&params))
                .await?;

            records.extend(page.records);

            if let Some(max) = query.max_records {
                if records.len() >= max {
                    records.truncate(max);
                    break;
                }
            }

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }
}

/// Map a non-success response body to a store error
fn api_error(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope::Detailed { error }) => StoreError::api(
            status,
            error.kind,
            error.message.unwrap_or_default(),
        ),
        Ok(ErrorEnvelope::Bare { error }) => StoreError::api(status, error, String::new()),
        Err(_) => StoreError::api(status, "UNKNOWN", body.trim().to_string()),
    }
}

impl TableStore for AirtableStore {
    fn name(&self) -> &str {
        "airtable"
    }

    fn list(&self, query: ListQuery) -> StoreFuture<'_, Vec<StoredRecord>> {
        Box::pin(async move {
            let scope = ObservationScope::new("STORE_LIST");
            match self.list_all(query).await {
                Ok(records) => {
                    let count = records.len().to_string();
                    scope.complete_with_fields(&[("records", count.as_str())]);
                    Ok(records)
                }
                Err(e) => {
                    scope.fail(&e.to_string());
                    Err(e)
                }
            }
        })
    }

    fn create(&self, fields: FieldMap) -> StoreFuture<'_, StoredRecord> {
        Box::pin(async move {
            let scope = ObservationScope::new("STORE_CREATE");
            let request = self
                .client
                .post(self.table_url.clone())
                .json(&FieldsBody { fields: &fields });

            match self.send::<StoredRecord>(request).await {
                Ok(record) => {
                    scope.complete_with_fields(&[("record_id", record.id.as_str())]);
                    Ok(record)
                }
                Err(e) => {
                    scope.fail(&e.to_string());
                    Err(e)
                }
            }
        })
    }

    fn update<'a>(
        &'a self,
        record_id: &'a str,
        fields: FieldMap,
    ) -> StoreFuture<'a, StoredRecord> {
        Box::pin(async move {
            let scope = ObservationScope::with_fields("STORE_UPDATE", &[("record_id", record_id)]);
            let result = match self.record_url(record_id) {
                Ok(url) => {
                    let request = self.client.patch(url).json(&FieldsBody { fields: &fields });
                    self.send::<StoredRecord>(request).await
                }
                Err(e) => Err(e),
            };

            match &result {
                Ok(_) => scope.complete(),
                Err(e) => scope.fail(&e.to_string()),
            }
            result
        })
    }
}
