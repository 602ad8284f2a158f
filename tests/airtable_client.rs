//! Airtable Client Tests
//!
//! Runs `AirtableStore` against an in-process mock of the Airtable REST API
//! bound to 127.0.0.1:
//! - Bearer auth on every request
//! - List parameters (pageSize, maxRecords, sort, filterByFormula)
//! - Paging through the `offset` cursor
//! - Create and PATCH bodies
//! - Error envelopes, transport failures and timeouts

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use bookreview::reviews::{ReviewService, ReviewUpdate, ReviewsConfig, UpdateOutcome};
use bookreview::table_store::{
    AirtableSettings, AirtableStore, FieldEquals, FieldMap, ListQuery, SortSpec, StoreError,
    TableStore,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const TOKEN: &str = "patTEST.secret";
const TABLE_PATH: &str = "/v0/appTEST/tblReviews";

// =============================================================================
// Mock Airtable
// =============================================================================

#[derive(Debug, Clone)]
struct SeenRequest {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    auth: Option<String>,
    body: Option<Value>,
}

/// Canned response replacing normal handling
#[derive(Clone)]
enum Override {
    Respond(StatusCode, String),
    Delay(Duration),
}

#[derive(Default)]
struct MockAirtable {
    records: Mutex<Vec<Value>>,
    seen: Mutex<Vec<SeenRequest>>,
    override_with: Mutex<Option<Override>>,
}

impl MockAirtable {
    fn seeded(count: usize) -> Self {
        let records = (0..count)
            .map(|i| {
                json!({
                    "id": format!("rec{:05}", i),
                    "createdTime": "2024-01-01T00:00:00.000Z",
                    "fields": {"Books": format!("Book {}", i), "ISBN": format!("{}", 1000 + i), "Rating": i % 5}
                })
            })
            .collect();
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    fn set_override(&self, value: Override) {
        *self.override_with.lock().unwrap() = Some(value);
    }
}

async fn handle(
    State(mock): State<Arc<MockAirtable>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body_json: Option<Value> = serde_json::from_slice(&body).ok();

    mock.seen.lock().unwrap().push(SeenRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: query.clone(),
        auth: auth.clone(),
        body: body_json.clone(),
    });

    let override_with = mock.override_with.lock().unwrap().clone();
    match override_with {
        Some(Override::Respond(status, body)) => return (status, body).into_response(),
        Some(Override::Delay(delay)) => tokio::time::sleep(delay).await,
        None => {}
    }

    if auth.as_deref() != Some(&format!("Bearer {}", TOKEN)) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "AUTHENTICATION_REQUIRED"})),
        )
            .into_response();
    }

    let path = uri.path();
    if method == Method::GET && path == TABLE_PATH {
        list_page(&mock, &query).into_response()
    } else if method == Method::POST && path == TABLE_PATH {
        let fields = body_json.map(|b| b["fields"].clone()).unwrap_or(Value::Null);
        let mut records = mock.records.lock().unwrap();
        let record = json!({
            "id": format!("rec{:05}", records.len()),
            "createdTime": "2024-02-02T10:00:00.000Z",
            "fields": fields,
        });
        records.push(record.clone());
        Json(record).into_response()
    } else if method == Method::PATCH && path.starts_with(&format!("{}/", TABLE_PATH)) {
        let id = &path[TABLE_PATH.len() + 1..];
        let patch = body_json.map(|b| b["fields"].clone()).unwrap_or(Value::Null);
        let mut records = mock.records.lock().unwrap();
        match records.iter_mut().find(|r| r["id"] == id) {
            Some(record) => {
                if let (Some(fields), Some(patch)) =
                    (record["fields"].as_object_mut(), patch.as_object())
                {
                    for (k, v) in patch {
                        if v.is_null() {
                            fields.remove(k);
                        } else {
                            fields.insert(k.clone(), v.clone());
                        }
                    }
                }
                Json(record.clone()).into_response()
            }
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({"error": {"type": "MODEL_ID_NOT_FOUND", "message": "Could not find a record with that ID"}})),
            )
                .into_response(),
        }
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"error": "NOT_FOUND"}))).into_response()
    }
}

/// Serve one page. The offset cursor is the index of the next record.
fn list_page(mock: &MockAirtable, query: &HashMap<String, String>) -> Json<Value> {
    let records = mock.records.lock().unwrap();

    let mut matched: Vec<Value> = match query.get("filterByFormula") {
        Some(formula) => {
            let isbn = formula
                .strip_prefix("{ISBN} = '")
                .and_then(|rest| rest.strip_suffix('\''))
                .unwrap_or_default()
                .to_string();
            records
                .iter()
                .filter(|r| r["fields"]["ISBN"] == Value::String(isbn.clone()))
                .cloned()
                .collect()
        }
        None => records.clone(),
    };

    if let Some(max) = query.get("maxRecords").and_then(|m| m.parse::<usize>().ok()) {
        matched.truncate(max);
    }

    let page_size: usize = query
        .get("pageSize")
        .and_then(|p| p.parse().ok())
        .unwrap_or(100);
    let start: usize = query
        .get("offset")
        .and_then(|o| o.parse().ok())
        .unwrap_or(0);
    let end = (start + page_size).min(matched.len());

    let page: Vec<Value> = matched[start.min(end)..end].to_vec();
    if end < matched.len() {
        Json(json!({"records": page, "offset": end.to_string()}))
    } else {
        Json(json!({"records": page}))
    }
}

async fn start_mock(mock: Arc<MockAirtable>) -> String {
    let app = Router::new().fallback(handle).with_state(mock);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v0", addr)
}

fn settings(api_url: String, timeout: Duration) -> AirtableSettings {
    AirtableSettings {
        api_url,
        api_token: TOKEN.to_string(),
        base_id: "appTEST".to_string(),
        table_id: "tblReviews".to_string(),
        timeout,
    }
}

async fn setup(count: usize) -> (Arc<MockAirtable>, AirtableStore) {
    let mock = Arc::new(MockAirtable::seeded(count));
    let url = start_mock(mock.clone()).await;
    let store = AirtableStore::new(settings(url, Duration::from_secs(5))).unwrap();
    (mock, store)
}

fn fields(value: Value) -> FieldMap {
    value.as_object().cloned().unwrap()
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_sends_bearer_token() {
    let (mock, store) = setup(3).await;

    let records = store.list(ListQuery::all()).await.unwrap();
    assert_eq!(records.len(), 3);

    let seen = mock.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::GET);
    assert_eq!(seen[0].path, TABLE_PATH);
    assert_eq!(seen[0].auth.as_deref(), Some("Bearer patTEST.secret"));
    assert_eq!(seen[0].query.get("pageSize").map(String::as_str), Some("100"));
    assert!(!seen[0].query.contains_key("maxRecords"));
}

#[tokio::test]
async fn test_list_follows_offset_cursor() {
    let (mock, store) = setup(250).await;

    let records = store.list(ListQuery::all()).await.unwrap();
    assert_eq!(records.len(), 250);
    assert_eq!(records[0].id, "rec00000");
    assert_eq!(records[249].id, "rec00249");
    assert!(records[0].created_time.is_some());

    let seen = mock.seen();
    assert_eq!(seen.len(), 3);
    assert!(!seen[0].query.contains_key("offset"));
    assert_eq!(seen[1].query.get("offset").map(String::as_str), Some("100"));
    assert_eq!(seen[2].query.get("offset").map(String::as_str), Some("200"));
}

#[tokio::test]
async fn test_list_bounded() {
    let (mock, store) = setup(20).await;

    let records = store.list(ListQuery::all().limit(5)).await.unwrap();
    assert_eq!(records.len(), 5);

    let seen = mock.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].query.get("pageSize").map(String::as_str), Some("5"));
    assert_eq!(seen[0].query.get("maxRecords").map(String::as_str), Some("5"));
}

#[tokio::test]
async fn test_list_zero_makes_no_request() {
    let (mock, store) = setup(20).await;
    assert!(store.list(ListQuery::all().limit(0)).await.unwrap().is_empty());
    assert!(mock.seen().is_empty());
}

#[tokio::test]
async fn test_list_sort_parameters() {
    let (mock, store) = setup(3).await;

    store
        .list(ListQuery::all().sorted(SortSpec::descending("Rating")))
        .await
        .unwrap();

    let query = &mock.seen()[0].query;
    assert_eq!(query.get("sort[0][field]").map(String::as_str), Some("Rating"));
    assert_eq!(query.get("sort[0][direction]").map(String::as_str), Some("desc"));
}

#[tokio::test]
async fn test_list_filter_formula() {
    let (mock, store) = setup(10).await;

    let records = store
        .list(ListQuery::all().filtered(FieldEquals::new("ISBN", "1004")))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "rec00004");

    let query = &mock.seen()[0].query;
    assert_eq!(
        query.get("filterByFormula").map(String::as_str),
        Some("{ISBN} = '1004'")
    );
}

#[tokio::test]
async fn test_list_filter_formula_escapes_quotes() {
    let (mock, store) = setup(1).await;

    store
        .list(ListQuery::all().filtered(FieldEquals::new("ISBN", "x' OR 1=1 OR '")))
        .await
        .unwrap();

    let query = &mock.seen()[0].query;
    assert_eq!(
        query.get("filterByFormula").map(String::as_str),
        Some(r"{ISBN} = 'x\' OR 1=1 OR \''")
    );
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn test_create_posts_fields() {
    let (mock, store) = setup(0).await;

    let record = store
        .create(fields(json!({"Books": "Emma", "ISBN": "42", "Rating": 4})))
        .await
        .unwrap();
    assert_eq!(record.id, "rec00000");
    assert_eq!(record.text("Books"), Some("Emma"));
    assert!(record.created_time.is_some());

    let seen = mock.seen();
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(
        seen[0].body,
        Some(json!({"fields": {"Books": "Emma", "ISBN": "42", "Rating": 4}}))
    );
}

#[tokio::test]
async fn test_update_patches_record() {
    let (mock, store) = setup(3).await;

    let record = store
        .update("rec00001", fields(json!({"Rating": 5, "Notes": "reread"})))
        .await
        .unwrap();
    assert_eq!(record.number("Rating"), Some(5.0));
    assert_eq!(record.text("Books"), Some("Book 1"));

    let seen = mock.seen();
    assert_eq!(seen[0].method, Method::PATCH);
    assert_eq!(seen[0].path, format!("{}/rec00001", TABLE_PATH));
    assert_eq!(seen[0].body, Some(json!({"fields": {"Rating": 5, "Notes": "reread"}})));
}

#[tokio::test]
async fn test_update_unknown_record() {
    let (_mock, store) = setup(1).await;

    let err = store
        .update("recMISSING", fields(json!({"Rating": 1})))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::api(404, "MODEL_ID_NOT_FOUND", "Could not find a record with that ID")
    );
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_detailed_error_envelope() {
    let (mock, store) = setup(1).await;
    mock.set_override(Override::Respond(
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({"error": {"type": "INVALID_FILTER_BY_FORMULA", "message": "The formula is invalid"}})
            .to_string(),
    ));

    let err = store.list(ListQuery::all()).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::api(422, "INVALID_FILTER_BY_FORMULA", "The formula is invalid")
    );
}

#[tokio::test]
async fn test_bad_token_is_auth_failure() {
    let mock = Arc::new(MockAirtable::seeded(1));
    let url = start_mock(mock.clone()).await;
    let mut bad = settings(url, Duration::from_secs(5));
    bad.api_token = "patWRONG".to_string();
    let store = AirtableStore::new(bad).unwrap();

    let err = store.list(ListQuery::all()).await.unwrap_err();
    assert!(err.is_auth_failure());
    assert!(matches!(err, StoreError::Api { ref kind, .. } if kind == "AUTHENTICATION_REQUIRED"));
}

#[tokio::test]
async fn test_non_json_error_body() {
    let (mock, store) = setup(1).await;
    mock.set_override(Override::Respond(
        StatusCode::SERVICE_UNAVAILABLE,
        "upstream down\n".to_string(),
    ));

    let err = store.list(ListQuery::all()).await.unwrap_err();
    assert_eq!(err, StoreError::api(503, "UNKNOWN", "upstream down"));
}

#[tokio::test]
async fn test_malformed_success_body() {
    let (mock, store) = setup(1).await;
    mock.set_override(Override::Respond(StatusCode::OK, "{\"rows\": []}".to_string()));

    let err = store.list(ListQuery::all()).await.unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)));
}

#[tokio::test]
async fn test_timeout() {
    let mock = Arc::new(MockAirtable::seeded(1));
    mock.set_override(Override::Delay(Duration::from_secs(3)));
    let url = start_mock(mock).await;
    let store = AirtableStore::new(settings(url, Duration::from_secs(1))).unwrap();

    let err = store.list(ListQuery::all()).await.unwrap_err();
    assert_eq!(err, StoreError::Timeout(1));
}

#[tokio::test]
async fn test_unreachable_store() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store =
        AirtableStore::new(settings(format!("http://{}/v0", addr), Duration::from_secs(2))).unwrap();
    let err = store.list(ListQuery::all()).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}

// =============================================================================
// Review Service Over Airtable
// =============================================================================

#[tokio::test]
async fn test_review_update_end_to_end() {
    let (mock, store) = setup(5).await;
    let service = ReviewService::new(Arc::new(store), ReviewsConfig::default());

    let outcome = service
        .find_and_update(ReviewUpdate::new("1002", 5.0))
        .await
        .unwrap();
    assert!(matches!(outcome, UpdateOutcome::Updated(ref rows) if rows.len() == 1));

    let seen = mock.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].method, Method::GET);
    assert_eq!(seen[1].method, Method::PATCH);
    assert_eq!(seen[1].path, format!("{}/rec00002", TABLE_PATH));

    let outcome = service
        .find_and_update(ReviewUpdate::new("9999", 5.0))
        .await
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::NotFound);
    assert_eq!(mock.seen().len(), 3);
}
