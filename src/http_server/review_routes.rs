//! Review HTTP Routes
//!
//! Listing, creation and ISBN-addressed updates of book reviews, plus the
//! bare `/records` and `/add-record` pair.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::reviews::{NewReview, Patch, ReviewRecord, ReviewService, ReviewUpdate, UpdateOutcome};

use super::errors::{ApiError, ApiResult};
use super::params::{parse_count, parse_sort, required, required_text, RawQuery};

// ==================
// Shared State
// ==================

/// Review state shared across handlers
pub struct ReviewState {
    pub service: Arc<ReviewService>,
}

impl ReviewState {
    pub fn new(service: Arc<ReviewService>) -> Self {
        Self { service }
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct PostReviewRequest {
    #[serde(rename = "Book")]
    pub book: Option<String>,
    #[serde(rename = "ISBN")]
    pub isbn: Option<String>,
    #[serde(rename = "Rating")]
    pub rating: Option<f64>,
    #[serde(rename = "Notes")]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    #[serde(rename = "ISBN")]
    pub isbn: Option<String>,
    #[serde(rename = "Rating")]
    pub rating: Option<f64>,
    #[serde(rename = "Notes", default)]
    pub notes: Patch<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddRecordRequest {
    #[serde(rename = "Book")]
    pub book: Option<String>,
    #[serde(rename = "Rating")]
    pub rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct BooksResponse {
    pub books: Vec<ReviewRecord>,
}

// ==================
// Review Routes
// ==================

/// Create review routes
pub fn review_routes(state: Arc<ReviewState>) -> Router {
    Router::new()
        .route("/all_reviews", get(all_reviews_handler))
        .route("/post_review", post(post_review_handler))
        .route("/update_review", put(update_review_handler))
        .route("/records", get(records_handler))
        .route("/add-record", post(add_record_handler))
        .with_state(state)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

// ==================
// Handlers
// ==================

async fn all_reviews_handler(
    State(state): State<Arc<ReviewState>>,
    Query(params): Query<RawQuery>,
) -> ApiResult<Json<Vec<ReviewRecord>>> {
    let sort = parse_sort(&params)?;
    let max_records = parse_count(&params, "max_records")?;

    let reviews = state.service.list(sort, max_records).await?;
    Ok(Json(reviews))
}

async fn post_review_handler(
    State(state): State<Arc<ReviewState>>,
    payload: Result<Json<PostReviewRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let request = body(payload)?;
    let title = required_text(request.book, "Book")?;
    let isbn = required_text(request.isbn, "ISBN")?;
    let rating = required(request.rating, "Rating")?;

    let mut review = NewReview::new(title, rating).with_isbn(isbn);
    if let Some(notes) = request.notes {
        review = review.with_notes(notes);
    }

    state.service.create(review).await?;
    Ok((StatusCode::CREATED, MessageResponse::new("Review added successfully")))
}

async fn update_review_handler(
    State(state): State<Arc<ReviewState>>,
    payload: Result<Json<UpdateReviewRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let request = body(payload)?;
    let isbn = required_text(request.isbn, "ISBN")?;
    let rating = required(request.rating, "Rating")?;

    let update = ReviewUpdate::new(isbn.clone(), rating).with_notes(request.notes);
    match state.service.find_and_update(update).await? {
        UpdateOutcome::Updated(_) => Ok(MessageResponse::new("Review updated successfully")),
        UpdateOutcome::NotFound => Err(ApiError::NotFound(format!(
            "No review found with ISBN {}",
            isbn
        ))),
    }
}

async fn records_handler(
    State(state): State<Arc<ReviewState>>,
    Query(params): Query<RawQuery>,
) -> ApiResult<Json<BooksResponse>> {
    let sort = parse_sort(&params)?;
    let count = parse_count(&params, "count")?;

    let books = state.service.list(sort, count).await?;
    Ok(Json(BooksResponse { books }))
}

/// Remote failures surface as 500 here rather than 502
async fn add_record_handler(
    State(state): State<Arc<ReviewState>>,
    payload: Result<Json<AddRecordRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let request = body(payload)?;
    let title = required_text(request.book, "Book")?;
    let rating = required(request.rating, "Rating")?;

    state
        .service
        .create(NewReview::new(title, rating))
        .await
        .map_err(|err| match ApiError::from(err) {
            ApiError::Store(store) => ApiError::Internal(store.to_string()),
            other => other,
        })?;

    Ok(MessageResponse::new("Record added successfully"))
}
