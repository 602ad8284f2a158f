//! Text HTTP Routes
//!
//! Query-string driven wrappers around the pure transforms in `crate::text`.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::text::{self, TextConfig};

use super::errors::ApiResult;
use super::params::{parse_capitalization, parse_optional, RawQuery};

/// Limits applied by the text handlers
pub struct TextState {
    pub config: TextConfig,
}

impl TextState {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Serialize)]
pub struct UppercaseResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessTextResponse {
    pub result: String,
}

/// Create text routes
pub fn text_routes(state: Arc<TextState>) -> Router {
    Router::new()
        .route("/uppercase", get(uppercase_handler))
        .route("/process_text", get(process_text_handler))
        .with_state(state)
}

async fn uppercase_handler(Query(params): Query<RawQuery>) -> ApiResult<Json<UppercaseResponse>> {
    let text = text::uppercase(params.get("text").map(String::as_str))?;
    Ok(Json(UppercaseResponse { text }))
}

async fn process_text_handler(
    State(state): State<Arc<TextState>>,
    Query(params): Query<RawQuery>,
) -> ApiResult<Json<ProcessTextResponse>> {
    let factor = parse_optional::<i64>(&params, "duplication_factor")?;
    let capitalization = parse_capitalization(&params)?;

    let result = text::process_text(
        params.get("text").map(String::as_str),
        factor,
        capitalization,
        &state.config,
    )?;
    Ok(Json(ProcessTextResponse { result }))
}
