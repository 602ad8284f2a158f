//! Observability HTTP Routes
//!
//! Health check and per-request logging.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::observability::{Logger, Severity, Timer};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// Middleware logging `HTTP_REQUEST` once per response
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let timer = Timer::new();

    let response = next.run(request).await;

    let status = response.status();
    let code = status.as_u16().to_string();
    let duration = timer.elapsed_ms();
    Logger::log(
        request_severity(status),
        "HTTP_REQUEST",
        &[
            ("duration_ms", duration.as_str()),
            ("method", method.as_str()),
            ("path", path.as_str()),
            ("status", code.as_str()),
        ],
    );

    response
}

fn request_severity(status: StatusCode) -> Severity {
    if status.is_server_error() {
        Severity::Error
    } else if status.is_client_error() {
        Severity::Warn
    } else {
        Severity::Info
    }
}
