//! # HTTP Server Module
//!
//! Axum front end for the review service.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/all_reviews`, `/post_review`, `/update_review` - Reviews
//! - `/records`, `/add-record` - Bare record listing and insert
//! - `/uppercase`, `/process_text` - Text transforms

pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod params;
pub mod review_routes;
pub mod server;
pub mod text_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
