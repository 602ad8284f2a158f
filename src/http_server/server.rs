//! # HTTP Server
//!
//! Combines the review, text and health routers into one Axum app.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::observability::{log_event, log_event_with_fields, Event};
use crate::reviews::ReviewService;
use crate::text::TextConfig;

use super::config::HttpServerConfig;
use super::observability_routes::{health_routes, log_requests};
use super::review_routes::{review_routes, ReviewState};
use super::text_routes::{text_routes, TextState};

/// HTTP server for the review API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, reviews: Arc<ReviewService>, text: TextConfig) -> Self {
        let router = Self::build_router(&config, reviews, text);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, reviews: Arc<ReviewService>, text: TextConfig) -> Router {
        let review_state = Arc::new(ReviewState::new(reviews));
        let text_state = Arc::new(TextState::new(text));

        // No configured origins means any origin
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(review_routes(review_state))
            .merge(text_routes(text_state))
            .layer(
                ServiceBuilder::new()
                    .layer(cors)
                    .layer(middleware::from_fn(log_requests)),
            )
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl+C or SIGTERM, then drain in-flight requests
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid socket address: {}", self.config.socket_addr()),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        let local = listener.local_addr()?.to_string();
        log_event_with_fields(Event::ServerListening, &[("addr", local.as_str())]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log_event(Event::ShutdownComplete);
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_event_with_fields(Event::ShutdownSignal, &[("signal", "SIGINT")]);
        },
        _ = terminate => {
            log_event_with_fields(Event::ShutdownSignal, &[("signal", "SIGTERM")]);
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::ReviewsConfig;
    use crate::table_store::MemoryTableStore;

    fn service() -> Arc<ReviewService> {
        Arc::new(ReviewService::new(
            Arc::new(MemoryTableStore::new()),
            ReviewsConfig::default(),
        ))
    }

    #[test]
    fn test_server_with_custom_port() {
        let config = HttpServerConfig::with_port(8080);
        let server = HttpServer::new(config, service(), TextConfig::default());
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds_with_origin_list() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:3000".to_string()],
            ..Default::default()
        };
        let _router = HttpServer::new(config, service(), TextConfig::default()).router();
    }
}
