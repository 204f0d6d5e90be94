//! HTTP Server implementation
//!
//! This module provides the HTTP server using Axum framework with:
//! - Configurable host/port binding
//! - Graceful shutdown handling
//! - Request timeouts
//! - Health check endpoint
//! - CORS support

use crate::api::middleware::{
    security_headers_middleware, trace_id_middleware, SecurityHeadersConfig,
};
use crate::api::routes::build_api_routes;
use crate::auth::cookie::SessionCookie;
use crate::auth::service::AuthService;
use crate::core::config::ServerConfig;
use crate::core::Config;
use axum::{middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub session_cookie: SessionCookie,
}

/// HTTP API Server
pub struct ApiServer {
    router: Router,
    config: ServerConfig,
}

impl ApiServer {
    /// Create a new API server with the given configuration and application state
    pub fn new(config: &Config, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
            config: config.server.clone(),
        }
    }

    /// Build the Axum router with all routes and middleware
    pub fn build_router(config: &Config, state: AppState) -> Router {
        let security_headers_config = SecurityHeadersConfig::new(
            config.security.enable_hsts,
            config.security.hsts_max_age,
        );

        Router::new()
            .route("/health", get(health_check))
            .merge(build_api_routes(state))
            .layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn_with_state(
                        security_headers_config,
                        security_headers_middleware,
                    ))
                    .layer(middleware::from_fn(trace_id_middleware))
                    .layer(TraceLayer::new_for_http())
                    .layer(Self::build_cors_layer(&config.security.allowed_origins))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.server.request_timeout,
                    ))),
            )
    }

    /// Build CORS layer from allowed origins configuration
    fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
        use tower_http::cors::Any;

        let cors = CorsLayer::new();

        if allowed_origins.iter().any(|origin| origin == "*") {
            cors.allow_origin(Any).allow_methods(Any).allow_headers(Any)
        } else {
            let origins: Vec<_> = allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            cors.allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }

    /// Start the HTTP server and listen for requests
    ///
    /// This method will block until the server is shut down gracefully.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr.parse()?;

        info!(
            host = %self.config.host,
            port = self.config.port,
            request_timeout = self.config.request_timeout,
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;

        info!(addr = %socket_addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server shut down gracefully");

        Ok(())
    }
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Initiating graceful shutdown...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::middleware::TRACE_ID_HEADER;
    use crate::test_support::{test_state, CountingStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::io::Write;
    use tower::util::ServiceExt;

    async fn test_router(extra_config: &str) -> Router {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "[security]\njwt_secret = \"server-test\"\n{}", extra_config).unwrap();
        let config = Config::from_file(file.path()).unwrap();

        let state = test_state(CountingStore::in_memory(), "server-test", false).await;
        ApiServer::build_router(&config, state)
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await;
        let value = response.0;

        assert_eq!(value["status"], "ok");
        assert!(value["version"].is_string());
        assert!(value["timestamp"].is_number());
    }

    #[tokio::test]
    async fn test_every_response_has_trace_and_security_headers() {
        let app = test_router("").await;

        for (method, uri) in [("GET", "/health"), ("GET", "/api/auth/me"), ("POST", "/api/auth/logout")] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();

            let headers = response.headers();
            assert!(headers.contains_key(TRACE_ID_HEADER), "{uri}");
            assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
            assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
            assert!(!headers.contains_key("Strict-Transport-Security"));
        }
    }

    #[tokio::test]
    async fn test_hsts_from_config() {
        let app = test_router("enable_hsts = true\nhsts_max_age = 600\n").await;

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Strict-Transport-Security").unwrap(),
            "max-age=600; includeSubDomains"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = test_router("").await;

        let request = Request::builder()
            .uri("/api/auth/unknown")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
