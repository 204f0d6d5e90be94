use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// HTTP header name for trace ID
pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

tokio::task_local! {
    static CURRENT_TRACE_ID: String;
}

/// Trace ID of the request being handled on this task, if any
pub fn current_trace_id() -> Option<String> {
    CURRENT_TRACE_ID.try_with(|id| id.clone()).ok()
}

/// Middleware that generates a unique trace ID for each request and propagates it
/// through the request lifecycle.
///
/// The trace ID is:
/// - Generated as a UUID v4 for each request
/// - Added to the request extensions for access by handlers
/// - Included in all log entries via tracing spans
/// - Added to the response headers
/// - Included in error bodies (see `ErrorResponse::from_error`)
pub async fn trace_id_middleware(request: Request, next: Next) -> Response {
    let trace_id = Uuid::new_v4().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %request.method(),
        uri = %request.uri().path(),
    );

    tracing::info!(parent: &span, "Request started");

    let mut request = request;
    request.extensions_mut().insert(TraceId(trace_id.clone()));

    let response = CURRENT_TRACE_ID
        .scope(
            trace_id.clone(),
            async move {
                let response = next.run(request).await;
                tracing::info!(status = %response.status(), "Request completed");
                response
            }
            .instrument(span),
        )
        .await;

    let (mut parts, body) = response.into_parts();
    parts.headers.insert(
        TRACE_ID_HEADER,
        HeaderValue::from_str(&trace_id).unwrap_or_else(|_| HeaderValue::from_static("invalid")),
    );

    Response::from_parts(parts, body)
}

/// Extension type for storing trace ID in request extensions
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        response::IntoResponse,
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    async fn echo_trace_id(request: Request<Body>) -> impl IntoResponse {
        let trace_id = request
            .extensions()
            .get::<TraceId>()
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| "no-trace-id".to_string());

        (StatusCode::OK, trace_id)
    }

    fn app() -> Router {
        Router::new()
            .route("/test", get(echo_trace_id))
            .route("/fail", get(|| async { AppError::InvalidCredentials }))
            .layer(middleware::from_fn(trace_id_middleware))
    }

    async fn header_trace_id(app: Router, uri: &str) -> (String, axum::body::Bytes) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let trace_id = response
            .headers()
            .get(TRACE_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (trace_id, body)
    }

    #[tokio::test]
    async fn test_trace_id_matches_handler_extension() {
        let (header, body) = header_trace_id(app(), "/test").await;

        assert!(Uuid::parse_str(&header).is_ok());
        assert_eq!(header, String::from_utf8(body.to_vec()).unwrap());
    }

    #[tokio::test]
    async fn test_trace_id_unique_per_request() {
        let (first, _) = header_trace_id(app(), "/test").await;
        let (second, _) = header_trace_id(app(), "/test").await;

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_error_body_carries_request_trace_id() {
        let (header, body) = header_trace_id(app(), "/fail").await;
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(value["trace_id"], header.as_str());
    }

    #[test]
    fn test_no_trace_id_outside_request() {
        assert!(current_trace_id().is_none());
    }
}
