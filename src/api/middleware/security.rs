use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

/// Security headers middleware
///
/// Adds to every response:
/// - X-Content-Type-Options: nosniff
/// - X-Frame-Options: DENY
/// - Referrer-Policy: no-referrer
/// - Strict-Transport-Security, only when enabled in configuration
pub async fn security_headers_middleware(
    State(config): State<SecurityHeadersConfig>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let (mut parts, body) = response.into_parts();

    parts
        .headers
        .insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    parts
        .headers
        .insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    parts
        .headers
        .insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));

    if config.enable_hsts {
        let hsts_value = format!("max-age={}; includeSubDomains", config.hsts_max_age);
        parts.headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_str(&hsts_value)
                .unwrap_or_else(|_| HeaderValue::from_static("max-age=31536000; includeSubDomains")),
        );
    }

    Response::from_parts(parts, body)
}

/// Configuration for security headers
#[derive(Clone, Debug)]
pub struct SecurityHeadersConfig {
    /// Enable HSTS (HTTP Strict Transport Security) header
    pub enable_hsts: bool,
    /// HSTS max-age in seconds
    pub hsts_max_age: u64,
}

impl SecurityHeadersConfig {
    pub fn new(enable_hsts: bool, hsts_max_age: u64) -> Self {
        Self {
            enable_hsts,
            hsts_max_age,
        }
    }
}
