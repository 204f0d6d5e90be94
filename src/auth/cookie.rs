//! Session cookie formatting and parsing

use crate::core::error::{AppError, Result};
use axum::http::{header, HeaderMap, HeaderValue};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE_NAME: &str = "token";

/// Attributes shared by every session cookie this server sets
#[derive(Debug, Clone)]
pub struct SessionCookie {
    secure: bool,
    max_age: i64,
}

impl SessionCookie {
    /// `secure` adds the `Secure` attribute; `max_age` is in seconds
    pub fn new(secure: bool, max_age: i64) -> Self {
        Self { secure, max_age }
    }

    /// `Set-Cookie` value carrying a freshly issued token
    pub fn issue(&self, token: &str) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.format(token, self.max_age))
            .map_err(|e| AppError::Internal(format!("Invalid session cookie value: {}", e)))
    }

    /// `Set-Cookie` value that expires the session cookie immediately
    pub fn clear(&self) -> HeaderValue {
        HeaderValue::from_str(&self.format("", 0))
            .unwrap_or_else(|_| HeaderValue::from_static("token=; Path=/; Max-Age=0"))
    }

    fn format(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
            SESSION_COOKIE_NAME, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Read the session token from the `Cookie` header, falling back to a bearer token
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}
