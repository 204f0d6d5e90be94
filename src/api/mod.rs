//! REST API module
//!
//! This module provides the HTTP server and its routing:
//! - Route table for the auth endpoints
//! - Trace ID and security header middleware
//! - Health check, CORS and request timeouts

pub mod middleware;
pub mod routes;
pub mod server;

pub use middleware::{trace_id_middleware, TraceId, TRACE_ID_HEADER};
pub use server::{ApiServer, AppState};
