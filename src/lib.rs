//! authgate
//!
//! Account registration and login over HTTP: validated input, bcrypt password
//! hashes in SQLite, and JWT sessions delivered as an HttpOnly cookie.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use api::{ApiServer, AppState};
pub use auth::AuthService;
pub use crate::core::{AppError, Config};
pub use db::DatabaseManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
