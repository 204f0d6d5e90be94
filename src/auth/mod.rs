//! Authentication module
//!
//! This module provides authentication functionality including:
//! - Registration and login input validation
//! - Password hashing and verification
//! - JWT session token issuing and verification
//! - Session cookie formatting
//! - HTTP handlers and the session middleware

pub mod cookie;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod validation;

pub use cookie::{extract_token, SessionCookie, SESSION_COOKIE_NAME};
pub use handlers::{login, logout, me, register};
pub use jwt::{Claims, TokenIssuer};
pub use middleware::{authenticate, AuthUser};
pub use password::{BcryptHasher, PasswordHasher};
pub use service::AuthService;
pub use validation::{validate_login, validate_register, LoginInput, RegisterInput, ValidationErrors};
