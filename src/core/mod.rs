//! Core application layer
//!
//! This module provides:
//! - Configuration management
//! - Structured logging system
//! - Error handling and type system

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{AppError, DuplicateField, ErrorResponse, Result};
pub use logging::Logger;
