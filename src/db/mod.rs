//! Database module
//!
//! This module provides database management functionality including:
//! - Database connection pool management
//! - The user store trait and its SQLite repository
//! - Database migrations
//! - Data models

pub mod manager;
pub mod migrations;
pub mod models;
pub mod repository;

pub use manager::DatabaseManager;
pub use models::{NewUser, PublicUser, User};
pub use repository::{UserRepository, UserStore};
