//! Authentication response models

use crate::db::models::PublicUser;
use serde::{Deserialize, Serialize};

/// Body of successful register/login responses
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Body of GET /api/auth/me
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: PublicUser,
}

/// Body carrying only a message
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
