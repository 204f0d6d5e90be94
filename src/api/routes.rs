//! API routes

use crate::api::server::AppState;
use crate::auth::handlers::{login, logout, me, register};
use crate::auth::middleware::authenticate;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

/// Build the API routes
pub fn build_api_routes(state: AppState) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout));

    // Protected routes (session required)
    let protected_routes = Router::new()
        .route("/api/auth/me", get(me))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    public_routes
        .merge(protected_routes)
        .with_state(state)
}
