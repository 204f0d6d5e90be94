//! Authentication middleware

use crate::api::server::AppState;
use crate::auth::cookie::extract_token;
use crate::core::error::AppError;
use crate::db::models::PublicUser;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Authenticated user stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthUser(pub PublicUser);

/// Resolve the session token and attach the user to the request
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers()) else {
        return AppError::Unauthenticated("missing session token".to_string()).into_response();
    };

    let user = match state.auth.resolve_session(&token).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(user_id = %user.id, "Session resolved");
    request.extensions_mut().insert(AuthUser(user));

    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated("user not authenticated".to_string()))
    }
}
