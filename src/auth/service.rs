//! Registration and login flows
//!
//! `AuthService` owns the user store, password hasher and token issuer. It
//! works on validated input and returns typed errors; HTTP concerns stay in
//! the handlers.

use crate::auth::jwt::TokenIssuer;
use crate::auth::password::PasswordHasher;
use crate::auth::validation::{LoginInput, RegisterInput};
use crate::core::error::{AppError, DuplicateField, Result};
use crate::db::models::{NewUser, PublicUser};
use crate::db::repository::UserStore;
use std::sync::Arc;

/// Password hashed once at startup so unknown emails still pay for a verify
const TIMING_DUMMY_PASSWORD: &str = "authgate-timing-equalizer";

pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: TokenIssuer,
    dummy_hash: String,
}

impl AuthService {
    pub async fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: TokenIssuer,
    ) -> Result<Self> {
        let dummy_hash = hasher.hash(TIMING_DUMMY_PASSWORD).await?;

        Ok(Self {
            store,
            hasher,
            issuer,
            dummy_hash,
        })
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Create a user after checking that email and username are free
    pub async fn register(&self, input: RegisterInput) -> Result<PublicUser> {
        if let Some(existing) = self
            .store
            .find_by_email_or_username(&input.email, &input.username)
            .await?
        {
            let field = if existing.email == input.email {
                DuplicateField::Email
            } else {
                DuplicateField::Username
            };
            return Err(AppError::DuplicateUser(field));
        }

        let password_hash = self.hasher.hash(&input.password).await?;

        // A concurrent registration can still win the race; the store's
        // UNIQUE constraints turn that into DuplicateUser as well.
        let user = self
            .store
            .create(NewUser {
                email: input.email,
                username: input.username,
                password_hash,
            })
            .await?;

        Ok(user.into())
    }

    /// Check credentials and issue a session token
    pub async fn login(&self, input: LoginInput) -> Result<(PublicUser, String)> {
        let Some(user) = self.store.find_by_email(&input.email).await? else {
            self.hasher.verify(&input.password, &self.dummy_hash).await?;
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(&input.password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issuer.issue(&user.id)?;
        Ok((user.into(), token))
    }

    /// Resolve a session token to the user it was issued for
    pub async fn resolve_session(&self, token: &str) -> Result<PublicUser> {
        let claims = self.issuer.verify(token)?;

        self.store
            .find_by_id(&claims.user_id)
            .await?
            .map(PublicUser::from)
            .ok_or_else(|| AppError::Unauthenticated("user no longer exists".to_string()))
    }
}
