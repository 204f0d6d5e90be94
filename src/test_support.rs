//! Test utilities shared by the unit tests in `src/`.

use crate::api::server::AppState;
use crate::auth::cookie::SessionCookie;
use crate::auth::jwt::TokenIssuer;
use crate::auth::password::BcryptHasher;
use crate::auth::service::AuthService;
use crate::core::error::{AppError, Result};
use crate::db::manager::DatabaseManager;
use crate::db::models::{NewUser, User};
use crate::db::repository::{UserRepository, UserStore};
use async_trait::async_trait;
use chrono::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Cheapest bcrypt cost, keeps tests fast
pub const TEST_BCRYPT_COST: u32 = 4;

/// In-memory store that counts every call it receives
#[derive(Clone)]
pub struct CountingStore {
    inner: Arc<UserRepository>,
    reads: Arc<AtomicUsize>,
    creates: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn in_memory() -> Self {
        let db = DatabaseManager::new_in_memory().expect("in-memory database");
        Self {
            inner: Arc::new(UserRepository::new(Arc::new(db))),
            reads: Arc::new(AtomicUsize::new(0)),
            creates: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.reads() + self.creates()
    }
}

#[async_trait]
impl UserStore for CountingStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_email(email).await
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_email_or_username(email, username).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id(id).await
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(user).await
    }
}

/// Store whose every call fails like an unreachable database
pub struct UnavailableStore;

#[async_trait]
impl UserStore for UnavailableStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
        Err(unavailable())
    }

    async fn find_by_email_or_username(
        &self,
        _email: &str,
        _username: &str,
    ) -> Result<Option<User>> {
        Err(unavailable())
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<User>> {
        Err(unavailable())
    }

    async fn create(&self, _user: NewUser) -> Result<User> {
        Err(unavailable())
    }
}

fn unavailable() -> AppError {
    AppError::DatabaseError(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
        Some("unable to open database file /var/lib/authgate/users.db".to_string()),
    ))
}

/// AuthService over `store` with a cheap hasher and a 7 day token lifetime
pub async fn test_service(store: impl UserStore + 'static, secret: &str) -> AuthService {
    let issuer = TokenIssuer::new(secret, Duration::days(7)).expect("issuer");
    AuthService::new(
        Arc::new(store),
        Arc::new(BcryptHasher::new(TEST_BCRYPT_COST)),
        issuer,
    )
    .await
    .expect("auth service")
}

/// Application state for router tests
pub async fn test_state(store: impl UserStore + 'static, secret: &str, secure: bool) -> AppState {
    AppState {
        auth: Arc::new(test_service(store, secret).await),
        session_cookie: SessionCookie::new(secure, Duration::days(7).num_seconds()),
    }
}
