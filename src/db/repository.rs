//! User store: the persistence seam for user records
//!
//! Handlers depend on the `UserStore` trait; `UserRepository` is the SQLite
//! implementation backed by `DatabaseManager`.

use crate::core::error::{AppError, DuplicateField, Result};
use crate::db::manager::DatabaseManager;
use crate::db::models::{NewUser, User};
use async_trait::async_trait;
use rusqlite::{ErrorCode, OptionalExtension, Row};
use std::sync::Arc;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, username, password_hash, created_at";

/// Persistence collaborator for user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by exact email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find any user whose email or username matches
    async fn find_by_email_or_username(&self, email: &str, username: &str)
        -> Result<Option<User>>;

    /// Find a user by id
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Insert a new user, failing with `DuplicateUser` on a uniqueness conflict
    async fn create(&self, user: NewUser) -> Result<User>;
}

/// Repository for User entities
pub struct UserRepository {
    db: Arc<DatabaseManager>,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64> {
        self.db
            .execute(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?))
            .await
    }

    async fn find_one(&self, clause: &'static str, params: Vec<String>) -> Result<Option<User>> {
        self.db
            .execute(move |conn| {
                let sql = format!("SELECT {} FROM users WHERE {} LIMIT 1", USER_COLUMNS, clause);
                let user = conn
                    .query_row(&sql, rusqlite::params_from_iter(params.iter()), map_user)
                    .optional()?;
                Ok(user)
            })
            .await
    }
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Map a UNIQUE constraint failure on insert to the column that collided
fn map_insert_error(err: rusqlite::Error) -> AppError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            if message.contains("users.email") {
                return AppError::DuplicateUser(DuplicateField::Email);
            }
            if message.contains("users.username") {
                return AppError::DuplicateUser(DuplicateField::Username);
            }
        }
    }
    AppError::DatabaseError(err)
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one("email = ?1", vec![email.to_string()]).await
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>> {
        // An email match wins when two different rows collide
        self.find_one(
            "email = ?1 OR username = ?2 ORDER BY (email = ?1) DESC",
            vec![email.to_string(), username.to_string()],
        )
        .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        self.find_one("id = ?1", vec![id.to_string()]).await
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: new_user.email,
            username: new_user.username,
            password_hash: new_user.password_hash,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO users (id, email, username, password_hash, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        &user.id,
                        &user.email,
                        &user.username,
                        &user.password_hash,
                        &user.created_at,
                    ],
                )
                .map_err(map_insert_error)?;
                Ok(user)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> UserRepository {
        UserRepository::new(Arc::new(DatabaseManager::new_in_memory().unwrap()))
    }

    fn new_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "$2b$04$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = repo();
        let created = repo.create(new_user("ada@example.com", "ada")).await.unwrap();

        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(repo.count().await.unwrap(), 1);

        let by_email = repo.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_email.username, "ada");

        let by_id = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let repo = repo();
        repo.create(new_user("Ada@example.com", "ada")).await.unwrap();

        assert!(repo.find_by_email("ada@example.com").await.unwrap().is_none());
        assert!(repo.find_by_email("Ada@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_by_email_or_username() {
        let repo = repo();
        repo.create(new_user("ada@example.com", "ada")).await.unwrap();
        repo.create(new_user("bob@example.com", "bob")).await.unwrap();

        let hit = repo
            .find_by_email_or_username("nobody@example.com", "bob")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.username, "bob");

        // Email of one row, username of another: the email row is returned
        let hit = repo
            .find_by_email_or_username("bob@example.com", "ada")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.email, "bob@example.com");

        assert!(repo
            .find_by_email_or_username("nobody@example.com", "nobody")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_maps_unique_violations() {
        let repo = repo();
        repo.create(new_user("ada@example.com", "ada")).await.unwrap();

        let email_clash = repo.create(new_user("ada@example.com", "other")).await;
        assert!(matches!(
            email_clash,
            Err(AppError::DuplicateUser(DuplicateField::Email))
        ));

        let username_clash = repo.create(new_user("other@example.com", "ada")).await;
        assert!(matches!(
            username_clash,
            Err(AppError::DuplicateUser(DuplicateField::Username))
        ));

        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
