//! Password hashing and verification using bcrypt
//!
//! Hashing at cost 12 takes a few hundred milliseconds, so both operations
//! run on the blocking thread pool.

use crate::core::error::{AppError, Result};
use async_trait::async_trait;
use tokio::task;

/// One-way password hashing collaborator
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password
    async fn hash(&self, password: &str) -> Result<String>;

    /// Check a plaintext password against a stored hash
    async fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// bcrypt-backed hasher with a fixed work factor
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[async_trait]
impl PasswordHasher for BcryptHasher {
    async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.cost;

        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::TaskError(format!("Hashing task panicked: {}", e)))?
            .map_err(AppError::HashError)
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::TaskError(format!("Verify task panicked: {}", e)))?
            .map_err(AppError::HashError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_default_cost() {
        assert_eq!(BcryptHasher::default().cost(), 12);
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = BcryptHasher::new(TEST_COST);
        let hash = hasher.hash("secret1").await.unwrap();

        assert_ne!(hash, "secret1");
        assert!(hash.starts_with("$2"));
        assert!(hasher.verify("secret1", &hash).await.unwrap());
        assert!(!hasher.verify("secret2", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_salted_hashes_differ() {
        let hasher = BcryptHasher::new(TEST_COST);
        let first = hasher.hash("secret1").await.unwrap();
        let second = hasher.hash("secret1").await.unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("secret1", &second).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_an_error() {
        let hasher = BcryptHasher::new(TEST_COST);
        let result = hasher.verify("secret1", "not-a-bcrypt-hash").await;
        assert!(matches!(result, Err(AppError::HashError(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_hash_never_equals_plaintext(password in "[ -~]{6,40}") {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let hasher = BcryptHasher::new(TEST_COST);
            let hash = rt.block_on(hasher.hash(&password)).unwrap();

            prop_assert_ne!(&hash, &password);
            prop_assert!(rt.block_on(hasher.verify(&password, &hash)).unwrap());
        }
    }
}
