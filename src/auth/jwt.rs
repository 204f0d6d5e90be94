//! JWT session token issuance and validation

use crate::core::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies session tokens with a server-held secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer; an empty secret is rejected rather than defaulted
    pub fn new(secret: &str, ttl: Duration) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(AppError::ConfigError(
                "token signing secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed token for a user
    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal("Failed to calculate expiration".to_string()))?;

        let claims = Claims {
            user_id: user_id.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| AppError::Unauthenticated(format!("invalid session token: {}", e)))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(secret, Duration::days(7)).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer("test-secret");
        let token = issuer.issue("user-1").unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.user_id, "user-1");

        let expected = Utc::now().timestamp() + 7 * 24 * 60 * 60;
        assert!((claims.exp - expected).abs() <= 5);
        assert_eq!(claims.exp - claims.iat, 604800);
    }

    #[test]
    fn test_wrong_secret_fails() {
        let token = issuer("test-secret").issue("user-1").unwrap();
        let result = issuer("another-secret").verify(&token);

        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[test]
    fn test_expired_token_fails() {
        let claims = Claims {
            user_id: "user-1".to_string(),
            iat: Utc::now().timestamp() - 8 * 24 * 60 * 60,
            exp: Utc::now().timestamp() - 24 * 60 * 60,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(issuer("test-secret").verify(&token).is_err());
    }

    #[test]
    fn test_garbage_token_fails() {
        assert!(issuer("test-secret").verify("not.a.token").is_err());
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(matches!(
            TokenIssuer::new("", Duration::days(7)),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn test_claims_use_user_id_key() {
        let claims = Claims {
            user_id: "user-1".to_string(),
            iat: 0,
            exp: 1,
        };
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["userId"], "user-1");
    }
}
