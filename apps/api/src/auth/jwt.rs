// JWT access token creation and verification
// HS256 tokens carrying the profile id, expiry set by configuration

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to create token: {0}")]
    Encode(jsonwebtoken::errors::Error),
    #[error("Invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// JWT claims structure
///
/// # Fields
/// * `sub` - Subject (profile id)
/// * `iat` - Issued at (seconds since epoch)
/// * `exp` - Expiry time (seconds since epoch)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// Creates a signed access token for a user
///
/// # Example
/// ```
/// use teamhub_api::auth::jwt::{create_token, verify_token};
/// use uuid::Uuid;
///
/// let user_id = Uuid::new_v4();
/// let token = create_token(user_id, "secret", 8).expect("valid token");
/// let claims = verify_token(&token, "secret").expect("valid claims");
/// assert_eq!(claims.sub, user_id);
/// ```
pub fn create_token(user_id: Uuid, secret: &str, ttl_hours: i64) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(ttl_hours)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(TokenError::Encode)
}

/// Verifies signature and expiry, returning the decoded claims
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(TokenError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-unit-tests";

    #[test]
    fn create_and_verify_token() {
        let user_id = Uuid::new_v4();
        let token = create_token(user_id, TEST_SECRET, 8).expect("valid token");

        let claims = verify_token(&token, TEST_SECRET).expect("valid verification");
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn wrong_secret_fails() {
        let token = create_token(Uuid::new_v4(), TEST_SECRET, 8).expect("valid token");
        assert!(verify_token(&token, "wrong-secret").is_err());
    }

    #[test]
    fn invalid_token_fails() {
        let result = verify_token("invalid.token.string", TEST_SECRET);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_token_fails() {
        // Past the default 60s leeway
        let token = create_token(Uuid::new_v4(), TEST_SECRET, -1).expect("valid token");
        assert!(verify_token(&token, TEST_SECRET).is_err());
    }

    #[test]
    fn token_expiry_follows_ttl() {
        let token = create_token(Uuid::new_v4(), TEST_SECRET, 2).expect("valid token");
        let claims = verify_token(&token, TEST_SECRET).expect("valid verification");

        let in_2_hours = (Utc::now() + Duration::hours(2)).timestamp();
        assert!(claims.exp as i64 > Utc::now().timestamp());
        assert!(claims.exp as i64 <= in_2_hours + 10);
        assert!(claims.iat <= claims.exp);
    }
}
