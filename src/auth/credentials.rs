//! Password hashing and bearer token issuance.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Lifetime stamped into issued tokens. Tokens are resolved by lookup, so
/// this is informational for clients.
pub const TOKEN_LIFETIME_DAYS: i64 = 365;

/// Claims carried by an issued bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account email
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Random nonce so two tokens for one email never collide
    pub jti: String,
}

/// Hash a password with bcrypt.
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

/// Issue the long-lived bearer token for a new account.
pub fn issue_token(email: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: email.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
