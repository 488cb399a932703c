use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, as a string
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("JWT generation error: {0}")]
    Signing(String),

    #[error("Invalid JWT secret")]
    MissingSecret,
}

/// Password hashing and token signing, built once from the security config.
pub struct Credentials {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_lifetime: Duration,
    bcrypt_cost: u32,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token_lifetime", &self.token_lifetime)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn new(security: &SecurityConfig) -> Result<Self, AuthError> {
        let secret = security.jwt_secret.as_bytes();
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_lifetime: Duration::hours(security.jwt_expiry_hours as i64),
            bcrypt_cost: security.bcrypt_cost,
        })
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(bcrypt::hash(password, self.bcrypt_cost)?)
    }

    /// A malformed hash counts as a mismatch.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    pub fn issue_token(&self, user_id: i64) -> Result<String, AuthError> {
        self.sign(&Claims::new(user_id, self.token_lifetime))
    }

    /// Validate signature and expiry, returning the user id from `sub`.
    pub fn verify_token(&self, token: &str) -> Result<i64, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        token_data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn credentials() -> Credentials {
        Credentials::new(&AppConfig::for_tests().security).unwrap()
    }

    #[test]
    fn hashes_are_salted_and_verify() {
        let creds = credentials();
        let a = creds.hash_password("mys3cretp2ssw0rd").unwrap();
        let b = creds.hash_password("mys3cretp2ssw0rd").unwrap();

        assert_ne!(a, b);
        assert!(creds.verify_password("mys3cretp2ssw0rd", &a));
        assert!(creds.verify_password("mys3cretp2ssw0rd", &b));
        assert!(!creds.verify_password("wrong", &a));
    }

    #[test]
    fn malformed_hash_does_not_verify() {
        let creds = credentials();
        assert!(!creds.verify_password("anything", "not-a-bcrypt-hash"));
        assert!(!creds.verify_password("anything", ""));
    }

    #[test]
    fn token_round_trip_yields_subject() {
        let creds = credentials();
        let token = creds.issue_token(42).unwrap();
        assert_eq!(creds.verify_token(&token).unwrap(), 42);
    }

    #[test]
    fn token_expires_after_one_day_by_default() {
        let claims = Claims::new(7, Duration::hours(AppConfig::for_tests().security.jwt_expiry_hours as i64));
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
        assert_eq!(claims.sub, "7");
    }

    #[test]
    fn rejects_expired_token() {
        let creds = credentials();
        let token = creds.sign(&Claims::new(1, Duration::days(-2))).unwrap();
        assert!(matches!(creds.verify_token(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn rejects_token_signed_with_another_secret() {
        let mut other = AppConfig::for_tests();
        other.security.jwt_secret = "another-secret".to_string();
        let foreign = Credentials::new(&other.security).unwrap().issue_token(1).unwrap();

        assert!(matches!(credentials().verify_token(&foreign), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn rejects_garbage_and_non_numeric_subject() {
        let creds = credentials();
        assert!(matches!(creds.verify_token("not.a.jwt"), Err(AuthError::InvalidToken(_))));

        let claims = Claims {
            sub: "admin".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let token = creds.sign(&claims).unwrap();
        assert!(matches!(creds.verify_token(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let mut config = AppConfig::for_tests();
        config.security.jwt_secret.clear();
        assert!(matches!(Credentials::new(&config.security), Err(AuthError::MissingSecret)));
    }
}
