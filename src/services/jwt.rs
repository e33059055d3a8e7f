//! Signed access tokens. Refresh tokens are opaque database rows; only the
//! short-lived access token and the password-reset token are JWTs.

use anyhow::{Context, Result};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::entities::users;

pub const PURPOSE_PASSWORD_RESET: &str = "password_reset";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: i32,
    pub email: String,
    pub username: Option<String>,
    /// Absent for access tokens; set for special-purpose tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_access(user: &users::Model, config: &AuthConfig) -> Result<String> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        purpose: None,
        iat: now.timestamp(),
        exp: (now + chrono::Duration::minutes(config.access_token_minutes)).timestamp(),
    };

    sign(&claims, config)
}

pub fn issue_password_reset(user: &users::Model, config: &AuthConfig) -> Result<String> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        purpose: Some(PURPOSE_PASSWORD_RESET.to_string()),
        iat: now.timestamp(),
        exp: (now + chrono::Duration::minutes(config.reset_token_minutes)).timestamp(),
    };

    sign(&claims, config)
}

fn sign(claims: &Claims, config: &AuthConfig) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .context("Failed to sign token")
}

/// Verifies the signature and expiry and returns the claims.
pub fn verify(token: &str, config: &AuthConfig) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .context("Invalid or expired token")?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> users::Model {
        let now = chrono::Utc::now();
        users::Model {
            id: 7,
            email: "client@example.com".to_string(),
            username: Some("client@example.com".to_string()),
            password_hash: "x".to_string(),
            is_superuser: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let config = AuthConfig::default();
        let token = issue_access(&test_user(), &config).unwrap();

        let claims = verify(&token, &config).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "client@example.com");
        assert!(claims.purpose.is_none());
    }

    #[test]
    fn test_reset_token_carries_purpose() {
        let config = AuthConfig::default();
        let token = issue_password_reset(&test_user(), &config).unwrap();

        let claims = verify(&token, &config).unwrap();
        assert_eq!(claims.purpose.as_deref(), Some(PURPOSE_PASSWORD_RESET));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = AuthConfig::default();
        let token = issue_access(&test_user(), &config).unwrap();

        let other = AuthConfig {
            jwt_secret: "different".to_string(),
            ..AuthConfig::default()
        };
        assert!(verify(&token, &other).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = AuthConfig::default();
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: 7,
            email: "client@example.com".to_string(),
            username: None,
            purpose: None,
            iat: (now - chrono::Duration::hours(2)).timestamp(),
            exp: (now - chrono::Duration::hours(1)).timestamp(),
        };
        let token = sign(&claims, &config).unwrap();

        assert!(verify(&token, &config).is_err());
    }
}
