//! Domain service for authentication: login, refresh rotation, revocation,
//! and the password-reset flow.

use serde::Serialize;
use thiserror::Error;

use crate::domain::Actor;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    Unauthorized,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// User info DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub email: String,
    pub username: Option<String>,
    pub is_superuser: bool,
    /// Linked client record, if any.
    pub client_id: Option<i32>,
}

/// Result of login and refresh: a short-lived access token plus an opaque
/// rotating refresh token.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserInfo,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a token pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for unknown emails, wrong
    /// passwords, and deactivated accounts alike.
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Exchanges a refresh token for a new pair, invalidating the old token.
    /// Presenting the same token twice fails the second time.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Revokes a refresh token so it can no longer be exchanged.
    async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Validates an access token and resolves the actor behind it.
    async fn authenticate(&self, access_token: &str) -> Result<Actor, AuthError>;

    async fn current_user(&self, actor: &Actor) -> Result<UserInfo, AuthError>;

    /// Always succeeds, whether or not the email has an account; a reset
    /// email is dispatched only when it does.
    async fn forgot_password(&self, email: &str) -> Result<(), AuthError>;

    /// Sets a new password given a valid reset token, then revokes all of
    /// the user's refresh tokens.
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;

    /// Removes a login account. Admin only.
    async fn delete_user(&self, actor: &Actor, user_id: i32) -> Result<(), AuthError>;
}
