//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::AuthConfig;
use crate::db::Store;
use crate::db::repositories::user::verify_password;
use crate::domain::Actor;
use crate::entities::users;
use crate::services::auth_service::{AuthError, AuthService, TokenPair, UserInfo};
use crate::services::jwt;
use crate::services::mailer::{self, Mailer};

pub struct SeaOrmAuthService {
    store: Store,
    config: AuthConfig,
    mailer: Arc<dyn Mailer>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, config: AuthConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store,
            config,
            mailer,
        }
    }

    async fn resolve_actor(&self, user: &users::Model) -> Result<Actor, AuthError> {
        if user.is_superuser {
            return Ok(Actor::Admin { user_id: user.id });
        }

        let client = self.store.get_client_by_user_id(user.id).await?;
        Ok(match client {
            Some(client) => Actor::Owner {
                user_id: user.id,
                client_id: client.id,
            },
            None => Actor::Unlinked { user_id: user.id },
        })
    }

    async fn user_info(&self, user: &users::Model) -> Result<UserInfo, AuthError> {
        let client = self.store.get_client_by_user_id(user.id).await?;
        Ok(UserInfo {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            is_superuser: user.is_superuser,
            client_id: client.map(|c| c.id),
        })
    }

    async fn issue_pair(&self, user: &users::Model) -> Result<TokenPair, AuthError> {
        let access_token = jwt::issue_access(user, &self.config)?;
        let refresh = self.store.create_refresh_token(user.id).await?;

        Ok(TokenPair {
            access_token,
            refresh_token: refresh.token,
            user: self.user_info(user).await?,
        })
    }

    fn refresh_expired(&self, issued_at: chrono::DateTime<chrono::Utc>) -> bool {
        // Both sides timezone-aware; naive "now" would shift the boundary.
        issued_at + chrono::Duration::days(self.config.refresh_token_days) < chrono::Utc::now()
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        let is_valid =
            verify_password(user.password_hash.clone(), password.to_string()).await?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = user.id, "Login");
        self.issue_pair(&user).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let stored = self
            .store
            .get_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if stored.revoked || self.refresh_expired(stored.issued_at) {
            return Err(AuthError::Unauthorized);
        }

        let user = self
            .store
            .get_user_by_id(stored.user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if !user.is_active {
            return Err(AuthError::Unauthorized);
        }

        let rotated = self.store.rotate_refresh_token(stored.id, user.id).await?;
        let access_token = jwt::issue_access(&user, &self.config)?;

        Ok(TokenPair {
            access_token,
            refresh_token: rotated.token,
            user: self.user_info(&user).await?,
        })
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        let stored = self
            .store
            .get_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        self.store.revoke_refresh_token(stored.id).await?;
        info!(user_id = stored.user_id, "Refresh token revoked");
        Ok(())
    }

    async fn authenticate(&self, access_token: &str) -> Result<Actor, AuthError> {
        let claims =
            jwt::verify(access_token, &self.config).map_err(|_| AuthError::Unauthorized)?;

        // Special-purpose tokens (password reset) are not session tokens.
        if claims.purpose.is_some() {
            return Err(AuthError::Unauthorized);
        }

        let user = self
            .store
            .get_user_by_id(claims.sub)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if !user.is_active {
            return Err(AuthError::Unauthorized);
        }

        self.resolve_actor(&user).await
    }

    async fn current_user(&self, actor: &Actor) -> Result<UserInfo, AuthError> {
        let user_id = actor.user_id().ok_or(AuthError::Unauthorized)?;
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.user_info(&user).await
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        // Anti-enumeration: the caller learns nothing about whether the
        // account exists.
        if let Some(user) = self.store.get_user_by_email(email).await? {
            let token = jwt::issue_password_reset(&user, &self.config)?;
            let message = mailer::password_reset(&user.email, &self.config.frontend_url, &token);
            mailer::send_in_background(self.mailer.clone(), message);
        }

        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let claims = jwt::verify(token, &self.config).map_err(|_| AuthError::Unauthorized)?;
        if claims.purpose.as_deref() != Some(jwt::PURPOSE_PASSWORD_RESET) {
            return Err(AuthError::Unauthorized);
        }

        if new_password.len() < 8 {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters.".to_string(),
            ));
        }

        let user = self
            .store
            .get_user_by_id(claims.sub)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        self.store.set_user_password(user.id, new_password).await?;
        // A reset account must become usable even if it was provisioned
        // inactive.
        if !user.is_active {
            self.store.set_user_active(user.id, true).await?;
        }
        self.store.revoke_all_refresh_tokens(user.id).await?;

        info!(user_id = user.id, "Password reset");
        Ok(())
    }

    async fn delete_user(&self, actor: &Actor, user_id: i32) -> Result<(), AuthError> {
        if !actor.is_admin() {
            return Err(AuthError::PermissionDenied);
        }

        if actor.user_id() == Some(user_id) {
            return Err(AuthError::Validation(
                "Cannot delete your own account.".to_string(),
            ));
        }

        if !self.store.delete_user(user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        info!(user_id, "User deleted");
        Ok(())
    }
}
