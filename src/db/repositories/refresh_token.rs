use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::entities::refresh_tokens;

use super::user::generate_token;

pub struct RefreshTokenRepository {
    conn: DatabaseConnection,
}

impl RefreshTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Issue a fresh token for a user.
    pub async fn create(&self, user_id: i32) -> Result<refresh_tokens::Model> {
        let token = refresh_tokens::ActiveModel {
            token: Set(generate_token()),
            user_id: Set(user_id),
            revoked: Set(false),
            issued_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        token
            .insert(&self.conn)
            .await
            .context("Failed to insert refresh token")
    }

    pub async fn get_by_token(&self, token: &str) -> Result<Option<refresh_tokens::Model>> {
        refresh_tokens::Entity::find()
            .filter(refresh_tokens::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query refresh token")
    }

    /// Revoke the old token and issue a replacement atomically, so a crash
    /// between the two steps cannot leave the user without a valid token.
    pub async fn rotate(&self, old_id: i32, user_id: i32) -> Result<refresh_tokens::Model> {
        let txn = self.conn.begin().await?;

        let old = refresh_tokens::Entity::find_by_id(old_id)
            .one(&txn)
            .await
            .context("Failed to load refresh token for rotation")?
            .ok_or_else(|| anyhow::anyhow!("Refresh token not found: {old_id}"))?;

        let mut active: refresh_tokens::ActiveModel = old.into();
        active.revoked = Set(true);
        active.update(&txn).await?;

        let replacement = refresh_tokens::ActiveModel {
            token: Set(generate_token()),
            user_id: Set(user_id),
            revoked: Set(false),
            issued_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        let replacement = replacement.insert(&txn).await?;

        txn.commit().await?;
        Ok(replacement)
    }

    pub async fn revoke(&self, id: i32) -> Result<()> {
        let token = refresh_tokens::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to load refresh token for revocation")?
            .ok_or_else(|| anyhow::anyhow!("Refresh token not found: {id}"))?;

        let mut active: refresh_tokens::ActiveModel = token.into();
        active.revoked = Set(true);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn revoke_all_for_user(&self, user_id: i32) -> Result<u64> {
        use sea_orm::sea_query::Expr;

        let res = refresh_tokens::Entity::update_many()
            .col_expr(refresh_tokens::Column::Revoked, Expr::value(true))
            .filter(refresh_tokens::Column::UserId.eq(user_id))
            .filter(refresh_tokens::Column::Revoked.eq(false))
            .exec(&self.conn)
            .await
            .context("Failed to revoke refresh tokens for user")?;

        Ok(res.rows_affected)
    }
}
