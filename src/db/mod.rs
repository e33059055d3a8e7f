use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::SortOrder;
use crate::entities::{clients, consolidates, packages, refresh_tokens, users};

pub mod migrator;
pub mod repositories;

pub use repositories::client::{ClientChanges, NewClient};
pub use repositories::consolidate::{ConsolidateChanges, NewConsolidate};
pub use repositories::package::{NewPackage, PackageChanges};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") && !db_url.contains("mode=memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn client_repo(&self) -> repositories::client::ClientRepository {
        repositories::client::ClientRepository::new(self.conn.clone())
    }

    fn package_repo(&self) -> repositories::package::PackageRepository {
        repositories::package::PackageRepository::new(self.conn.clone())
    }

    fn consolidate_repo(&self) -> repositories::consolidate::ConsolidateRepository {
        repositories::consolidate::ConsolidateRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn refresh_token_repo(&self) -> repositories::refresh_token::RefreshTokenRepository {
        repositories::refresh_token::RefreshTokenRepository::new(self.conn.clone())
    }

    // ========== Clients ==========

    pub async fn create_client(
        &self,
        data: NewClient,
        user_id: Option<i32>,
    ) -> Result<clients::Model> {
        self.client_repo().create(data, user_id).await
    }

    pub async fn get_client(&self, id: i32) -> Result<Option<clients::Model>> {
        self.client_repo().get(id).await
    }

    pub async fn get_client_by_user_id(&self, user_id: i32) -> Result<Option<clients::Model>> {
        self.client_repo().get_by_user_id(user_id).await
    }

    pub async fn update_client(
        &self,
        client: clients::Model,
        changes: ClientChanges,
    ) -> Result<clients::Model> {
        self.client_repo().update(client, changes).await
    }

    pub async fn delete_client(&self, id: i32) -> Result<bool> {
        self.client_repo().delete(id).await
    }

    pub async fn list_clients(
        &self,
        search: Option<&str>,
        order: (&str, SortOrder),
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<clients::Model>, u64)> {
        self.client_repo().list(search, order, page, page_size).await
    }

    pub async fn count_clients(&self) -> Result<u64> {
        self.client_repo().count().await
    }

    // ========== Packages ==========

    pub async fn create_package(&self, data: NewPackage) -> Result<packages::Model> {
        self.package_repo().create(data).await
    }

    pub async fn get_package(&self, id: i32) -> Result<Option<packages::Model>> {
        self.package_repo().get(id).await
    }

    pub async fn get_packages_by_ids(&self, ids: &[i32]) -> Result<Vec<packages::Model>> {
        self.package_repo().get_by_ids(ids).await
    }

    pub async fn get_packages_for_consolidate(
        &self,
        consolidate_id: i32,
    ) -> Result<Vec<packages::Model>> {
        self.package_repo().get_for_consolidate(consolidate_id).await
    }

    pub async fn update_package(
        &self,
        package: packages::Model,
        changes: PackageChanges,
    ) -> Result<packages::Model> {
        self.package_repo().update(package, changes).await
    }

    pub async fn delete_package(&self, id: i32) -> Result<bool> {
        self.package_repo().delete(id).await
    }

    pub async fn list_packages(
        &self,
        client_scope: Option<i32>,
        consolidated: Option<bool>,
        search: Option<&str>,
        order: (&str, SortOrder),
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<packages::Model>, u64)> {
        self.package_repo()
            .list(client_scope, consolidated, search, order, page, page_size)
            .await
    }

    pub async fn count_packages(&self, client_scope: Option<i32>) -> Result<u64> {
        self.package_repo().count(client_scope).await
    }

    pub async fn count_packages_since(
        &self,
        client_scope: Option<i32>,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64> {
        self.package_repo().count_since(client_scope, cutoff).await
    }

    pub async fn count_unconsolidated_packages(&self, client_scope: Option<i32>) -> Result<u64> {
        self.package_repo().count_unconsolidated(client_scope).await
    }

    pub async fn count_pending_packages(&self, client_scope: Option<i32>) -> Result<u64> {
        self.package_repo().count_pending(client_scope).await
    }

    pub async fn count_packages_with_consolidate_status(
        &self,
        client_scope: Option<i32>,
        status: &str,
    ) -> Result<u64> {
        self.package_repo()
            .count_with_consolidate_status(client_scope, status)
            .await
    }

    pub async fn package_price_totals(&self, client_scope: Option<i32>) -> Result<(f64, f64)> {
        self.package_repo().price_totals(client_scope).await
    }

    pub async fn recent_packages(
        &self,
        client_scope: Option<i32>,
        limit: u64,
    ) -> Result<Vec<packages::Model>> {
        self.package_repo().recent(client_scope, limit).await
    }

    // ========== Consolidates ==========

    pub async fn create_consolidate(&self, data: NewConsolidate) -> Result<consolidates::Model> {
        self.consolidate_repo().create(data).await
    }

    pub async fn get_consolidate(&self, id: i32) -> Result<Option<consolidates::Model>> {
        self.consolidate_repo().get(id).await
    }

    pub async fn update_consolidate(
        &self,
        consolidate: consolidates::Model,
        changes: ConsolidateChanges,
    ) -> Result<consolidates::Model> {
        self.consolidate_repo().update(consolidate, changes).await
    }

    pub async fn delete_consolidate(&self, id: i32) -> Result<bool> {
        self.consolidate_repo().delete(id).await
    }

    pub async fn list_consolidates(
        &self,
        client_scope: Option<i32>,
        status: Option<&str>,
        search: Option<&str>,
        order: (&str, SortOrder),
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<consolidates::Model>, u64)> {
        self.consolidate_repo()
            .list(client_scope, status, search, order, page, page_size)
            .await
    }

    pub async fn count_consolidates(&self, client_scope: Option<i32>) -> Result<u64> {
        self.consolidate_repo().count(client_scope).await
    }

    pub async fn consolidate_status_counts(
        &self,
        client_scope: Option<i32>,
    ) -> Result<Vec<(String, i64)>> {
        self.consolidate_repo().status_counts(client_scope).await
    }

    pub async fn recent_consolidates(
        &self,
        client_scope: Option<i32>,
        limit: u64,
    ) -> Result<Vec<consolidates::Model>> {
        self.consolidate_repo().recent(client_scope, limit).await
    }

    // ========== Users ==========

    pub async fn create_user(
        &self,
        email: &str,
        username: Option<&str>,
        password_hash: String,
        is_superuser: bool,
        is_active: bool,
    ) -> Result<users::Model> {
        self.user_repo()
            .create(email, username, password_hash, is_superuser, is_active)
            .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn set_user_password(&self, user_id: i32, new_password: &str) -> Result<()> {
        self.user_repo().set_password(user_id, new_password).await
    }

    pub async fn set_user_active(&self, user_id: i32, is_active: bool) -> Result<()> {
        self.user_repo().set_active(user_id, is_active).await
    }

    pub async fn delete_user(&self, user_id: i32) -> Result<bool> {
        self.user_repo().delete(user_id).await
    }

    // ========== Refresh tokens ==========

    pub async fn create_refresh_token(&self, user_id: i32) -> Result<refresh_tokens::Model> {
        self.refresh_token_repo().create(user_id).await
    }

    pub async fn get_refresh_token(&self, token: &str) -> Result<Option<refresh_tokens::Model>> {
        self.refresh_token_repo().get_by_token(token).await
    }

    pub async fn rotate_refresh_token(
        &self,
        old_id: i32,
        user_id: i32,
    ) -> Result<refresh_tokens::Model> {
        self.refresh_token_repo().rotate(old_id, user_id).await
    }

    pub async fn revoke_refresh_token(&self, id: i32) -> Result<()> {
        self.refresh_token_repo().revoke(id).await
    }

    pub async fn revoke_all_refresh_tokens(&self, user_id: i32) -> Result<u64> {
        self.refresh_token_repo().revoke_all_for_user(user_id).await
    }
}
