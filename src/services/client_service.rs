//! Domain service for client records and their portal accounts.

use thiserror::Error;

use crate::db::{ClientChanges, NewClient};
use crate::domain::{Actor, Page, PageParams};
use crate::entities::clients;

/// Fields a client listing may be sorted on.
pub const SORTABLE_FIELDS: &[&str] = &[
    "id",
    "first_name",
    "last_name",
    "full_name",
    "email",
    "identification_number",
    "created_at",
    "updated_at",
];

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Client not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ClientError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ClientError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait ClientService: Send + Sync {
    /// Lists the client roster. Admin only; owners fetch their own record
    /// through [`ClientService::get`].
    async fn list(
        &self,
        actor: &Actor,
        params: PageParams,
    ) -> Result<Page<clients::Model>, ClientError>;

    async fn get(&self, actor: &Actor, id: i32) -> Result<clients::Model, ClientError>;

    /// Registers a client together with an inactive portal account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] if the email already has an account.
    async fn create(&self, actor: &Actor, input: NewClient) -> Result<clients::Model, ClientError>;

    async fn update(
        &self,
        actor: &Actor,
        id: i32,
        changes: ClientChanges,
    ) -> Result<clients::Model, ClientError>;

    /// Removes a client. The linked account is deactivated unless
    /// `delete_user` asks for it to be removed as well.
    async fn delete(&self, actor: &Actor, id: i32, delete_user: bool) -> Result<(), ClientError>;
}
