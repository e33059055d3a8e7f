//! Domain service for package arrivals.

use thiserror::Error;

use crate::db::{NewPackage, PackageChanges};
use crate::domain::{Actor, Page, PageParams};
use crate::entities::packages;

/// Fields a package listing may be sorted on.
pub const SORTABLE_FIELDS: &[&str] = &[
    "id",
    "barcode",
    "courier",
    "weight",
    "arrival_date",
    "client_name",
    "created_at",
    "updated_at",
];

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Package not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for PackageError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PackageError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Update payload. The barcode is carried separately because it is immutable;
/// supplying one fails the update regardless of its value.
#[derive(Debug, Clone, Default)]
pub struct UpdatePackageInput {
    pub barcode: Option<String>,
    pub changes: PackageChanges,
}

#[async_trait::async_trait]
pub trait PackageService: Send + Sync {
    /// Lists packages visible to the actor, optionally filtered to
    /// (un)consolidated ones. The `client_id` filter only narrows admin
    /// listings; owners always see their own packages only.
    async fn list(
        &self,
        actor: &Actor,
        params: PageParams,
        consolidated: Option<bool>,
        client_id: Option<i32>,
    ) -> Result<Page<packages::Model>, PackageError>;

    async fn get(&self, actor: &Actor, id: i32) -> Result<packages::Model, PackageError>;

    async fn create(&self, actor: &Actor, input: NewPackage)
    -> Result<packages::Model, PackageError>;

    /// # Errors
    ///
    /// Returns [`PackageError::Validation`] when a barcode is supplied, or
    /// when moving a consolidated package to another client.
    async fn update(
        &self,
        actor: &Actor,
        id: i32,
        input: UpdatePackageInput,
    ) -> Result<packages::Model, PackageError>;

    /// # Errors
    ///
    /// Returns [`PackageError::Validation`] while the package belongs to a
    /// consolidate.
    async fn delete(&self, actor: &Actor, id: i32) -> Result<(), PackageError>;
}
