//! Domain service for consolidates: grouping packages into shipments with a
//! status lifecycle.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Actor, Page, PageParams};
use crate::entities::{consolidates, packages};

/// Fields a consolidate listing may be sorted on.
pub const SORTABLE_FIELDS: &[&str] = &[
    "id",
    "description",
    "status",
    "delivery_date",
    "client_name",
    "created_at",
    "updated_at",
];

#[derive(Debug, Error)]
pub enum ConsolidateError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Consolidate not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ConsolidateError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ConsolidateError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// The owning client is not a parameter: it is inferred from the packages,
/// which must all belong to one client.
#[derive(Debug, Clone)]
pub struct CreateConsolidateInput {
    pub description: String,
    pub status: String,
    pub delivery_date: Option<chrono::NaiveDate>,
    pub comment: Option<String>,
    pub package_ids: Vec<i32>,
}

/// Partial update. The client is immutable; `package_ids` replaces the whole
/// membership and is revalidated against the existing client.
#[derive(Debug, Clone, Default)]
pub struct UpdateConsolidateInput {
    pub description: Option<String>,
    pub status: Option<String>,
    pub delivery_date: Option<Option<chrono::NaiveDate>>,
    pub comment: Option<Option<String>>,
    pub package_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsolidateDetail {
    #[serde(flatten)]
    pub consolidate: consolidates::Model,
    pub packages: Vec<packages::Model>,
}

#[async_trait::async_trait]
pub trait ConsolidateService: Send + Sync {
    /// Lists consolidates visible to the actor, optionally filtered by status.
    async fn list(
        &self,
        actor: &Actor,
        params: PageParams,
        status: Option<String>,
    ) -> Result<Page<consolidates::Model>, ConsolidateError>;

    async fn get(&self, actor: &Actor, id: i32) -> Result<ConsolidateDetail, ConsolidateError>;

    /// Groups packages into a new consolidate.
    ///
    /// # Errors
    ///
    /// Returns [`ConsolidateError::Validation`] when the package set is empty,
    /// contains unknown ids, spans multiple clients, or contains an already
    /// consolidated package; and when the status is unrecognized or not an
    /// allowed initial status.
    async fn create(
        &self,
        actor: &Actor,
        input: CreateConsolidateInput,
    ) -> Result<ConsolidateDetail, ConsolidateError>;

    async fn update(
        &self,
        actor: &Actor,
        id: i32,
        input: UpdateConsolidateInput,
    ) -> Result<ConsolidateDetail, ConsolidateError>;

    /// Deletes the consolidate; member packages are detached, not deleted.
    async fn delete(&self, actor: &Actor, id: i32) -> Result<(), ConsolidateError>;
}
