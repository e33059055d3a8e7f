//! Role-scoped dashboard aggregation.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::domain::Actor;
use crate::entities::{consolidates, packages};

pub const DEFAULT_RECENT_LIMIT: u64 = 5;
pub const MAX_RECENT_LIMIT: u64 = 20;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for DashboardError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Counts are scoped to the actor. The financial sums and the client count
/// are admin-only and reported as zero for everyone else, regardless of what
/// the actor's own rows would sum to.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_clients: u64,
    pub total_packages: u64,
    pub packages_last_30_days: u64,
    pub unconsolidated_packages: u64,
    pub packages_pending: u64,
    pub packages_in_transit: u64,
    pub packages_delivered: u64,
    pub total_consolidates: u64,
    pub consolidates_by_status: BTreeMap<String, u64>,
    pub total_real_price: f64,
    pub total_service_price: f64,
    pub recent_packages: Vec<packages::Model>,
    pub recent_consolidates: Vec<consolidates::Model>,
}

#[async_trait::async_trait]
pub trait DashboardService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`DashboardError::AuthenticationRequired`] for anonymous actors.
    async fn stats(
        &self,
        actor: &Actor,
        recent_limit: Option<u64>,
    ) -> Result<DashboardStats, DashboardError>;
}
