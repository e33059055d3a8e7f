use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::domain::Actor;
use crate::services::DashboardStats;

#[derive(Deserialize, Default)]
pub struct DashboardQuery {
    /// How many recent packages/consolidates to include.
    pub limit: Option<u64>,
}

/// GET /dashboard
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let stats = state.dashboard_service.stats(&actor, query.limit).await?;
    Ok(Json(ApiResponse::success(stats)))
}
