use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::domain::{Actor, Page, PageParams};
use crate::entities::consolidates;
use crate::services::{ConsolidateDetail, CreateConsolidateInput, UpdateConsolidateInput};

#[derive(Deserialize, Default)]
pub struct ConsolidateListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search: Option<String>,
    pub order_by: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateConsolidateRequest {
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub delivery_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub comment: Option<String>,
    pub package_ids: Vec<i32>,
}

#[derive(Deserialize, Default)]
pub struct UpdateConsolidateRequest {
    pub description: Option<String>,
    pub status: Option<String>,
    pub delivery_date: Option<chrono::NaiveDate>,
    pub comment: Option<String>,
    pub package_ids: Option<Vec<i32>>,
}

/// GET /consolidates
pub async fn list_consolidates(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ConsolidateListQuery>,
) -> Result<Json<ApiResponse<Page<consolidates::Model>>>, ApiError> {
    let params = PageParams {
        page: query.page,
        page_size: query.page_size,
        search: query.search,
        order_by: query.order_by,
    };

    let page = state
        .consolidate_service
        .list(&actor, params, query.status)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /consolidates/{id}
pub async fn get_consolidate(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ConsolidateDetail>>, ApiError> {
    let consolidate = state.consolidate_service.get(&actor, id).await?;
    Ok(Json(ApiResponse::success(consolidate)))
}

/// POST /consolidates
pub async fn create_consolidate(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateConsolidateRequest>,
) -> Result<Json<ApiResponse<ConsolidateDetail>>, ApiError> {
    let input = CreateConsolidateInput {
        description: payload.description.unwrap_or_default(),
        status: payload.status,
        delivery_date: payload.delivery_date,
        comment: payload.comment,
        package_ids: payload.package_ids,
    };

    let consolidate = state.consolidate_service.create(&actor, input).await?;
    Ok(Json(ApiResponse::success(consolidate)))
}

/// PUT /consolidates/{id}
pub async fn update_consolidate(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateConsolidateRequest>,
) -> Result<Json<ApiResponse<ConsolidateDetail>>, ApiError> {
    let input = UpdateConsolidateInput {
        description: payload.description,
        status: payload.status,
        delivery_date: payload.delivery_date.map(Some),
        comment: payload.comment.map(Some),
        package_ids: payload.package_ids,
    };

    let consolidate = state.consolidate_service.update(&actor, id, input).await?;
    Ok(Json(ApiResponse::success(consolidate)))
}

/// DELETE /consolidates/{id}
pub async fn delete_consolidate(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.consolidate_service.delete(&actor, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Consolidate deleted",
    ))))
}
