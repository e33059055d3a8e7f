use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::{ClientChanges, NewClient};
use crate::domain::{Actor, Page, PageParams};
use crate::entities::clients;

#[derive(Deserialize, Default)]
pub struct ClientListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search: Option<String>,
    pub order_by: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateClientRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub identification_number: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub main_street: Option<String>,
    #[serde(default)]
    pub secondary_street: Option<String>,
    #[serde(default)]
    pub building_number: Option<String>,
    #[serde(default)]
    pub mobile_phone_number: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// An `email` key in the payload is ignored; the login email never changes
/// through this endpoint.
#[derive(Deserialize, Default)]
pub struct UpdateClientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub identification_number: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub main_street: Option<String>,
    pub secondary_street: Option<String>,
    pub building_number: Option<String>,
    pub mobile_phone_number: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct DeleteClientQuery {
    /// When true the login account is removed too; otherwise it is only
    /// deactivated.
    #[serde(default)]
    pub delete_user: bool,
}

/// GET /clients
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<ApiResponse<Page<clients::Model>>>, ApiError> {
    let params = PageParams {
        page: query.page,
        page_size: query.page_size,
        search: query.search,
        order_by: query.order_by,
    };

    let page = state.client_service.list(&actor, params).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /clients/{id}
pub async fn get_client(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<clients::Model>>, ApiError> {
    let client = state.client_service.get(&actor, id).await?;
    Ok(Json(ApiResponse::success(client)))
}

/// POST /clients
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<Json<ApiResponse<clients::Model>>, ApiError> {
    let input = NewClient {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        identification_number: payload.identification_number.unwrap_or_default(),
        state: payload.state.unwrap_or_default(),
        city: payload.city.unwrap_or_default(),
        main_street: payload.main_street.unwrap_or_default(),
        secondary_street: payload.secondary_street.unwrap_or_default(),
        building_number: payload.building_number.unwrap_or_default(),
        mobile_phone_number: payload.mobile_phone_number.unwrap_or_default(),
        phone_number: payload.phone_number.unwrap_or_default(),
    };

    let client = state.client_service.create(&actor, input).await?;
    Ok(Json(ApiResponse::success(client)))
}

/// PUT /clients/{id}
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateClientRequest>,
) -> Result<Json<ApiResponse<clients::Model>>, ApiError> {
    let changes = ClientChanges {
        first_name: payload.first_name,
        last_name: payload.last_name,
        identification_number: payload.identification_number,
        state: payload.state,
        city: payload.city,
        main_street: payload.main_street,
        secondary_street: payload.secondary_street,
        building_number: payload.building_number,
        mobile_phone_number: payload.mobile_phone_number,
        phone_number: payload.phone_number,
    };

    let client = state.client_service.update(&actor, id, changes).await?;
    Ok(Json(ApiResponse::success(client)))
}

/// DELETE /clients/{id}
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Query(query): Query<DeleteClientQuery>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .client_service
        .delete(&actor, id, query.delete_user)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Client deleted",
    ))))
}
