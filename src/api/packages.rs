use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::{NewPackage, PackageChanges};
use crate::domain::{Actor, Page, PageParams};
use crate::entities::packages;
use crate::services::UpdatePackageInput;

#[derive(Deserialize, Default)]
pub struct PackageListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search: Option<String>,
    pub order_by: Option<String>,
    /// Filter to packages that are (not) part of a consolidate.
    pub consolidated: Option<bool>,
    /// Admin-only narrowing to one client's packages.
    pub client_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct CreatePackageRequest {
    pub barcode: String,
    pub courier: String,
    pub client_id: i32,
    #[serde(default)]
    pub other_courier: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub dimension_unit: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub weight_unit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub purchase_link: Option<String>,
    #[serde(default)]
    pub real_price: Option<f64>,
    #[serde(default)]
    pub service_price: Option<f64>,
    #[serde(default)]
    pub arrival_date: Option<chrono::NaiveDate>,
}

#[derive(Deserialize, Default)]
pub struct UpdatePackageRequest {
    /// Never accepted; the barcode is immutable once the package exists.
    pub barcode: Option<String>,
    pub courier: Option<String>,
    pub other_courier: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub dimension_unit: Option<String>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub description: Option<String>,
    pub purchase_link: Option<String>,
    pub real_price: Option<f64>,
    pub service_price: Option<f64>,
    pub arrival_date: Option<chrono::NaiveDate>,
    pub client_id: Option<i32>,
}

/// GET /packages
pub async fn list_packages(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PackageListQuery>,
) -> Result<Json<ApiResponse<Page<packages::Model>>>, ApiError> {
    let params = PageParams {
        page: query.page,
        page_size: query.page_size,
        search: query.search,
        order_by: query.order_by,
    };

    let page = state
        .package_service
        .list(&actor, params, query.consolidated, query.client_id)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /packages/{id}
pub async fn get_package(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<packages::Model>>, ApiError> {
    let package = state.package_service.get(&actor, id).await?;
    Ok(Json(ApiResponse::success(package)))
}

/// POST /packages
pub async fn create_package(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreatePackageRequest>,
) -> Result<Json<ApiResponse<packages::Model>>, ApiError> {
    let input = NewPackage {
        barcode: payload.barcode,
        courier: payload.courier,
        other_courier: payload.other_courier,
        length: payload.length,
        width: payload.width,
        height: payload.height,
        dimension_unit: payload.dimension_unit,
        weight: payload.weight,
        weight_unit: payload.weight_unit,
        description: payload.description,
        purchase_link: payload.purchase_link,
        real_price: payload.real_price,
        service_price: payload.service_price,
        arrival_date: payload.arrival_date,
        client_id: payload.client_id,
    };

    let package = state.package_service.create(&actor, input).await?;
    Ok(Json(ApiResponse::success(package)))
}

/// PUT /packages/{id}
pub async fn update_package(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePackageRequest>,
) -> Result<Json<ApiResponse<packages::Model>>, ApiError> {
    let input = UpdatePackageInput {
        barcode: payload.barcode,
        changes: PackageChanges {
            courier: payload.courier,
            other_courier: payload.other_courier.map(Some),
            length: payload.length.map(Some),
            width: payload.width.map(Some),
            height: payload.height.map(Some),
            dimension_unit: payload.dimension_unit.map(Some),
            weight: payload.weight.map(Some),
            weight_unit: payload.weight_unit.map(Some),
            description: payload.description.map(Some),
            purchase_link: payload.purchase_link.map(Some),
            real_price: payload.real_price.map(Some),
            service_price: payload.service_price.map(Some),
            arrival_date: payload.arrival_date.map(Some),
            client_id: payload.client_id,
        },
    };

    let package = state.package_service.update(&actor, id, input).await?;
    Ok(Json(ApiResponse::success(package)))
}

/// DELETE /packages/{id}
pub async fn delete_package(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.package_service.delete(&actor, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Package deleted",
    ))))
}
