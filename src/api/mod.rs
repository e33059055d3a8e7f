use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, ClientService, ConsolidateService, DashboardService, LogMailer, Mailer,
    PackageService, SeaOrmAuthService, SeaOrmClientService, SeaOrmConsolidateService,
    SeaOrmDashboardService, SeaOrmPackageService,
};

pub mod auth;
mod clients;
mod consolidates;
mod dashboard;
mod error;
mod packages;
mod types;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub client_service: Arc<dyn ClientService>,

    pub package_service: Arc<dyn PackageService>,

    pub consolidate_service: Arc<dyn ConsolidateService>,

    pub dashboard_service: Arc<dyn DashboardService>,
}

pub fn create_app_state(config: Config, store: Store) -> Arc<AppState> {
    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new(config.email.from_address.clone()));

    let auth_service = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        config.auth.clone(),
        mailer.clone(),
    ));
    let client_service = Arc::new(SeaOrmClientService::new(store.clone()));
    let package_service = Arc::new(SeaOrmPackageService::new(store.clone()));
    let consolidate_service = Arc::new(SeaOrmConsolidateService::new(store.clone(), mailer));
    let dashboard_service = Arc::new(SeaOrmDashboardService::new(store.clone()));

    Arc::new(AppState {
        config,
        store,
        auth_service,
        client_service,
        package_service,
        consolidate_service,
        dashboard_service,
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/revoke", post(auth::revoke))
        .route("/auth/verify", post(auth::verify))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.store.ping().await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("ok"))))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/users/{id}", delete(auth::delete_user))
        .route("/clients", get(clients::list_clients))
        .route("/clients", post(clients::create_client))
        .route("/clients/{id}", get(clients::get_client))
        .route("/clients/{id}", put(clients::update_client))
        .route("/clients/{id}", delete(clients::delete_client))
        .route("/packages", get(packages::list_packages))
        .route("/packages", post(packages::create_package))
        .route("/packages/{id}", get(packages::get_package))
        .route("/packages/{id}", put(packages::update_package))
        .route("/packages/{id}", delete(packages::delete_package))
        .route("/consolidates", get(consolidates::list_consolidates))
        .route("/consolidates", post(consolidates::create_consolidate))
        .route("/consolidates/{id}", get(consolidates::get_consolidate))
        .route("/consolidates/{id}", put(consolidates::update_consolidate))
        .route("/consolidates/{id}", delete(consolidates::delete_consolidate))
        .route("/dashboard", get(dashboard::stats))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
