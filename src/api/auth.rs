use axum::{
    Extension, Json,
    extract::{Path, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::domain::Actor;
use crate::services::{TokenPair, UserInfo};

pub const REFRESH_COOKIE: &str = "refresh_token";

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Default)]
pub struct RefreshRequest {
    /// Falls back to the refresh cookie when absent.
    pub refresh_token: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the actor from the `Authorization: Bearer <token>` header and
/// stores it in request extensions for the handlers.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing access token".to_string()))?;

    let actor = state.auth_service.authenticate(&token).await?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get(header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    Some(token.trim().to_string())
}

/// Reads a cookie value out of the `Cookie` header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

fn refresh_cookie(state: &AppState, token: &str, max_age_secs: i64) -> String {
    let secure = if state.config.server.secure_cookies {
        "; Secure"
    } else {
        ""
    };
    format!(
        "{REFRESH_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/api/auth; Max-Age={max_age_secs}{secure}"
    )
}

/// Serializes the token pair and sets the refresh cookie alongside it.
fn token_pair_response(state: &AppState, pair: TokenPair) -> Result<Response, ApiError> {
    let max_age = state.config.auth.refresh_token_days * 24 * 60 * 60;
    let cookie = refresh_cookie(state, &pair.refresh_token, max_age);

    let mut response = Json(ApiResponse::success(pair)).into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        cookie
            .parse()
            .map_err(|e| ApiError::internal(format!("Failed to build cookie: {e}")))?,
    );
    Ok(response)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let pair = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    token_pair_response(&state, pair)
}

/// POST /auth/refresh
/// Exchanges a refresh token (body or cookie) for a new pair. The old token
/// is invalidated; replaying it fails.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Option<Json<RefreshRequest>>,
) -> Result<Response, ApiError> {
    let from_body = payload.and_then(|Json(p)| p.refresh_token);
    let token = from_body
        .or_else(|| cookie_value(&headers, REFRESH_COOKIE))
        .ok_or_else(|| ApiError::Unauthorized("Missing refresh token".to_string()))?;

    let pair = state.auth_service.refresh(&token).await?;

    token_pair_response(&state, pair)
}

/// POST /auth/revoke
/// Revokes the refresh token carried in the cookie and clears it.
pub async fn revoke(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let token = cookie_value(&headers, REFRESH_COOKIE)
        .ok_or_else(|| ApiError::Unauthorized("Missing refresh token".to_string()))?;

    state.auth_service.revoke(&token).await?;

    let mut response =
        Json(ApiResponse::success(MessageResponse::new("Token revoked"))).into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        refresh_cookie(&state, "", 0)
            .parse()
            .map_err(|e| ApiError::internal(format!("Failed to build cookie: {e}")))?,
    );
    Ok(response)
}

/// POST /auth/verify
/// Checks an access token and returns the user behind it.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let actor = state.auth_service.authenticate(&payload.token).await?;
    let user = state.auth_service.current_user(&actor).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = state.auth_service.current_user(&actor).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/forgot-password
/// Always answers success; whether the email exists is not disclosed.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth_service.forgot_password(&payload.email).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "If the email exists, a reset link has been sent",
    ))))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service
        .reset_password(&payload.token, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth_service.delete_user(&actor, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "User deleted",
    ))))
}
