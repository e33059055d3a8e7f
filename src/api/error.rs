use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AuthError, ClientError, ConsolidateError, DashboardError, PackageError};

#[derive(Debug)]
pub enum ApiError {
    PermissionDenied,

    NotFound(String),

    ValidationError(String),

    Unauthorized(String),

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::PermissionDenied => write!(f, "Permission denied"),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // No detail: existence of a forbidden resource is not confirmed
            ApiError::PermissionDenied => {
                (StatusCode::FORBIDDEN, "Permission denied".to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::PermissionDenied => ApiError::PermissionDenied,
            ClientError::NotFound => ApiError::NotFound("Client not found".to_string()),
            ClientError::Validation(msg) => ApiError::ValidationError(msg),
            ClientError::Database(msg) => ApiError::DatabaseError(msg),
            ClientError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<PackageError> for ApiError {
    fn from(err: PackageError) -> Self {
        match err {
            PackageError::PermissionDenied => ApiError::PermissionDenied,
            PackageError::NotFound => ApiError::NotFound("Package not found".to_string()),
            PackageError::Validation(msg) => ApiError::ValidationError(msg),
            PackageError::Database(msg) => ApiError::DatabaseError(msg),
            PackageError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<ConsolidateError> for ApiError {
    fn from(err: ConsolidateError) -> Self {
        match err {
            ConsolidateError::PermissionDenied => ApiError::PermissionDenied,
            ConsolidateError::NotFound => {
                ApiError::NotFound("Consolidate not found".to_string())
            }
            ConsolidateError::Validation(msg) => ApiError::ValidationError(msg),
            ConsolidateError::Database(msg) => ApiError::DatabaseError(msg),
            ConsolidateError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::AuthenticationRequired => {
                ApiError::Unauthorized("Authentication required".to_string())
            }
            DashboardError::Database(msg) => ApiError::DatabaseError(msg),
            DashboardError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::Unauthorized => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            AuthError::PermissionDenied => ApiError::PermissionDenied,
            AuthError::UserNotFound => ApiError::NotFound("User not found".to_string()),
            AuthError::Validation(msg) => ApiError::ValidationError(msg),
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
