use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::AssetError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::services::cut_out_update::UpdateError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `INVALID_REQUEST`,
    /// `TOKEN_MISSING`, `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `NOT_FOUND`,
    /// `USERNAME_TAKEN`, `DUPLICATE_KEY`, `ASSET_MISSING`, `KEY_CONFLICT`,
    /// `ASSET_RENAME_FAILED`, `UPDATE_FAILED`, `INCONSISTENT_STATE`,
    /// `PAYLOAD_TOO_LARGE`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "SKU must be 1-64 characters")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// A required request parameter is absent.
    InvalidRequest(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    NotFound(String),
    UsernameTaken,
    DuplicateKey,
    AssetMissing(String),
    KeyConflict(String),
    AssetRenameFailed(String),
    UpdateFailed(String),
    /// Remote asset and database record disagree; an operator must reconcile them.
    InconsistentState(String),
    PayloadTooLarge { limit: u64 },
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "INVALID_REQUEST",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid username or password".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::UsernameTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "USERNAME_TAKEN",
                    message: "Username or email is already registered".into(),
                },
            ),
            AppError::DuplicateKey => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "DUPLICATE_KEY",
                    message: "A cut-out with these values already exists".into(),
                },
            ),
            AppError::AssetMissing(key) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "ASSET_MISSING",
                    message: format!("Original image '{key}' was not found on the asset host"),
                },
            ),
            AppError::KeyConflict(key) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "KEY_CONFLICT",
                    message: format!("An image already exists under key '{key}'"),
                },
            ),
            AppError::AssetRenameFailed(detail) => {
                tracing::error!("Asset rename failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "ASSET_RENAME_FAILED",
                        message: "Failed to update the image".into(),
                    },
                )
            }
            AppError::UpdateFailed(detail) => {
                tracing::error!("Cut-out update failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "UPDATE_FAILED",
                        message: "Failed to update the record".into(),
                    },
                )
            }
            AppError::InconsistentState(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    code: "INCONSISTENT_STATE",
                    message: msg,
                },
            ),
            AppError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    code: "PAYLOAD_TOO_LARGE",
                    message: format!("Image exceeds the {limit} byte limit"),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<AssetError> for AppError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::NotFound(key) => AppError::NotFound(format!("Asset '{key}' not found")),
            AssetError::InvalidKey(msg) => AppError::Validation(msg),
            AssetError::SizeLimitExceeded { limit, .. } => AppError::PayloadTooLarge { limit },
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<UpdateError> for AppError {
    fn from(err: UpdateError) -> Self {
        match err {
            UpdateError::InvalidRequest => {
                AppError::InvalidRequest("Cut-out id is required".into())
            }
            UpdateError::NotFound(id) => AppError::NotFound(format!("Cut-out {id} not found")),
            UpdateError::AssetMissing { key } => AppError::AssetMissing(key),
            UpdateError::KeyConflict { key } => AppError::KeyConflict(key),
            UpdateError::AssetRenameFailed(detail) => AppError::AssetRenameFailed(detail),
            UpdateError::DuplicateKey(detail) => {
                tracing::debug!("Update rejected by unique constraint: {detail}");
                AppError::DuplicateKey
            }
            UpdateError::UpdateFailed(detail) => AppError::UpdateFailed(detail),
            err @ UpdateError::InconsistentState { .. } => {
                AppError::InconsistentState(err.to_string())
            }
        }
    }
}
