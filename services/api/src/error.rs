//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::platform::PlatformError;

/// Error taxonomy for user-facing operations
#[derive(Error, Debug)]
pub enum ApiError {
    /// No valid user session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The user has no stored platform credential
    #[error("No platform account is linked")]
    NotAuthorized,

    /// A selection key did not resolve to a row owned by the requesting user
    #[error("{0} not found")]
    LookupFailure(String),

    /// Bad signup/form input, including duplicate usernames
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The remote platform rejected or failed a call
    #[error("Platform error: {0}")]
    Platform(PlatformError),

    /// Anything else
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<PlatformError> for ApiError {
    fn from(err: PlatformError) -> Self {
        match err {
            // Missing credentials are the caller's problem, not the platform's.
            PlatformError::NotAuthorized => ApiError::NotAuthorized,
            PlatformError::CredentialStore(e) => ApiError::Internal(e),
            other => ApiError::Platform(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotAuthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::NotAuthorized => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::LookupFailure(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            ApiError::Platform(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
