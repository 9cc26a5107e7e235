use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{predict::PredictError, storage::StorageError, web::auth::AuthError};

pub enum ApiError {
    Auth(AuthError),
    InvalidToken,
    Validation(String),
    UnknownSatellite(u32),
    NotConfigured(&'static str),
    PassNotFound,
    NoUpcomingPass,
    UnknownAccount,
    Prediction(PredictError),
    Storage(StorageError),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Storage(e)
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        ApiError::Prediction(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(e) => e.into_response(),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("invalid_token")),
            )
                .into_response(),
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message("validation_failed", &msg)),
            )
                .into_response(),
            ApiError::UnknownSatellite(norad_id) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message(
                    "unknown_satellite",
                    &format!("NORAD ID: {norad_id} caused an error, settings not saved."),
                )),
            )
                .into_response(),
            ApiError::NotConfigured(feature) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::with_message(
                    "not_configured",
                    &format!("{feature} is not configured on this server"),
                )),
            )
                .into_response(),
            ApiError::PassNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::with_message(
                    "pass_not_found",
                    "No pass with that AOS in the last pass data served to this session.",
                )),
            )
                .into_response(),
            ApiError::NoUpcomingPass => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("no_upcoming_pass")),
            )
                .into_response(),
            ApiError::UnknownAccount => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message(
                    "unknown_account",
                    "Email not found in database",
                )),
            )
                .into_response(),
            ApiError::Prediction(e) => {
                log::error!("Pass prediction failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::with_message("prediction_error", &e.to_string())),
                )
                    .into_response()
            }
            ApiError::Storage(e) => {
                log::error!("Account store failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::with_message("storage_error", &e.to_string())),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }

    /// Text to show a user: the message when present, else the error code.
    pub fn user_message(self) -> String {
        self.message.unwrap_or(self.error)
    }
}
