//! Response envelope and HTTP error mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::error::{GeofenceError, ValidationError};

/// Envelope wrapped around every response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> (StatusCode, Json<Self>) {
        (
            StatusCode::OK,
            Json(Self {
                message: message.into(),
                status_code: StatusCode::OK.as_u16(),
                data: Some(data),
            }),
        )
    }
}

/// Handler error with status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] GeofenceError),

    #[error("Invalid JSON: {0}")]
    BadJson(#[from] JsonRejection),
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::Core(GeofenceError::Validation(error))
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Core(GeofenceError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(GeofenceError::Format { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(GeofenceError::Persistence { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadJson(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Core(GeofenceError::Validation(e)) => e.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }

        let body = ApiResponse::<()> {
            message: self.message(),
            status_code: status.as_u16(),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}
