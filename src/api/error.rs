//! HTTP mapping for the crate error type.

use super::response::ApiResponse;
use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

impl Error {
    /// Status code reported to API clients for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::SessionFinalized { .. } | Self::Duplicate { .. } => StatusCode::CONFLICT,
            Self::OutsideMarkingWindow { .. } | Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::AlreadyMarked { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Unauthorized { .. } | Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::PasswordHash { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to API clients. Internal failures are not echoed back.
    fn public_message(&self) -> String {
        match self {
            Self::Validation { message }
            | Self::Duplicate { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message } => message.clone(),
            Self::NotFound { entity, .. } => format!("{entity} not found"),
            Self::SessionFinalized { .. } => "Session finalized".to_string(),
            Self::OutsideMarkingWindow { .. } => "Outside allowed marking window".to_string(),
            Self::AlreadyMarked { .. } => {
                "Attendance already marked in the last 24 hours".to_string()
            }
            Self::Token(_) => "Invalid token".to_string(),
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::PasswordHash { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(ApiResponse::<()>::error(self.public_message()))).into_response()
    }
}
