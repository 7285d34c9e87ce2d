// Error types shared by the HTTP layer

use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed form, missing file field or rejected extension
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    /// Anything that went wrong talking to object storage
    #[error("Failed to {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: StorageError,
    },
}

impl AppError {
    pub fn storage(operation: &'static str, source: StorageError) -> Self {
        match source {
            StorageError::NotFound(key) => AppError::NotFound(key),
            source => AppError::Storage { operation, source },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent to the client. Storage details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Storage { operation, .. } => format!("Failed to {}", operation),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Storage { .. } => tracing::error!("Storage error: {}", self),
            _ => tracing::debug!("Client error: {}", self),
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
