use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::RagError;

/// Errors returned by the HTTP handlers as `{ "error": message }`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Rag(#[from] RagError),

    #[error("Request worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    #[inline]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Rag(RagError::EmptyQuestion) => StatusCode::BAD_REQUEST,
            Self::Rag(RagError::Generation(_) | RagError::Embedding(_)) => StatusCode::BAD_GATEWAY,
            Self::Rag(_) | Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    #[inline]
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    #[inline]
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
