//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use dobi_types::error::{ChatError, DocumentError, RepositoryError};

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Document(DocumentError),
    History(RepositoryError),
    Validation(String),
    Internal(String),
}

impl From<DocumentError> for AppError {
    fn from(e: DocumentError) -> Self {
        AppError::Document(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::History(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Document(DocumentError::Io(msg)) => {
                (StatusCode::NOT_FOUND, "DIRECTORY_NOT_FOUND", msg.clone())
            }
            AppError::Document(e @ DocumentError::InvalidChunkConfig { .. }) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Document(e @ (DocumentError::Embedding(_) | DocumentError::Index(_))) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string())
            }
            AppError::Document(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DOCUMENT_ERROR", e.to_string())
            }
            AppError::History(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", "Conversation not found".to_string())
            }
            AppError::History(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "HISTORY_ERROR", e.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        }
        let body = ApiResponse::error(code, &message, Uuid::now_v7().to_string());
        (status, Json(body)).into_response()
    }
}
