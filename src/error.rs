use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<crate::orchestration::PayoutError> for AppError {
    fn from(err: crate::orchestration::PayoutError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<crate::orchestration::CreditError> for AppError {
    fn from(err: crate::orchestration::CreditError) -> Self {
        use crate::orchestration::CreditError;
        match err {
            CreditError::UnknownClick(id) => AppError::NotFound(format!("click {}", id)),
            CreditError::UnknownUser(id) => AppError::NotFound(format!("user {}", id)),
            CreditError::Db(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
