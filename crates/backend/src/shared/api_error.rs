use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::shared::api_error::{ApiErrorBody, ApiErrorKind};
use thiserror::Error;

/// Ошибка REST-обработчика, отдаётся как `{ "error", "kind" }`
#[derive(Debug, Error)]
pub enum ApiError {
    /// База не открылась при старте
    #[error("database is not available")]
    Unavailable,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Unavailable => ApiErrorKind::Unavailable,
            ApiError::NotFound(_) => ApiErrorKind::NotFound,
            ApiError::BadRequest(_) => ApiErrorKind::BadRequest,
            ApiError::Internal(_) => ApiErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(e) => tracing::error!("request failed: {:#}", e),
            ApiError::Unavailable => tracing::warn!("request rejected: database unavailable"),
            _ => tracing::debug!("request rejected: {}", self),
        }
        let body = ApiErrorBody::new(self.kind(), self.to_string());
        (self.status(), Json(body)).into_response()
    }
}
