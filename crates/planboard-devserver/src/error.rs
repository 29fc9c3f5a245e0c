use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use planboard_shared::api::{Envelope, ErrorBody};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Resource not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    /// A well-formed request the backend refuses on business grounds. Sent
    /// back with a 2xx status and an `error` body.
    #[error("{0}")]
    Domain(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Domain(msg) => {
                tracing::debug!("Refused request: {}", msg);
                return (StatusCode::OK, Json(Envelope::<()>::error(msg.clone()))).into_response();
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
