use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Failures surfaced by route handlers. Each maps to one status code and a
/// plain-text body.
#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown email or wrong password on login.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Protected route called without a valid session.
    #[error("unauthorized")]
    Unauthorized,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    /// Writing or reading an uploaded file failed.
    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::DuplicateEmail | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::DuplicateEmail => "Email already exists. Please use a different email.".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::NotFound => "Not found".to_string(),
            Self::Storage(_) | Self::Database(_) | Self::Internal(_) => {
                error!(error = %self, "request failed");
                "Internal server error".to_string()
            }
        };
        (status, body).into_response()
    }
}
