use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid input; shown to the user as is.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The order-placement transaction failed and was rolled back.
    #[error("order transaction failed: {0:#}")]
    Transaction(anyhow::Error),

    #[error("login required")]
    Unauthorized,

    #[error("insufficient role")]
    Forbidden,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Transaction(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text that is safe to show to a client. Store-level detail never leaves the server.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Transaction(_) => "order could not be placed, please retry".into(),
            AppError::Internal(_) => "an error occurred".into(),
            other => other.to_string(),
        }
    }

    /// Logs the error at a level matching its class.
    pub fn log(&self) {
        match self {
            AppError::Transaction(e) => error!(error = %format!("{e:#}"), "order transaction rolled back"),
            AppError::Internal(e) => error!(error = %format!("{e:#}"), "internal error"),
            other => tracing::debug!(error = %other, "request rejected"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let body = ErrorBody {
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
#[error("invalid status value {0:?}")]
pub struct InvalidStatus(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_detail_is_not_public() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused at 10.0.0.3"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "an error occurred");

        let err = AppError::Transaction(anyhow::anyhow!("duplicate key"));
        assert!(!err.public_message().contains("duplicate"));
    }

    #[test]
    fn user_errors_keep_their_message() {
        let err = AppError::validation("cart is empty");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "cart is empty");
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
    }
}
