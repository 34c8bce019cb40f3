use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use biblio_core::error::{ErrorCategory, LibraryError};

/// Error returned by REST handlers and the auth layer.
///
/// Rendered as `{"success": false, "error": "...", "code": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error("{0}")]
    BadRequest(String),

    #[error("missing or invalid bearer token")]
    Unauthorized,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Library(err) => match err.category() {
                ErrorCategory::Validation => StatusCode::BAD_REQUEST,
                ErrorCategory::Conflict => StatusCode::CONFLICT,
                ErrorCategory::NotFound => StatusCode::NOT_FOUND,
                ErrorCategory::Configuration | ErrorCategory::Internal => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Library(err) => match err.category() {
                ErrorCategory::Validation => "validation",
                ErrorCategory::Conflict => "conflict",
                ErrorCategory::NotFound => "not_found",
                ErrorCategory::Configuration => "configuration",
                ErrorCategory::Internal => "internal",
            },
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized => "unauthorized",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(
                error.cause_chain = ?self,
                error.message = %self,
                "Unexpected error happened"
            );
        }
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
            "code": self.code(),
        }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use biblio_core::{application::ApplicationError, domain::DomainError};

    use super::*;

    #[test]
    fn categories_map_to_statuses() {
        let missing = ApiError::from(LibraryError::from(ApplicationError::not_found("Book", 9)));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.code(), "not_found");

        let duplicate = ApiError::from(LibraryError::from(DomainError::DuplicateIsbn {
            isbn: "9788420412146".into(),
        }));
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let lock = ApiError::from(LibraryError::from(ApplicationError::StoreLockError));
        assert_eq!(lock.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
