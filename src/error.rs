use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use tracing::error;

/// Domain error kinds surfaced by the directory and the attendance engine.
/// Storage details are logged, never sent to the client; every other kind
/// carries a message that is safe to surface.
#[derive(Debug, thiserror::Error)]
pub enum HrError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    UniquenessViolation(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    PermissionDenied(&'static str),

    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Translates a unique-constraint integrity error into its domain kind.
/// Anything else stays a storage failure.
pub fn on_unique_violation(err: sqlx::Error, message: &str) -> HrError {
    if let sqlx::Error::Database(ref db) = err {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return HrError::UniquenessViolation(message.to_string());
        }
    }
    HrError::Storage(err)
}

impl actix_web::ResponseError for HrError {
    fn status_code(&self) -> StatusCode {
        match self {
            HrError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            HrError::UniquenessViolation(_) => StatusCode::CONFLICT,
            HrError::NotFound(_) => StatusCode::NOT_FOUND,
            HrError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            HrError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            HrError::Storage(e) => {
                error!(error = %e, "storage failure");
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
