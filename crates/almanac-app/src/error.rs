use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Response, Scribe};
use serde_json::json;
use thiserror::Error;

use almanac_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] almanac_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] almanac_core::error::CoreError),

    /// The request body is missing, not JSON, or does not fit the expected shape.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// ## Summary
    /// Maps the error onto a status code and a JSON body.
    ///
    /// Server-side failures are logged here and rendered without detail.
    fn status_and_body(&self) -> (StatusCode, serde_json::Value) {
        match self {
            Self::ServiceError(ServiceError::Validation(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"message": "Validation error.", "errors": errors}),
            ),
            Self::InvalidBody(detail) => {
                tracing::debug!(%detail, "Rejected request body");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({
                        "message": "Validation error.",
                        "errors": {"body": ["The request body must be a valid JSON object."]},
                    }),
                )
            }
            Self::ServiceError(ServiceError::NotFound(resource)) => {
                tracing::debug!(resource, "Resource not found in caller's scope");
                (StatusCode::NOT_FOUND, json!({"message": "Not found."}))
            }
            Self::ServiceError(ServiceError::NotAuthenticated) => (
                StatusCode::UNAUTHORIZED,
                json!({"message": "Unauthenticated."}),
            ),
            other => {
                tracing::error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"message": "Server error."}),
                )
            }
        }
    }
}

impl Scribe for AppError {
    fn render(self, res: &mut Response) {
        let (status, body) = self.status_and_body();
        res.status_code(status);
        res.render(Json(body));
    }
}
