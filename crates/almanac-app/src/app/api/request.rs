//! Request extraction shared by the JSON handlers.

use salvo::Request;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

/// ## Summary
/// Parses the JSON request body.
///
/// ## Errors
/// Returns `AppError::InvalidBody` if the body is missing, not JSON, or has the wrong shape.
pub async fn parse_body<T: DeserializeOwned>(req: &mut Request) -> AppResult<T> {
    req.parse_json::<T>()
        .await
        .map_err(|e| AppError::InvalidBody(e.to_string()))
}

/// ## Summary
/// Reads an integer query parameter, ignoring values that are not integers.
#[must_use]
pub fn query_id(req: &Request, name: &str) -> Option<i64> {
    req.query::<String>(name)
        .and_then(|raw| raw.parse::<i64>().ok())
}
