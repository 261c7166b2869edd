use axum::{http::StatusCode, response::Response};

use crate::error_response;

/// The fallback handler for routes that do not exist.
pub async fn get_404_not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}
