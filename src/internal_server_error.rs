//! Turns a panic inside a route handler into a JSON 500 response.

use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct InternalServerError {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// Build the response sent when a handler panics.
///
/// The panic message is always logged but only included in the response body
/// as `detail` when `expose_detail` is set.
pub fn internal_server_error(panic: Box<dyn Any + Send + 'static>, expose_detail: bool) -> Response {
    let message = panic_message(panic.as_ref());
    tracing::error!("Handler panicked: {message}");

    let body = InternalServerError {
        error: "Internal server error",
        detail: expose_detail.then_some(message),
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else {
        "unknown panic".to_owned()
    }
}
