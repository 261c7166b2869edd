//! Budget Buddy is a personal-finance web app for students.
//!
//! This library provides the server half: a small JSON API that verifies
//! bearer tokens against the managed backend, turns a period's transactions
//! into natural-language spending insights, and renders expense reports as PDF.
//! All persistent data lives in the managed backend, the server only derives
//! output from request payloads.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod config;
mod endpoints;
mod health;
mod insights;
mod internal_server_error;
mod json;
mod logging;
mod not_found;
mod report;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{AuthError, AuthProvider, AuthenticatedUser, BackendAuthProvider};
pub use config::{Config, Environment};
pub use insights::{
    FallbackInsightGenerator, GeminiInsightGenerator, Insight, InsightError, InsightGenerator,
    InsightRequest, InsightSource, OfflineInsightGenerator,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{PeriodMonth, TransactionSnapshot};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur while handling a request.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The bearer token was missing or could not be verified.
    ///
    /// The reason is deliberately not part of the response.
    #[error("unauthorized")]
    Unauthorized,

    /// The request body could not be parsed or failed validation.
    ///
    /// The message is shown to the client, so it must not contain anything
    /// more sensitive than a description of what was wrong with the request.
    #[error("{0}")]
    InvalidRequest(String),

    /// Laying out or serializing the PDF report failed.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not render the report: {0}")]
    ReportRendering(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Unauthorized => error_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
            Error::InvalidRequest(message) => error_response(StatusCode::BAD_REQUEST, &message),
            Error::ReportRendering(detail) => {
                tracing::error!("Report generation failed: {detail}");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate report",
                )
            }
        }
    }
}

/// Build a JSON error response of the form `{"error": message}`.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn unauthorized_has_generic_body() {
        let response = Error::Unauthorized.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn invalid_request_is_bad_request() {
        let response = Error::InvalidRequest("Transactions must be an array".to_owned())
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rendering_failure_is_internal_server_error() {
        let response = Error::ReportRendering("font missing".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
