//! A liveness probe for load balancers and uptime checks.

use axum::{Json, response::IntoResponse};
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    timestamp: String,
}

/// A route handler that reports the server is up along with the current UTC time.
pub async fn get_health() -> impl IntoResponse {
    let now = OffsetDateTime::now_utc();

    Json(Health {
        status: "ok",
        timestamp: now.format(&Rfc3339).unwrap_or_else(|_| now.to_string()),
    })
}
