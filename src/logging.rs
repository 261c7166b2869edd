//! Middleware for logging requests and responses.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
        request, response,
    },
    middleware::Next,
    response::Response,
};

use crate::error_response;

/// The number of bytes of a body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level with the
/// `Authorization` header redacted.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated and
/// the full body is logged at the `debug` level.
/// Bodies that are not text, e.g. PDF reports, are passed through without
/// being buffered.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let request = if is_text(&parts.headers) {
        let body_bytes = match to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!("Could not read request body: {error}");
                return error_response(StatusCode::BAD_REQUEST, "Could not read request body");
            }
        };
        log_request(&parts, &String::from_utf8_lossy(&body_bytes));
        Request::from_parts(parts, Body::from(body_bytes))
    } else {
        log_request(&parts, "<binary body omitted>");
        Request::from_parts(parts, body)
    };

    let response = next.run(request).await;
    let (parts, body) = response.into_parts();

    if !is_text(&parts.headers) {
        log_response(&parts, "<binary body omitted>");
        return Response::from_parts(parts, body);
    }

    match to_bytes(body, usize::MAX).await {
        Ok(body_bytes) => {
            log_response(&parts, &String::from_utf8_lossy(&body_bytes));
            Response::from_parts(parts, Body::from(body_bytes))
        }
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Whether the body described by `headers` is worth logging as text.
///
/// Bodies without a content type are assumed to be text, most are empty.
fn is_text(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE) else {
        return true;
    };

    content_type.to_str().is_ok_and(|content_type| {
        content_type.starts_with("text/")
            || content_type.starts_with("application/json")
            || content_type.starts_with("application/x-www-form-urlencoded")
    })
}

fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();
    if headers.contains_key(AUTHORIZATION) {
        headers.insert(AUTHORIZATION, HeaderValue::from_static(REDACTED));
    }

    headers
}

/// Cut `body` to at most [LOG_BODY_LENGTH_LIMIT] bytes without splitting a character.
fn truncate_body(body: &str) -> Option<&str> {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return None;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    Some(&body[..end])
}

fn log_request(parts: &request::Parts, body: &str) {
    let headers = redact_headers(&parts.headers);

    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!(
                "Received request: {} {}\nheaders: {headers:#?}\nbody: {truncated}...",
                parts.method,
                parts.uri
            );
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!(
            "Received request: {} {}\nheaders: {headers:#?}\nbody: {body:?}",
            parts.method,
            parts.uri
        ),
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!(
                "Sending response: {}\nheaders: {:#?}\nbody: {truncated}...",
                parts.status,
                parts.headers
            );
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!(
            "Sending response: {}\nheaders: {:#?}\nbody: {body:?}",
            parts.status,
            parts.headers
        ),
    }
}
