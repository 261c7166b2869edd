//! A JSON extractor whose rejections use the crate's error responses.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::Error;

/// Like [axum::Json], but a body that cannot be parsed becomes
/// [Error::InvalidRequest], i.e. a 400 response with a JSON error message.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::warn!("Rejected request body: {rejection}");
                Err(Error::InvalidRequest(describe_rejection(&rejection)))
            }
        }
    }
}

fn describe_rejection(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected a request with `Content-Type: application/json`".to_owned()
        }
        _ => format!("Invalid request body: {}", rejection.body_text()),
    }
}
