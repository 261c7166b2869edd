//! Authentication middleware that verifies bearer tokens before protected handlers run.

use std::sync::Arc;

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{AppState, Error, auth::AuthProvider};

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The service that verifies bearer tokens.
    pub auth_provider: Arc<dyn AuthProvider>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth_provider: state.auth_provider.clone(),
        }
    }
}

/// Middleware function that checks for a valid bearer token.
///
/// The token is verified by the auth provider and the resolved user is placed
/// into the request extensions before the request is executed normally.
/// Otherwise a 401 response is returned and the handler never runs.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user): Extension<AuthenticatedUser>` to receive the user.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let token = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_owned(),
        Err(error) => {
            tracing::warn!("Rejected request to {} without a bearer token: {error}", parts.uri);
            return Error::Unauthorized.into_response();
        }
    };

    let user = match state.auth_provider.verify_token(&token).await {
        Ok(user) => user,
        Err(error) => {
            tracing::warn!("Rejected request to {}: {error}", parts.uri);
            return Error::Unauthorized.into_response();
        }
    };

    tracing::debug!("Authenticated user {}", user.id);
    parts.extensions.insert(user);

    next.run(Request::from_parts(parts, body)).await
}
