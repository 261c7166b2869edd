//! Verifies bearer tokens by asking the managed backend's auth service.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

/// The identity the auth provider resolved from a bearer token.
///
/// Route handlers can use the function argument
/// `Extension(user): Extension<AuthenticatedUser>` to receive it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthenticatedUser {
    /// The backend's ID for the user.
    pub id: String,
    /// The user's email address, if the backend returned one.
    #[serde(default)]
    pub email: Option<String>,
}

/// The ways verifying a token can fail.
///
/// None of these are shown to the client, they all become a 401 response.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthError {
    /// The provider rejected the token, e.g. because it expired or was forged.
    #[error("the auth provider rejected the token with status {0}")]
    Rejected(u16),

    /// The provider could not be reached or returned an unreadable response.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not verify the token with the auth provider: {0}")]
    Provider(String),
}

/// Something that can turn a bearer token into a user identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Verify `token` and return the identity it belongs to.
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// Verifies tokens against the managed backend's `/auth/v1/user` endpoint.
#[derive(Debug, Clone)]
pub struct BackendAuthProvider {
    client: reqwest::Client,
    user_url: String,
    service_key: String,
}

impl BackendAuthProvider {
    /// Create a provider for the backend at `backend_url`.
    ///
    /// `client` should be shared with the other outbound callers so that
    /// connections are pooled.
    pub fn new(client: reqwest::Client, backend_url: &str, service_key: &str) -> Self {
        Self {
            client,
            user_url: format!("{}/auth/v1/user", backend_url.trim_end_matches('/')),
            service_key: service_key.to_owned(),
        }
    }
}

#[async_trait]
impl AuthProvider for BackendAuthProvider {
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let response = self
            .client
            .get(&self.user_url)
            .header("apikey", &self.service_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|error| AuthError::Provider(error.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<AuthenticatedUser>()
                .await
                .map_err(|error| AuthError::Provider(error.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AuthError::Rejected(response.status().as_u16()))
            }
            status => Err(AuthError::Provider(format!(
                "unexpected status {status} from the auth provider"
            ))),
        }
    }
}
