//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use crate::{
    AuthProvider, BackendAuthProvider, Config, Environment, FallbackInsightGenerator,
    GeminiInsightGenerator, InsightGenerator,
};

/// The state of the REST server.
///
/// Cloning is cheap, the collaborators are shared behind [Arc]s.
#[derive(Clone)]
pub struct AppState {
    /// Verifies the bearer tokens sent with protected requests.
    pub auth_provider: Arc<dyn AuthProvider>,

    /// Produces the text for spending insights.
    pub insight_generator: Arc<dyn InsightGenerator>,

    /// The deployment environment, decides whether error details reach clients.
    pub environment: Environment,

    /// The browser origin allowed to make cross-origin requests.
    pub allowed_origin: String,
}

impl AppState {
    /// Create the state for the real backend and insight provider described by `config`.
    ///
    /// A single HTTP client is shared by both so they reuse connections.
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::new();

        let auth_provider = BackendAuthProvider::new(
            client.clone(),
            &config.backend_url,
            &config.backend_service_key,
        );
        let insight_generator = FallbackInsightGenerator::new(GeminiInsightGenerator::new(
            client,
            &config.ai_base_url,
            &config.ai_model,
            &config.ai_api_key,
        ));

        Self::with_collaborators(
            Arc::new(auth_provider),
            Arc::new(insight_generator),
            config.environment,
            &config.allowed_origin,
        )
    }

    /// Create the state from already constructed collaborators, e.g. test doubles.
    pub fn with_collaborators(
        auth_provider: Arc<dyn AuthProvider>,
        insight_generator: Arc<dyn InsightGenerator>,
        environment: Environment,
        allowed_origin: &str,
    ) -> Self {
        Self {
            auth_provider,
            insight_generator,
            environment,
            allowed_origin: allowed_origin.to_owned(),
        }
    }
}
