//! Command line and environment configuration for the server.

use clap::{Parser, ValueEnum};

/// The default model used for spending insights.
pub const DEFAULT_AI_MODEL: &str = "gemini-1.5-flash";

/// The default base URL of the generative-AI provider.
pub const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// The deployment environment, controls how much error detail is returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    /// Local development, internal error details are included in responses.
    Development,
    /// Production, internal error details are only logged.
    Production,
}

impl Environment {
    /// Whether error details may be shown to clients.
    pub fn exposes_error_details(self) -> bool {
        self != Environment::Production
    }
}

/// The REST API server for Budget Buddy.
///
/// Every option can also be set with the environment variable shown in `--help`.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Base URL of the managed backend, e.g. "https://xyz.supabase.co".
    #[arg(long, env = "SUPABASE_URL")]
    pub backend_url: String,

    /// Service key sent to the managed backend when verifying tokens.
    #[arg(long, env = "SUPABASE_SERVICE_KEY", hide_env_values = true)]
    pub backend_service_key: String,

    /// API key for the generative-AI provider.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub ai_api_key: String,

    /// The model used to generate spending insights.
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_AI_MODEL)]
    pub ai_model: String,

    /// Base URL of the generative-AI provider.
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_AI_BASE_URL)]
    pub ai_base_url: String,

    /// The browser origin allowed to make cross-origin requests.
    #[arg(long, env = "CLIENT_URL", default_value = "http://localhost:3000")]
    pub allowed_origin: String,

    /// The deployment environment.
    #[arg(long, env = "APP_ENV", value_enum, default_value_t = Environment::Development)]
    pub environment: Environment,
}
