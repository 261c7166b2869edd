//! The live insight generator backed by the Gemini `generateContent` API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::insights::{
    Insight, InsightError, InsightGenerator, InsightRequest, InsightSource,
    prompt::build_prompt, summary::SpendingSummary,
};

/// How much of an error response body is kept in [InsightError::Status].
const ERROR_BODY_LIMIT: usize = 200;

/// Generates insights by sending a prompt to the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiInsightGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiInsightGenerator {
    /// Create a generator that calls `model` at `base_url`.
    ///
    /// `client` should be shared with the other outbound callers so that
    /// connections are pooled.
    pub fn new(client: reqwest::Client, base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{model}:generateContent",
                base_url.trim_end_matches('/')
            ),
            api_key: api_key.to_owned(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// The text of the first candidate, or `None` if it is missing or blank.
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        let text = text.trim();
        (!text.is_empty()).then(|| text.to_owned())
    }
}

#[async_trait]
impl InsightGenerator for GeminiInsightGenerator {
    async fn generate(
        &self,
        request: &InsightRequest,
        summary: &SpendingSummary,
    ) -> Result<Insight, InsightError> {
        let prompt = build_prompt(request, summary);
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 1024,
            },
        };

        tracing::debug!(
            "Requesting insights for {} transactions",
            summary.transaction_count
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| InsightError::Request(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let text = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|error| InsightError::MalformedResponse(error.to_string()))?
            .into_text()
            .ok_or(InsightError::EmptyResponse)?;

        Ok(Insight {
            text,
            source: InsightSource::Provider,
        })
    }
}
