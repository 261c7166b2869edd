//! Natural-language spending insights.
//!
//! Insights are produced by an [InsightGenerator]. The live generator asks the
//! generative-AI provider, the offline generator fills in a template from the
//! same statistics, and [FallbackInsightGenerator] chains the two so that a
//! provider failure still produces a usable answer.

mod endpoint;
mod fallback;
mod gemini;
mod offline;
mod prompt;
mod summary;

use async_trait::async_trait;
use serde::Deserialize;

use crate::transaction::{PeriodMonth, TransactionSnapshot, deserialize_optional_year, period_label};

pub use endpoint::{InsightsState, NO_DATA_MESSAGE, generate_insights_endpoint};
pub use fallback::FallbackInsightGenerator;
pub use gemini::GeminiInsightGenerator;
pub use offline::OfflineInsightGenerator;
pub use summary::SpendingSummary;

pub(crate) use summary::{format_amount, format_currency};

/// The request body for generating insights.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InsightRequest {
    /// The transactions to analyse, in the order the client listed them.
    pub transactions: Vec<TransactionSnapshot>,
    /// The month being analysed.
    #[serde(default)]
    pub month: Option<PeriodMonth>,
    /// The year being analysed.
    #[serde(default, deserialize_with = "deserialize_optional_year")]
    pub year: Option<i32>,
    /// The budget ceiling for the period.
    #[serde(default)]
    pub budget: Option<f64>,
}

impl InsightRequest {
    /// The period in prose, e.g. "March 2024".
    pub fn period_label(&self) -> String {
        period_label(self.month.as_ref(), self.year)
    }
}

/// Where the text of an [Insight] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightSource {
    /// Written by the generative-AI provider.
    Provider,
    /// Filled in from the offline template.
    Offline,
    /// Filled in from the offline template because the provider failed.
    Fallback {
        /// Why the provider failed, for logging only.
        reason: String,
    },
}

/// A textual summary of a period's spending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
    /// The summary, formatted as markdown.
    pub text: String,
    /// Where the summary came from.
    pub source: InsightSource,
}

/// The ways generating an insight can fail.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InsightError {
    /// The provider could not be reached or the request timed out.
    #[error("could not reach the insight provider: {0}")]
    Request(String),

    /// The provider answered with an error status.
    #[error("the insight provider returned status {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The start of the response body.
        body: String,
    },

    /// The provider's response could not be parsed.
    #[error("the insight provider returned a malformed response: {0}")]
    MalformedResponse(String),

    /// The provider's response did not contain any text.
    #[error("the insight provider returned no text")]
    EmptyResponse,
}

/// Something that can summarise a period's spending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Produce an insight for `request`.
    ///
    /// `summary` holds the statistics computed from `request.transactions`.
    async fn generate(
        &self,
        request: &InsightRequest,
        summary: &SpendingSummary,
    ) -> Result<Insight, InsightError>;
}
