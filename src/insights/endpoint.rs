//! Defines the endpoint for generating spending insights.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    AppState,
    auth::AuthenticatedUser,
    insights::{
        InsightGenerator, InsightRequest, InsightSource, OfflineInsightGenerator,
        summary::{CategoryMetadata, SpendingSummary, TOP_CATEGORY_COUNT, format_amount},
    },
    json::ApiJson,
};

/// The message returned for a period without transactions.
pub const NO_DATA_MESSAGE: &str =
    "No transactions found for this period. Add some transactions to get personalized insights!";

/// The error message shown to clients when the offline summary was used.
const FALLBACK_ERROR_MESSAGE: &str = "AI service unavailable";

/// The state needed to generate insights.
#[derive(Clone)]
pub struct InsightsState {
    /// Produces the insight text.
    pub insight_generator: Arc<dyn InsightGenerator>,
}

impl FromRef<AppState> for InsightsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            insight_generator: state.insight_generator.clone(),
        }
    }
}

/// The statistics that accompany an insight.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsightMetadata {
    transaction_count: usize,
    total: String,
    top_categories: Vec<CategoryMetadata>,
    period: String,
}

impl InsightMetadata {
    fn new(request: &InsightRequest, summary: &SpendingSummary) -> Self {
        Self {
            transaction_count: summary.transaction_count,
            total: format_amount(summary.total),
            top_categories: summary
                .top_categories(TOP_CATEGORY_COUNT)
                .iter()
                .map(CategoryMetadata::from)
                .collect(),
            period: request.period_label(),
        }
    }
}

#[derive(Debug, Serialize)]
struct InsightResponse {
    insights: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<InsightMetadata>,
}

impl InsightResponse {
    fn success(insights: String, metadata: Option<InsightMetadata>) -> Self {
        Self {
            insights,
            success: true,
            fallback: None,
            error: None,
            metadata,
        }
    }

    fn fallback(insights: String, metadata: InsightMetadata) -> Self {
        Self {
            insights,
            success: false,
            fallback: Some(true),
            error: Some(FALLBACK_ERROR_MESSAGE),
            metadata: Some(metadata),
        }
    }
}

/// A route handler that summarises the spending in the request body.
///
/// Always responds with 200 once the body has been parsed: if the insight
/// provider fails, the offline summary is returned with `fallback: true`.
pub async fn generate_insights_endpoint(
    State(state): State<InsightsState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<InsightRequest>,
) -> Response {
    if request.transactions.is_empty() {
        tracing::info!("No transactions to analyse for user {}", user.id);
        return Json(InsightResponse::success(NO_DATA_MESSAGE.to_owned(), None)).into_response();
    }

    let summary = SpendingSummary::from_transactions(&request.transactions);
    let metadata = InsightMetadata::new(&request, &summary);

    let response = match state.insight_generator.generate(&request, &summary).await {
        Ok(insight) => match insight.source {
            InsightSource::Provider | InsightSource::Offline => {
                InsightResponse::success(insight.text, Some(metadata))
            }
            InsightSource::Fallback { reason } => {
                tracing::warn!("Sent the offline summary to user {}: {reason}", user.id);
                InsightResponse::fallback(insight.text, metadata)
            }
        },
        Err(error) => {
            tracing::error!("Could not generate insights for user {}: {error}", user.id);
            InsightResponse::fallback(OfflineInsightGenerator.compose(&request, &summary), metadata)
        }
    };

    Json(response).into_response()
}
