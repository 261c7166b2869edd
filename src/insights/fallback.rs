//! Recovers from provider failures by switching to the offline generator.

use async_trait::async_trait;

use crate::insights::{
    Insight, InsightError, InsightGenerator, InsightRequest, InsightSource,
    OfflineInsightGenerator, summary::SpendingSummary,
};

/// Wraps a primary generator and substitutes the offline summary when it fails.
///
/// The result is tagged with [InsightSource::Fallback] so callers can tell the
/// client that the text did not come from the provider.
#[derive(Debug, Clone)]
pub struct FallbackInsightGenerator<P> {
    primary: P,
    offline: OfflineInsightGenerator,
}

impl<P> FallbackInsightGenerator<P>
where
    P: InsightGenerator,
{
    /// Create a generator that tries `primary` first.
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            offline: OfflineInsightGenerator,
        }
    }
}

#[async_trait]
impl<P> InsightGenerator for FallbackInsightGenerator<P>
where
    P: InsightGenerator,
{
    async fn generate(
        &self,
        request: &InsightRequest,
        summary: &SpendingSummary,
    ) -> Result<Insight, InsightError> {
        match self.primary.generate(request, summary).await {
            Ok(insight) => Ok(insight),
            Err(error) => {
                tracing::warn!("Insight provider failed, using the offline summary: {error}");

                Ok(Insight {
                    text: self.offline.compose(request, summary),
                    source: InsightSource::Fallback {
                        reason: error.to_string(),
                    },
                })
            }
        }
    }
}
