//! The API endpoint URIs.

/// The liveness probe, does not require authentication.
pub const HEALTH: &str = "/api/health";
/// The route for rendering a PDF expense report.
pub const GENERATE_REPORT: &str = "/api/generate-report";
/// The route for generating natural-language spending insights.
pub const GENERATE_INSIGHTS: &str = "/api/generate-insights";

// These tests are here so that we know the route strings are valid URIs.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::HEALTH);
        assert_endpoint_is_valid_uri(endpoints::GENERATE_REPORT);
        assert_endpoint_is_valid_uri(endpoints::GENERATE_INSIGHTS);
    }
}
