//! Application router configuration with protected and unprotected route definitions.

use std::any::Any;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post},
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};

use crate::{
    AppState,
    auth::auth_guard,
    endpoints,
    health::get_health,
    insights::generate_insights_endpoint,
    internal_server_error::internal_server_error,
    logging::logging_middleware,
    not_found::get_404_not_found,
    report::generate_report_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new().route(endpoints::HEALTH, get(get_health));

    let protected_routes = Router::new()
        .route(endpoints::GENERATE_REPORT, post(generate_report_endpoint))
        .route(
            endpoints::GENERATE_INSIGHTS,
            post(generate_insights_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let expose_error_details = state.environment.exposes_error_details();
    let cors = cors_layer(&state.allowed_origin);

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            internal_server_error(panic, expose_error_details)
        }))
        .layer(cors)
}

/// Allow the web client at `allowed_origin` to call the API from the browser.
///
/// An origin that is not a valid header value allows no cross-origin requests.
fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    match allowed_origin.trim_end_matches('/').parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(error) => {
            tracing::error!("Ignoring invalid allowed origin {allowed_origin:?}: {error}");
            cors
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        AppState, AuthError, AuthenticatedUser, Environment, Insight, InsightSource,
        auth::MockAuthProvider, build_router, endpoints, insights::MockInsightGenerator,
    };

    const CLIENT_ORIGIN: &str = "http://localhost:3000";

    fn get_test_server(
        auth_provider: MockAuthProvider,
        insight_generator: MockInsightGenerator,
    ) -> TestServer {
        let state = AppState::with_collaborators(
            Arc::new(auth_provider),
            Arc::new(insight_generator),
            Environment::Development,
            CLIENT_ORIGIN,
        );

        TestServer::new(build_router(state)).expect("Could not create test server.")
    }

    fn accepting_auth_provider() -> MockAuthProvider {
        let mut auth_provider = MockAuthProvider::new();
        auth_provider.expect_verify_token().returning(|_| {
            Ok(AuthenticatedUser {
                id: "user-1".to_owned(),
                email: None,
            })
        });
        auth_provider
    }

    fn report_body() -> Value {
        json!({
            "month": 3,
            "year": 2024,
            "transactions": [{"amount": 12.5, "category": "Food", "date": "2024-03-01"}],
        })
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let mut auth_provider = MockAuthProvider::new();
        auth_provider.expect_verify_token().never();
        let mut insight_generator = MockInsightGenerator::new();
        insight_generator.expect_generate().never();
        let server = get_test_server(auth_provider, insight_generator);

        for route in [endpoints::GENERATE_REPORT, endpoints::GENERATE_INSIGHTS] {
            let response = server.post(route).json(&report_body()).await;

            response.assert_status(StatusCode::UNAUTHORIZED);
            response.assert_json(&json!({"error": "Unauthorized"}));
        }
    }

    #[tokio::test]
    async fn rejected_token_never_reaches_generator() {
        let mut auth_provider = MockAuthProvider::new();
        auth_provider
            .expect_verify_token()
            .times(1)
            .returning(|_| Err(AuthError::Rejected(401)));
        let mut insight_generator = MockInsightGenerator::new();
        insight_generator.expect_generate().never();
        let server = get_test_server(auth_provider, insight_generator);

        let response = server
            .post(endpoints::GENERATE_INSIGHTS)
            .add_header("Authorization", "Bearer expired")
            .json(&report_body())
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn generates_insights_with_valid_token() {
        let mut insight_generator = MockInsightGenerator::new();
        insight_generator.expect_generate().times(1).returning(|_, _| {
            Ok(Insight {
                text: "## Overview\nSpending is steady.".to_owned(),
                source: InsightSource::Provider,
            })
        });
        let server = get_test_server(accepting_auth_provider(), insight_generator);

        let response = server
            .post(endpoints::GENERATE_INSIGHTS)
            .add_header("Authorization", "Bearer valid")
            .json(&report_body())
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["success"], true);
        assert_eq!(body["metadata"]["total"], "12.50");
    }

    #[tokio::test]
    async fn generates_report_with_valid_token() {
        let server = get_test_server(accepting_auth_provider(), MockInsightGenerator::new());

        let response = server
            .post(endpoints::GENERATE_REPORT)
            .add_header("Authorization", "Bearer valid")
            .json(&report_body())
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "application/pdf");
        assert!(response.as_bytes().starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn report_without_period_is_bad_request() {
        let server = get_test_server(accepting_auth_provider(), MockInsightGenerator::new());

        let response = server
            .post(endpoints::GENERATE_REPORT)
            .add_header("Authorization", "Bearer valid")
            .json(&json!({"transactions": []}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Month and year are required"}));
    }

    #[tokio::test]
    async fn health_is_public() {
        let mut auth_provider = MockAuthProvider::new();
        auth_provider.expect_verify_token().never();
        let server = get_test_server(auth_provider, MockInsightGenerator::new());

        let response = server.get(endpoints::HEALTH).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server(MockAuthProvider::new(), MockInsightGenerator::new());

        let response = server.get("/api/does-not-exist").await;

        response.assert_status_not_found();
        response.assert_json(&json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn allows_configured_origin() {
        let server = get_test_server(MockAuthProvider::new(), MockInsightGenerator::new());

        let response = server
            .get(endpoints::HEALTH)
            .add_header("Origin", CLIENT_ORIGIN)
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("access-control-allow-origin"), CLIENT_ORIGIN);
        assert_eq!(response.header("access-control-allow-credentials"), "true");
    }

    #[tokio::test]
    async fn ignores_other_origins() {
        let server = get_test_server(MockAuthProvider::new(), MockInsightGenerator::new());

        let response = server
            .get(endpoints::HEALTH)
            .add_header("Origin", "https://evil.test")
            .await;

        response.assert_status_ok();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }
}
