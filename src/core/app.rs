use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, http::StatusCode, routing::get, Router};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::core::error::AppError;
use crate::core::middleware;
use crate::core::state::AppState;
use crate::features::auth::Authorizer;
use crate::features::{categories, toys};
use crate::shared::constants::CATALOG_URL;
use crate::shared::types::found;

async fn health_check() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> AppError {
    AppError::NotFound("Page not found".to_string())
}

/// Assemble the full application router
pub fn build_app(state: AppState, authorizer: Arc<dyn Authorizer>, max_body_size: usize) -> Router {
    Router::new()
        .route("/", get(|| async { found(CATALOG_URL) }))
        .route("/health", get(health_check))
        .merge(toys::routes(state.clone(), Arc::clone(&authorizer)))
        .merge(categories::routes(state, authorizer))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_size))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::shared::test_helpers::TestApp;

    #[tokio::test]
    async fn test_root_redirects_to_catalog() {
        let app = TestApp::new();

        let response = app.server.get("/").await;

        response.assert_status(StatusCode::FOUND);
        assert_eq!(response.header("location"), "/catalog");
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = TestApp::new();

        app.server.get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_unknown_route_renders_not_found_page() {
        let app = TestApp::new();

        let response = app.server.get("/no/such/page").await;

        response.assert_status_not_found();
        assert!(response.text().contains("Page not found"));
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let app = TestApp::new();

        let response = app.server.get("/health").await;

        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_index_shows_counts() {
        let app = TestApp::seeded().await;

        let response = app.server.get("/catalog").await;

        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("<strong>Toys:</strong> 2"));
        assert!(body.contains("<strong>Categories:</strong> 3"));
    }
}
