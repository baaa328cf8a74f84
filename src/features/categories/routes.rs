use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::core::middleware::basic_auth_middleware;
use crate::core::state::AppState;
use crate::features::auth::Authorizer;
use crate::features::categories::handlers;

/// Create routes for the categories feature
///
/// Update and delete (both verbs) sit behind the Basic auth gate.
pub fn routes(state: AppState, authorizer: Arc<dyn Authorizer>) -> Router {
    let protected = Router::new()
        .route(
            "/catalog/categories/{id}/update",
            get(handlers::category_update_get).post(handlers::category_update_post),
        )
        .route(
            "/catalog/categories/{id}/delete",
            get(handlers::category_delete_get).post(handlers::category_delete_post),
        )
        .route_layer(from_fn_with_state(authorizer, basic_auth_middleware));

    Router::new()
        .route("/catalog/categories", get(handlers::category_list))
        .route(
            "/catalog/categories/create",
            get(handlers::category_create_get).post(handlers::category_create_post),
        )
        .route("/catalog/categories/{id}", get(handlers::category_detail))
        .merge(protected)
        .with_state(state)
}
