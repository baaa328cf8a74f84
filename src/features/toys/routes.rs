use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware::from_fn_with_state, routing::get, Router};

use crate::core::middleware::basic_auth_middleware;
use crate::core::state::AppState;
use crate::features::auth::Authorizer;
use crate::features::toys::dtos::MAX_IMAGE_SIZE;
use crate::features::toys::handlers;

/// Room for the image plus the text fields of the form
const FORM_BODY_LIMIT: usize = MAX_IMAGE_SIZE + 1024 * 1024;

/// Create routes for the toys feature
pub fn routes(state: AppState, authorizer: Arc<dyn Authorizer>) -> Router {
    let protected = Router::new()
        .route(
            "/catalog/toys/{id}/update",
            get(handlers::toy_update_get)
                .post(handlers::toy_update_post)
                .layer(DefaultBodyLimit::max(FORM_BODY_LIMIT)),
        )
        .route(
            "/catalog/toys/{id}/delete",
            get(handlers::toy_delete_get).post(handlers::toy_delete_post),
        )
        .route_layer(from_fn_with_state(authorizer, basic_auth_middleware));

    Router::new()
        .route("/catalog", get(handlers::index))
        .route("/catalog/toys", get(handlers::toy_list))
        .route(
            "/catalog/toys/create",
            get(handlers::toy_create_get)
                .post(handlers::toy_create_post)
                .layer(DefaultBodyLimit::max(FORM_BODY_LIMIT)),
        )
        .route("/catalog/toys/{id}", get(handlers::toy_detail))
        .merge(protected)
        .with_state(state)
}
