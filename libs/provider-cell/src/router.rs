use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn provider_routes(state: Arc<AppConfig>) -> Router {
    // Discovery is public; booking and profile management live elsewhere
    Router::new()
        .route("/search", get(handlers::search_providers))
        .route("/{provider_id}/availability", get(handlers::get_provider_availability))
        .with_state(state)
}
