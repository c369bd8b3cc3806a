use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use provider_cell::router::provider_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Phlebotomy marketplace API is running!" }))
        .nest("/providers", provider_routes(state))
}
