use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Build the complete axum Router with all routes.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/logs", post(handlers::ingest).get(handlers::list))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
