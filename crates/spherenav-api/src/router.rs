use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Spheres
        .route("/v3/spheres/geojson", get(handlers::list_spheres_geojson))
        .route("/v3/spheres/reload", post(handlers::reload_spheres))
        .route("/v3/spheres/{node_id}", get(handlers::get_sphere))

        .with_state(state)
}
