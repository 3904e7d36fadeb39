use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use geojson::FeatureCollection;
use spherenav_core::PanoramaNode;

use crate::dto::{NeighborQuery, ReloadResponse};
use crate::error::ApiError;
use crate::services::SphereService;
use crate::state::AppState;

pub async fn list_spheres_geojson(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FeatureCollection>, ApiError> {
    tracing::info!("Listing spheres as GeoJSON");

    let collection = SphereService::list_geojson(&state).await?;
    Ok(Json(collection))
}

pub async fn get_sphere(
    State(state): State<Arc<AppState>>,
    Path(node_id): Path<String>,
    Query(query): Query<NeighborQuery>,
) -> Result<Json<PanoramaNode>, ApiError> {
    let params = query.resolve(&state.config)?;

    tracing::info!(
        node_id = %node_id,
        max_range = params.max_range,
        sectors = params.sectors,
        "Fetching sphere with neighbors"
    );

    let node = SphereService::node_with_neighbors(&state, &node_id, params).await?;
    Ok(Json(node))
}

pub async fn reload_spheres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, ApiError> {
    tracing::info!("Reloading sphere sources");

    let result = SphereService::reload(&state).await?;
    Ok(Json(result))
}
