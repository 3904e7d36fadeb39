use geojson::FeatureCollection;
use spherenav_core::models::nodes_to_feature_collection;
use spherenav_core::{PanoramaNode, Result, SphereError};
use spherenav_index::NeighborStrategy;

use crate::dto::{NeighborParams, ReloadResponse};
use crate::state::AppState;

/// Query facade over the lazily loaded sphere graph
pub struct SphereService;

impl SphereService {
    /// Every indexed node as a GeoJSON FeatureCollection, in load order
    pub async fn list_geojson(state: &AppState) -> Result<FeatureCollection> {
        let graph = state.loader.ensure_loaded().await?;
        Ok(nodes_to_feature_collection(graph.nodes()))
    }

    /// A copy of the node with its neighbor links filled in
    pub async fn node_with_neighbors(
        state: &AppState,
        id: &str,
        params: NeighborParams,
    ) -> Result<PanoramaNode> {
        let graph = state.loader.ensure_loaded().await?;
        graph
            .node_with_links(id, params.max_range, params.sectors)
            .ok_or_else(|| SphereError::NodeNotFound { id: id.to_string() })
    }

    /// Refetch every source and rebuild the graph
    pub async fn reload(state: &AppState) -> Result<ReloadResponse> {
        let graph = state.loader.reload().await?;
        Ok(ReloadResponse {
            nodes: graph.len(),
            matrix: graph.strategy() == NeighborStrategy::Matrix,
        })
    }
}
