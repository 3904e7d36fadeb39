use std::fmt;

use spherenav_core::geo::DEFAULT_CELL_SIZE;
use spherenav_core::{Link, PanoramaNode, SphereConfig};

use crate::index::NodeIndex;
use crate::matrix::GeometryMatrix;
use crate::selector::{grid_candidates, matrix_candidates, select_spread};

/// Knobs for building a [`SphereGraph`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSettings {
    /// Grid cell edge in degrees
    pub cell_size: f64,
    /// Largest node count for which the dense matrices are built
    pub matrix_node_limit: usize,
}

impl GraphSettings {
    pub fn from_config(config: &SphereConfig) -> Self {
        Self { cell_size: config.grid_cell_size, matrix_node_limit: config.matrix_node_limit }
    }
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self { cell_size: DEFAULT_CELL_SIZE, matrix_node_limit: 3_000 }
    }
}

/// How candidate geometry is obtained for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborStrategy {
    /// Rows of the precomputed matrices
    Matrix,
    /// Grid scan with on-demand haversine
    GridScan,
}

impl fmt::Display for NeighborStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborStrategy::Matrix => write!(f, "matrix"),
            NeighborStrategy::GridScan => write!(f, "grid_scan"),
        }
    }
}

/// An immutable, fully built node index with its optional geometry matrices.
///
/// The matrices are computed from exactly the nodes in the index, so a graph
/// never answers from stale geometry; new data means a new graph.
#[derive(Debug, Clone)]
pub struct SphereGraph {
    index: NodeIndex,
    matrix: Option<GeometryMatrix>,
}

impl SphereGraph {
    /// Index the nodes and precompute the matrices when the node count allows it
    pub fn build(nodes: Vec<PanoramaNode>, settings: GraphSettings) -> Self {
        let index = NodeIndex::from_nodes(nodes, settings.cell_size);

        let matrix = if index.len() <= settings.matrix_node_limit {
            Some(GeometryMatrix::compute_all(&index))
        } else {
            tracing::warn!(
                nodes = index.len(),
                limit = settings.matrix_node_limit,
                estimated_bytes = GeometryMatrix::estimated_bytes(index.len()) as u64,
                "Too many nodes for pairwise matrices, using grid scan"
            );
            None
        };

        Self { index, matrix }
    }

    /// Index the nodes and always answer through the grid scan
    pub fn without_matrix(nodes: Vec<PanoramaNode>, cell_size: f64) -> Self {
        Self { index: NodeIndex::from_nodes(nodes, cell_size), matrix: None }
    }

    pub fn index(&self) -> &NodeIndex {
        &self.index
    }

    pub fn matrix(&self) -> Option<&GeometryMatrix> {
        self.matrix.as_ref()
    }

    pub fn strategy(&self) -> NeighborStrategy {
        if self.matrix.is_some() {
            NeighborStrategy::Matrix
        } else {
            NeighborStrategy::GridScan
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PanoramaNode> {
        self.index.get(id)
    }

    /// All nodes in load order
    pub fn nodes(&self) -> &[PanoramaNode] {
        self.index.nodes()
    }

    /// Closest neighbors of `target` within `max_range` meters, spread over
    /// `sectors` directions.
    ///
    /// Returns nothing for a target that is not in the index, a range that is
    /// not positive, or zero sectors.
    pub fn find_neighbors(&self, target: &PanoramaNode, max_range: f64, sectors: u32) -> Vec<Link> {
        if sectors == 0 || !(max_range > 0.0) {
            return Vec::new();
        }
        let Some(slot) = self.index.slot_of(&target.id) else {
            tracing::debug!(id = %target.id, "Neighbor lookup for a node outside the index");
            return Vec::new();
        };

        let candidates = match &self.matrix {
            Some(matrix) => matrix_candidates(&self.index, matrix, slot, max_range),
            None => {
                // Geometry comes from the indexed copy, not the caller's
                let indexed = &self.index.nodes()[slot];
                grid_candidates(&self.index, indexed, max_range)
            }
        };

        select_spread(candidates, sectors).into_iter().map(|c| c.node.link()).collect()
    }

    /// Copy of the node with `id` carrying freshly computed links
    pub fn node_with_links(&self, id: &str, max_range: f64, sectors: u32) -> Option<PanoramaNode> {
        let node = self.index.get(id)?;
        let links = self.find_neighbors(node, max_range, sectors);
        Some(node.with_links(links))
    }
}
