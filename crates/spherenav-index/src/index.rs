use std::collections::HashMap;

use spherenav_core::geo::{SpatialGrid, DEFAULT_CELL_SIZE};
use spherenav_core::PanoramaNode;

/// Authoritative id → node mapping plus a coarse spatial grid.
///
/// Nodes keep their insertion order; every node gets a stable slot number
/// that the geometry matrix uses as its row/column index.
#[derive(Debug, Clone)]
pub struct NodeIndex {
    nodes: Vec<PanoramaNode>,
    slots: HashMap<String, usize>,
    grid: SpatialGrid,
}

impl NodeIndex {
    /// Create an empty index with the default grid cell size
    pub fn new() -> Self {
        Self::with_cell_size(DEFAULT_CELL_SIZE)
    }

    pub fn with_cell_size(cell_size: f64) -> Self {
        Self { nodes: Vec::new(), slots: HashMap::new(), grid: SpatialGrid::new(cell_size) }
    }

    /// Build an index from nodes in order
    pub fn from_nodes(nodes: impl IntoIterator<Item = PanoramaNode>, cell_size: f64) -> Self {
        let mut index = Self::with_cell_size(cell_size);
        for node in nodes {
            index.add_node(node);
        }
        index
    }

    /// Insert a node. A node whose id is already present replaces the old one in
    /// its existing slot.
    pub fn add_node(&mut self, node: PanoramaNode) {
        match self.slots.get(&node.id) {
            Some(&slot) => {
                tracing::warn!(id = %node.id, "Duplicate sphere id, keeping the latest feature");
                let previous = &self.nodes[slot];
                self.grid.remove(&previous.id, &previous.gps);
                self.grid.insert(node.id.clone(), &node.gps);
                self.nodes[slot] = node;
            }
            None => {
                self.grid.insert(node.id.clone(), &node.gps);
                self.slots.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&PanoramaNode> {
        self.slot_of(id).map(|slot| &self.nodes[slot])
    }

    pub fn slot_of(&self, id: &str) -> Option<usize> {
        self.slots.get(id).copied()
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[PanoramaNode] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = &PanoramaNode> {
        self.nodes.iter()
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        Self::new()
    }
}
