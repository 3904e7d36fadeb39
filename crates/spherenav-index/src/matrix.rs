//! Precomputed all-pairs distance and bearing tables
//!
//! Built once after indexing: O(n²) time and memory paid up front so that
//! every neighbor query reads a contiguous row instead of recomputing
//! trigonometry.

use std::time::Instant;

use crate::index::NodeIndex;

/// Dense n×n distance (meters) and bearing (degrees) matrices.
///
/// Row and column `i` belong to the node in index slot `i`. The diagonal is
/// `0.0` in both tables.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryMatrix {
    size: usize,
    distances: Vec<f64>,
    bearings: Vec<f64>,
}

impl GeometryMatrix {
    /// Compute every ordered pair for the nodes currently in the index
    pub fn compute_all(index: &NodeIndex) -> Self {
        let started = Instant::now();
        let nodes = index.nodes();
        let size = nodes.len();

        let mut distances = vec![0.0; size * size];
        let mut bearings = vec![0.0; size * size];

        for (i, a) in nodes.iter().enumerate() {
            for (j, b) in nodes.iter().enumerate().skip(i + 1) {
                // One haversine per unordered pair keeps the table exactly symmetric
                let distance = a.gps.distance_to(&b.gps);
                distances[i * size + j] = distance;
                distances[j * size + i] = distance;

                bearings[i * size + j] = a.gps.bearing_to(&b.gps);
                bearings[j * size + i] = b.gps.bearing_to(&a.gps);
            }
        }

        tracing::info!(
            nodes = size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Computed distance and bearing matrices"
        );

        Self { size, distances, bearings }
    }

    /// Number of nodes covered
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, slot: usize) -> bool {
        slot < self.size
    }

    pub fn distance(&self, from: usize, to: usize) -> Option<f64> {
        self.cell(from, to).map(|i| self.distances[i])
    }

    pub fn bearing(&self, from: usize, to: usize) -> Option<f64> {
        self.cell(from, to).map(|i| self.bearings[i])
    }

    /// Distances from one node to every slot
    pub fn distance_row(&self, from: usize) -> Option<&[f64]> {
        self.row(&self.distances, from)
    }

    /// Bearings from one node to every slot
    pub fn bearing_row(&self, from: usize) -> Option<&[f64]> {
        self.row(&self.bearings, from)
    }

    /// Heap bytes held by both tables
    pub fn memory_bytes(&self) -> usize {
        (self.distances.len() + self.bearings.len()) * std::mem::size_of::<f64>()
    }

    /// Bytes a matrix over `nodes` entries would need
    pub fn estimated_bytes(nodes: usize) -> usize {
        2 * nodes * nodes * std::mem::size_of::<f64>()
    }

    fn cell(&self, from: usize, to: usize) -> Option<usize> {
        (from < self.size && to < self.size).then(|| from * self.size + to)
    }

    fn row<'a>(&self, table: &'a [f64], from: usize) -> Option<&'a [f64]> {
        (from < self.size).then(|| &table[from * self.size..(from + 1) * self.size])
    }
}
