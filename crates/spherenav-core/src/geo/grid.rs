//! Coarse spatial bucketing of node ids
//!
//! Cells are addressed by integer multiples of the cell size, so a position
//! lands in the same cell as [`grid_key`](crate::geo::grid_key) would put it.

use std::collections::{BTreeSet, HashMap};

use crate::models::Position;

/// Default cell edge in degrees (~111 m at the equator)
pub const DEFAULT_CELL_SIZE: f64 = 0.001;

/// Integer address of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub x: i64,
    pub y: i64,
}

impl GridCell {
    /// Cell containing a lon/lat pair for the given cell size
    pub fn containing(lon: f64, lat: f64, cell_size: f64) -> Self {
        Self {
            x: (lon / cell_size).round() as i64,
            y: (lat / cell_size).round() as i64,
        }
    }

    /// Every cell within `reach_x` columns and `reach_y` rows of this one
    pub fn block(&self, reach_x: i64, reach_y: i64) -> impl Iterator<Item = GridCell> {
        let GridCell { x, y } = *self;
        (-reach_x..=reach_x).flat_map(move |dx| {
            (-reach_y..=reach_y).map(move |dy| GridCell { x: x + dx, y: y + dy })
        })
    }
}

/// Coarse spatial hash from grid cells to node ids
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<GridCell, BTreeSet<String>>,
}

impl SpatialGrid {
    /// Create an empty grid with the given cell size in degrees
    pub fn new(cell_size: f64) -> Self {
        Self { cell_size, cells: HashMap::new() }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cell a position falls into
    pub fn cell_of(&self, position: &Position) -> GridCell {
        GridCell::containing(position.lon(), position.lat(), self.cell_size)
    }

    /// Register a node id at a position
    pub fn insert(&mut self, id: impl Into<String>, position: &Position) {
        let cell = self.cell_of(position);
        self.cells.entry(cell).or_default().insert(id.into());
    }

    /// Drop a node id from the cell it was registered under
    pub fn remove(&mut self, id: &str, position: &Position) -> bool {
        let cell = self.cell_of(position);
        let Some(ids) = self.cells.get_mut(&cell) else {
            return false;
        };

        let removed = ids.remove(id);
        if ids.is_empty() {
            self.cells.remove(&cell);
        }
        removed
    }

    /// Ids registered in exactly this cell
    pub fn ids_in(&self, cell: GridCell) -> impl Iterator<Item = &str> {
        self.cells.get(&cell).into_iter().flat_map(|ids| ids.iter().map(String::as_str))
    }

    /// Ids in the block of cells reaching `reach_x`/`reach_y` cells around the position
    pub fn within_block(&self, position: &Position, reach_x: i64, reach_y: i64) -> Vec<&str> {
        self.cell_of(position)
            .block(reach_x, reach_y)
            .flat_map(|cell| self.ids_in(cell))
            .collect()
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}
