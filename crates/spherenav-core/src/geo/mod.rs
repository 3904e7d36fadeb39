//! Geo module for spherical math and coarse spatial bucketing
//!
//! Everything here works on WGS 84 longitude/latitude in degrees.

pub mod grid;
pub mod math;

pub use grid::{GridCell, SpatialGrid, DEFAULT_CELL_SIZE};
pub use math::{
    angular_difference, grid_key, haversine_distance_meters, initial_bearing_degrees,
    point_bearing_degrees, point_distance_meters, EARTH_RADIUS_METERS,
};
