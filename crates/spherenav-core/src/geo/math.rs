//! Pure great-circle helpers: haversine distance, forward azimuth and grid
//! quantization.

use geo::{Bearing, Distance, HaversineMeasure, Point};

/// Mean Earth radius used by every distance computation, in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine on a sphere of [`EARTH_RADIUS_METERS`]
const SPHERE: HaversineMeasure = HaversineMeasure::new(EARTH_RADIUS_METERS);

/// Great-circle distance between two lon/lat points in meters.
///
/// The distance from a point to itself is exactly `0.0`.
pub fn haversine_distance_meters(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    point_distance_meters(Point::new(lon1, lat1), Point::new(lon2, lat2))
}

/// Forward azimuth from point 1 toward point 2, in degrees within `[0, 360)`.
///
/// 0 is north, 90 east. The bearing from a point to itself is defined as `0.0`.
pub fn initial_bearing_degrees(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    point_bearing_degrees(Point::new(lon1, lat1), Point::new(lon2, lat2))
}

/// [`haversine_distance_meters`] for `geo` points
pub fn point_distance_meters(from: Point<f64>, to: Point<f64>) -> f64 {
    if from == to {
        return 0.0;
    }
    SPHERE.distance(from, to)
}

/// [`initial_bearing_degrees`] for `geo` points
pub fn point_bearing_degrees(from: Point<f64>, to: Point<f64>) -> f64 {
    if from == to {
        return 0.0;
    }

    let bearing = SPHERE.bearing(from, to);

    // -1e-15 + 360.0 rounds up to 360.0
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

/// Quantize coordinates to the nearest multiple of `cell_size`.
///
/// Points sharing a cell map to the same key. This is a coarse pre-filter,
/// not a proximity test.
pub fn grid_key(lon: f64, lat: f64, cell_size: f64) -> (f64, f64) {
    ((lon / cell_size).round() * cell_size, (lat / cell_size).round() * cell_size)
}

/// Circular difference between two bearings, in `[0, 180]`
pub fn angular_difference(b1: f64, b2: f64) -> f64 {
    let diff = (b1 - b2).abs() % 360.0;
    diff.min(360.0 - diff)
}
