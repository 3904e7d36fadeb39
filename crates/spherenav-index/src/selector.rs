//! Sector-balanced neighbor selection
//!
//! Candidates within range are taken closest first; each one is admitted only
//! if its bearing is at least half a sector away from every neighbor already
//! admitted. The result is close neighbors spread around the compass rather
//! than several links pointing the same way.

use spherenav_core::geo::{angular_difference, EARTH_RADIUS_METERS};
use spherenav_core::PanoramaNode;

use crate::index::NodeIndex;
use crate::matrix::GeometryMatrix;

/// Latitude beyond which the grid scan gives up on bounding boxes
const POLAR_SCAN_LIMIT: f64 = 89.0;

/// A node within range of the target, with its geometry relative to it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub node: &'a PanoramaNode,
    pub distance: f64,
    pub bearing: f64,
}

/// Minimum bearing gap between two admitted neighbors, in degrees
pub fn min_separation(sectors: u32) -> f64 {
    360.0 / sectors as f64 / 2.0
}

/// Sort candidates closest first (ties by id) and greedily keep the angularly
/// separated ones, at most `sectors` of them.
pub fn select_spread(mut candidates: Vec<Candidate<'_>>, sectors: u32) -> Vec<Candidate<'_>> {
    if sectors == 0 {
        return Vec::new();
    }

    candidates.sort_by(|a, b| {
        a.distance.total_cmp(&b.distance).then_with(|| a.node.id.cmp(&b.node.id))
    });

    let separation = min_separation(sectors);
    let limit = sectors as usize;
    let mut selected: Vec<Candidate<'_>> = Vec::with_capacity(limit.min(candidates.len()));

    for candidate in candidates {
        if selected.len() >= limit {
            break;
        }
        let spread = selected
            .iter()
            .all(|kept| angular_difference(kept.bearing, candidate.bearing) >= separation);
        if spread {
            selected.push(candidate);
        }
    }

    selected
}

/// Range candidates read from a precomputed matrix row
pub fn matrix_candidates<'a>(
    index: &'a NodeIndex,
    matrix: &GeometryMatrix,
    target_slot: usize,
    max_range: f64,
) -> Vec<Candidate<'a>> {
    if !in_range_possible(max_range) {
        return Vec::new();
    }
    let (Some(distances), Some(bearings)) =
        (matrix.distance_row(target_slot), matrix.bearing_row(target_slot))
    else {
        return Vec::new();
    };

    index
        .nodes()
        .iter()
        .enumerate()
        .filter(|(slot, _)| *slot != target_slot)
        .filter(|(slot, _)| distances[*slot] <= max_range)
        .map(|(slot, node)| Candidate { node, distance: distances[slot], bearing: bearings[slot] })
        .collect()
}

/// Range candidates found by scanning grid cells around the target and
/// computing geometry on demand.
///
/// The scanned block is sized so that it covers `max_range`; when that block
/// would be larger than the occupied grid, or near the poles or antimeridian,
/// every node is scanned instead.
pub fn grid_candidates<'a>(
    index: &'a NodeIndex,
    target: &PanoramaNode,
    max_range: f64,
) -> Vec<Candidate<'a>> {
    if !in_range_possible(max_range) {
        return Vec::new();
    }

    let candidate = |node: &'a PanoramaNode| -> Option<Candidate<'a>> {
        if node.id == target.id {
            return None;
        }
        let distance = target.gps.distance_to(&node.gps);
        (distance <= max_range).then(|| Candidate {
            node,
            distance,
            bearing: target.gps.bearing_to(&node.gps),
        })
    };

    match scan_reach(index, target, max_range) {
        Some((reach_x, reach_y)) => index
            .grid()
            .within_block(&target.gps, reach_x, reach_y)
            .into_iter()
            .filter_map(|id| index.get(id))
            .filter_map(candidate)
            .collect(),
        None => index.iter().filter_map(candidate).collect(),
    }
}

/// Cells to scan in each direction, or `None` when a full scan is cheaper or required
fn scan_reach(index: &NodeIndex, target: &PanoramaNode, max_range: f64) -> Option<(i64, i64)> {
    let cell = index.grid().cell_size();
    let lat_span = (max_range / EARTH_RADIUS_METERS).to_degrees();

    let poleward = target.gps.lat().abs() + lat_span;
    if poleward >= POLAR_SCAN_LIMIT {
        return None;
    }
    let lon_span = lat_span / poleward.to_radians().cos();
    if target.gps.lon().abs() + lon_span >= 180.0 {
        return None;
    }

    // One extra cell absorbs rounding at the cell edges
    let reach_x = (lon_span / cell).ceil() + 1.0;
    let reach_y = (lat_span / cell).ceil() + 1.0;

    let block_cells = (2.0 * reach_x + 1.0) * (2.0 * reach_y + 1.0);
    if block_cells > index.grid().occupied_cells() as f64 {
        return None;
    }

    Some((reach_x as i64, reach_y as i64))
}

fn in_range_possible(max_range: f64) -> bool {
    max_range > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use spherenav_core::Position;

    fn node(id: &str, lon: f64, lat: f64) -> PanoramaNode {
        PanoramaNode::new(
            id,
            Position::new(lon, lat, None).unwrap(),
            format!("https://example.com/{}.jpg", id),
            format!("https://example.com/{}_t.jpg", id),
        )
        .unwrap()
    }

    fn candidate(node: &PanoramaNode, distance: f64, bearing: f64) -> Candidate<'_> {
        Candidate { node, distance, bearing }
    }

    #[test]
    fn test_min_separation() {
        assert_eq!(min_separation(4), 45.0);
        assert_eq!(min_separation(8), 22.5);
        assert_eq!(min_separation(1), 180.0);
    }

    #[test]
    fn test_clustered_candidate_is_skipped() {
        let (a, b, c) = (node("a", 0.0, 0.0), node("b", 0.0, 0.0), node("c", 0.0, 0.0));

        // b is second closest but only 10° away from a
        let candidates = vec![
            candidate(&c, 300.0, 180.0),
            candidate(&b, 200.0, 10.0),
            candidate(&a, 100.0, 0.0),
        ];
        let picked = select_spread(candidates, 4);

        let ids: Vec<&str> = picked.iter().map(|c| c.node.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_wraparound_counts_as_close() {
        let (a, b) = (node("a", 0.0, 0.0), node("b", 0.0, 0.0));
        let picked = select_spread(vec![candidate(&a, 1.0, 355.0), candidate(&b, 2.0, 5.0)], 4);
        assert_eq!(picked.len(), 1);
    }

    #[test]
    fn test_sector_cap() {
        let nodes: Vec<PanoramaNode> = (0..8).map(|i| node(&format!("n{}", i), 0.0, 0.0)).collect();
        let candidates = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| candidate(n, 100.0 + i as f64, i as f64 * 45.0))
            .collect();

        assert_eq!(select_spread(candidates, 3).len(), 3);
    }

    #[test]
    fn test_single_candidate_always_admitted() {
        let a = node("a", 0.0, 0.0);
        assert_eq!(select_spread(vec![candidate(&a, 5.0, 123.0)], 1000).len(), 1);
    }

    #[test]
    fn test_zero_sectors_selects_nothing() {
        let a = node("a", 0.0, 0.0);
        assert!(select_spread(vec![candidate(&a, 5.0, 0.0)], 0).is_empty());
    }

    #[test]
    fn test_equal_distances_break_ties_by_id() {
        let (x, y) = (node("x", 0.0, 0.0), node("y", 0.0, 0.0));
        let picked = select_spread(vec![candidate(&y, 10.0, 90.0), candidate(&x, 10.0, 95.0)], 4);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].node.id, "x");
    }

    #[test]
    fn test_grid_and_matrix_candidates_agree() {
        let mut nodes = vec![node("center", 6.8586, 45.8326)];
        for i in 0..12 {
            let angle = (i as f64 * 30.0).to_radians();
            let r = 0.002 * (1 + i % 3) as f64;
            let (lon, lat) = (6.8586 + r * angle.cos(), 45.8326 + r * angle.sin());
            nodes.push(node(&format!("ring_{}", i), lon, lat));
        }
        nodes.push(node("far_away", 7.5, 46.5));

        let index = NodeIndex::from_nodes(nodes, 0.001);
        let matrix = GeometryMatrix::compute_all(&index);
        let target = index.get("center").unwrap();
        let slot = index.slot_of("center").unwrap();

        for range in [0.0, 150.0, 300.0, 600.0, 5_000.0, 200_000.0] {
            let mut from_matrix: Vec<&str> = matrix_candidates(&index, &matrix, slot, range)
                .iter()
                .map(|c| c.node.id.as_str())
                .collect();
            let mut from_grid: Vec<&str> =
                grid_candidates(&index, target, range).iter().map(|c| c.node.id.as_str()).collect();
            from_matrix.sort();
            from_grid.sort();
            assert_eq!(from_matrix, from_grid, "range {}", range);
        }
    }

    #[test]
    fn test_non_positive_range_has_no_candidates() {
        let index = NodeIndex::from_nodes(vec![node("a", 0.0, 0.0), node("twin", 0.0, 0.0)], 0.001);
        let matrix = GeometryMatrix::compute_all(&index);

        assert!(matrix_candidates(&index, &matrix, 0, 0.0).is_empty());
        assert!(matrix_candidates(&index, &matrix, 0, -100.0).is_empty());
        assert!(grid_candidates(&index, index.get("a").unwrap(), 0.0).is_empty());
        assert!(matrix_candidates(&index, &matrix, 0, f64::NAN).is_empty());
    }
}
