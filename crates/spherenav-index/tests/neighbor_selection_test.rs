use proptest::prelude::*;

use spherenav_core::geo::{angular_difference, DEFAULT_CELL_SIZE};
use spherenav_core::{PanoramaNode, Position};
use spherenav_index::{min_separation, GraphSettings, SphereGraph};

const CENTER_LON: f64 = 6.8586;
const CENTER_LAT: f64 = 45.8326;

fn node(id: &str, lon: f64, lat: f64) -> PanoramaNode {
    PanoramaNode::new(
        id,
        Position::new(lon, lat, None).unwrap(),
        format!("https://example.com/{}.jpg", id),
        format!("https://example.com/{}_t.jpg", id),
    )
    .unwrap()
}

/// `count` nodes evenly spaced on a ring of `radius` degrees around the center
fn ring_nodes(prefix: &str, count: usize, radius: f64, offset_deg: f64) -> Vec<PanoramaNode> {
    (0..count)
        .map(|i| {
            let angle = (offset_deg + i as f64 * 360.0 / count as f64).to_radians();
            node(
                &format!("{}_{}", prefix, i),
                CENTER_LON + radius * angle.sin(),
                CENTER_LAT + radius * angle.cos(),
            )
        })
        .collect()
}

/// Center node plus one ring
fn ring(count: usize, radius: f64) -> Vec<PanoramaNode> {
    let mut nodes = vec![node("center", CENTER_LON, CENTER_LAT)];
    nodes.extend(ring_nodes("ring", count, radius, 0.0));
    nodes
}

fn bearings_from(graph: &SphereGraph, from: &PanoramaNode, ids: &[String]) -> Vec<f64> {
    ids.iter().map(|id| from.gps.bearing_to(&graph.get(id).unwrap().gps)).collect()
}

#[test]
fn test_ring_of_eight_with_eight_sectors() {
    let graph = SphereGraph::build(ring(8, 0.01), GraphSettings::default());
    let center = graph.get("center").unwrap();

    let links = graph.find_neighbors(center, 10_000.0, 8);
    let ids: Vec<String> = links.iter().map(|l| l.id.clone()).collect();

    assert!(!ids.is_empty() && ids.len() <= 8);
    assert!(ids.iter().all(|id| id.starts_with("ring_")));

    let bearings = bearings_from(&graph, center, &ids);
    for (i, a) in bearings.iter().enumerate() {
        for b in bearings.iter().skip(i + 1) {
            assert!(angular_difference(*a, *b) >= min_separation(8) - 1e-9);
        }
    }
}

#[test]
fn test_ring_of_four_fills_four_sectors() {
    let graph = SphereGraph::build(ring(4, 0.005), GraphSettings::default());
    let center = graph.get("center").unwrap();

    let mut ids: Vec<String> =
        graph.find_neighbors(center, 10_000.0, 4).into_iter().map(|l| l.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["ring_0", "ring_1", "ring_2", "ring_3"]);
}

#[test]
fn test_smaller_range_gives_fewer_links() {
    let mut nodes = ring(4, 0.002);
    nodes.extend(ring_nodes("outer", 4, 0.02, 45.0));
    let graph = SphereGraph::build(nodes, GraphSettings::default());
    let center = graph.get("center").unwrap();

    let near = graph.find_neighbors(center, 500.0, 8);
    let far = graph.find_neighbors(center, 5_000.0, 8);

    assert_eq!(near.len(), 4);
    assert!(near.iter().all(|l| l.id.starts_with("ring_")));
    assert_eq!(far.len(), 8);
}

#[test]
fn test_links_carry_neighbor_positions() {
    let graph = SphereGraph::build(ring(4, 0.005), GraphSettings::default());
    let center = graph.get("center").unwrap();

    for link in graph.find_neighbors(center, 10_000.0, 4) {
        assert_eq!(link.gps, graph.get(&link.id).unwrap().gps);
    }
}

#[test]
fn test_dense_grid_scan_matches_matrix() {
    // 15x15 lattice about 55 m apart, dense enough for a bounded grid block
    let mut nodes = Vec::new();
    for x in 0..15 {
        for y in 0..15 {
            nodes.push(node(
                &format!("p_{}_{}", x, y),
                CENTER_LON + x as f64 * 0.0007,
                CENTER_LAT + y as f64 * 0.0005,
            ));
        }
    }

    let matrix = SphereGraph::build(nodes.clone(), GraphSettings::default());
    let scan = SphereGraph::without_matrix(nodes, DEFAULT_CELL_SIZE);

    for id in ["p_7_7", "p_0_0", "p_14_3"] {
        let target = matrix.get(id).unwrap();
        for range in [60.0, 150.0, 400.0] {
            assert_eq!(
                matrix.find_neighbors(target, range, 6),
                scan.find_neighbors(target, range, 6),
                "{} at {} m",
                id,
                range
            );
        }
    }
}

fn scattered_nodes() -> impl Strategy<Value = Vec<PanoramaNode>> {
    prop::collection::vec((-0.05f64..0.05, -0.05f64..0.05), 2..40).prop_map(|offsets| {
        offsets
            .into_iter()
            .enumerate()
            .map(|(i, (dx, dy))| node(&format!("n{:02}", i), CENTER_LON + dx, CENTER_LAT + dy))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_at_most_sectors_links(
        nodes in scattered_nodes(),
        sectors in 1u32..12,
        range in 1.0f64..20_000.0,
    ) {
        let graph = SphereGraph::build(nodes, GraphSettings::default());
        for target in graph.nodes() {
            let links = graph.find_neighbors(target, range, sectors);
            prop_assert!(links.len() <= sectors as usize);
            prop_assert!(links.iter().all(|l| l.id != target.id));
            for link in &links {
                let neighbor = graph.get(&link.id).unwrap();
                prop_assert!(target.gps.distance_to(&neighbor.gps) <= range + 1e-6);
            }
        }
    }

    #[test]
    fn prop_larger_range_never_loses_links(
        nodes in scattered_nodes(),
        sectors in 1u32..12,
        r1 in 0.0f64..10_000.0,
        extra in 0.0f64..10_000.0,
    ) {
        let graph = SphereGraph::build(nodes, GraphSettings::default());
        let target = &graph.nodes()[0];
        let near = graph.find_neighbors(target, r1, sectors);
        let far = graph.find_neighbors(target, r1 + extra, sectors);
        prop_assert!(near.len() <= far.len());
    }

    #[test]
    fn prop_links_are_angularly_separated(nodes in scattered_nodes(), sectors in 1u32..12) {
        let graph = SphereGraph::build(nodes, GraphSettings::default());
        let target = &graph.nodes()[0];
        let ids: Vec<String> = graph
            .find_neighbors(target, 20_000.0, sectors)
            .into_iter()
            .map(|l| l.id)
            .collect();
        let bearings = bearings_from(&graph, target, &ids);

        for (i, a) in bearings.iter().enumerate() {
            for b in bearings.iter().skip(i + 1) {
                prop_assert!(angular_difference(*a, *b) >= min_separation(sectors) - 1e-9);
            }
        }
    }

    #[test]
    fn prop_nearest_neighbor_always_linked(nodes in scattered_nodes(), sectors in 1u32..12) {
        let graph = SphereGraph::build(nodes, GraphSettings::default());
        let target = &graph.nodes()[0];
        let links = graph.find_neighbors(target, 20_000.0, sectors);

        let nearest = graph
            .nodes()
            .iter()
            .filter(|n| n.id != target.id)
            .map(|n| (target.gps.distance_to(&n.gps), n.id.clone()))
            .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        if let Some((_, id)) = nearest {
            prop_assert_eq!(&links[0].id, &id);
        }
    }

    #[test]
    fn prop_strategies_agree(
        nodes in scattered_nodes(),
        sectors in 1u32..10,
        range in 1.0f64..15_000.0,
    ) {
        let matrix = SphereGraph::build(nodes.clone(), GraphSettings::default());
        let scan = SphereGraph::without_matrix(nodes, DEFAULT_CELL_SIZE);
        for target in matrix.nodes() {
            prop_assert_eq!(
                matrix.find_neighbors(target, range, sectors),
                scan.find_neighbors(target, range, sectors)
            );
        }
    }
}
