//! Physical sanity checks for the force-directed solver.
//!
//! These run the full solver on small hand-built graphs and assert on
//! geometric properties of the output rather than exact coordinates.

use std::collections::BTreeMap;

use proptest::prelude::*;

use boardnet_core::{
    BoardGraph, EdgeRecord, LayoutConfig, NodeId, NodeKind, NodeRecord, Position,
    RelationshipType, build_graph,
};
use boardnet_layout::{ForceLayout, LayoutResult, solve};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn graph(nodes: &[&str], edges: &[(&str, &str, f64)]) -> BoardGraph {
    let nodes: Vec<NodeRecord> = nodes
        .iter()
        .map(|id| NodeRecord::new(*id, NodeKind::Member))
        .collect();
    let edges: Vec<EdgeRecord> = edges
        .iter()
        .map(|(a, b, s)| EdgeRecord::new(*a, *b, RelationshipType::SharedBoard, *s, 1.0))
        .collect();
    build_graph(&nodes, &edges).expect("build graph")
}

fn p<'a>(result: &'a LayoutResult, id: &str) -> &'a Position {
    &result.positions[&NodeId::from(id)]
}

fn min_distance(result: &LayoutResult, xs: &[&str], ys: &[&str]) -> f64 {
    let mut best = f64::INFINITY;
    for x in xs {
        for y in ys {
            if x != y {
                best = best.min(p(result, x).distance(p(result, y)));
            }
        }
    }
    best
}

// ===========================================================================
// Disconnected components
//
//   a - b        d - e
//    \ /          \ /
//     c            f
//
// Repulsion alone must push the two triangles apart further than the
// spring-held nodes inside either triangle.
// ===========================================================================

#[test]
fn disconnected_triangles_separate() {
    let g = graph(
        &["a", "b", "c", "d", "e", "f"],
        &[
            ("a", "b", 1.0),
            ("b", "c", 1.0),
            ("c", "a", 1.0),
            ("d", "e", 1.0),
            ("e", "f", 1.0),
            ("f", "d", 1.0),
        ],
    );
    let left = ["a", "b", "c"];
    let right = ["d", "e", "f"];

    for seed in [1, 2, 3, 42] {
        for dimensions in [2, 3] {
            let config = LayoutConfig {
                seed,
                dimensions,
                ..LayoutConfig::default()
            };
            let result = solve(&g, &config).expect("layout");

            let across = min_distance(&result, &left, &right);
            let within = min_distance(&result, &left, &left).min(min_distance(&result, &right, &right));
            assert!(
                across > within,
                "seed={seed} dims={dimensions}: across={across} within={within}"
            );
        }
    }
}

// ===========================================================================
// Symmetry of repulsion
//
// Swapping the start positions of two nodes that share no edge must
// produce the mirrored layout: the two nodes trade places and every other
// node lands where it did before.
// ===========================================================================

#[test]
fn swapping_unlinked_nodes_mirrors_layout() {
    let g = graph(&["a", "b", "c", "d"], &[("c", "d", 0.7)]);
    let layout = ForceLayout::new(&g, &LayoutConfig::default()).expect("solver");

    let start: BTreeMap<NodeId, Position> = [
        ("a", Position::new(-3.0, 1.0, 0.0)),
        ("b", Position::new(2.5, -0.5, 0.0)),
        ("c", Position::new(0.5, 2.0, 0.0)),
        ("d", Position::new(1.0, -3.0, 0.0)),
    ]
    .into_iter()
    .map(|(id, pos)| (NodeId::from(id), pos))
    .collect();

    let mut swapped = start.clone();
    swapped.insert(NodeId::from("a"), start[&NodeId::from("b")]);
    swapped.insert(NodeId::from("b"), start[&NodeId::from("a")]);

    let r1 = layout
        .run_until(layout.state_from_positions(&start), None)
        .expect("no deadline");
    let r2 = layout
        .run_until(layout.state_from_positions(&swapped), None)
        .expect("no deadline");

    let close = |x: &Position, y: &Position| x.distance(y) < 1e-9;
    assert!(close(p(&r1, "a"), p(&r2, "b")));
    assert!(close(p(&r1, "b"), p(&r2, "a")));
    assert!(close(p(&r1, "c"), p(&r2, "c")));
    assert!(close(p(&r1, "d"), p(&r2, "d")));
}

#[test]
fn layout_is_centered_on_origin() {
    let g = graph(&["a", "b", "c", "d", "e"], &[("a", "b", 0.5), ("c", "d", 0.9)]);
    let result = solve(&g, &LayoutConfig::default()).expect("layout");
    let c = Position::centroid(result.positions.values());
    assert!(c.distance(&Position::ORIGIN) < 1e-9, "centroid {c:?}");
}

#[test]
fn layout_result_serializes_byte_identically() {
    let g = graph(&["a", "b", "c"], &[("a", "b", 0.5), ("b", "c", 0.3)]);
    let config = LayoutConfig::default();
    let j1 = serde_json::to_string(&solve(&g, &config).expect("layout")).expect("json");
    let j2 = serde_json::to_string(&solve(&g, &config).expect("layout")).expect("json");
    assert_eq!(j1, j2);
}

// ---------------------------------------------------------------------------
// Property: determinism over random graphs
// ---------------------------------------------------------------------------

fn arb_edges(n: usize) -> impl Strategy<Value = Vec<(usize, usize, f64)>> {
    prop::collection::vec((0..n, 0..n, 0.0f64..=1.0), 0..(n * 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn same_seed_same_layout(edges in arb_edges(8), seed in any::<u64>()) {
        let ids: Vec<String> = (0..8).map(|i| format!("n{i}")).collect();
        let nodes: Vec<NodeRecord> = ids.iter().map(|id| NodeRecord::new(id.clone(), NodeKind::Member)).collect();
        let edges: Vec<EdgeRecord> = edges
            .into_iter()
            .filter(|(a, b, _)| a != b)
            .map(|(a, b, s)| EdgeRecord::new(ids[a].clone(), ids[b].clone(), RelationshipType::Advisory, s, 1.0))
            .collect();
        let g = build_graph(&nodes, &edges).expect("graph");
        let config = LayoutConfig { seed, iterations: 60, ..LayoutConfig::default() };

        let r1 = solve(&g, &config).expect("layout");
        let r2 = solve(&g, &config).expect("layout");
        prop_assert_eq!(&r1, &r2);
        prop_assert!(r1.positions.values().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
}
