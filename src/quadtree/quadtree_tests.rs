use std::f64::consts::PI;
use std::time::Instant;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::{flatten_points, Point, Quad, SwarmState};
use crate::quadtree::{QuadTree, NE, NW, SE, SW};
use crate::utils::{SwarmError, MAX_TREE_DEPTH};

fn root() -> Quad {
    Quad { cx: 0.0, cy: 0.0, half_size: 2.0 }
}

fn random_points(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            Point::new(
                rng.gen_range(-1.9..1.9),
                rng.gen_range(-1.9..1.9),
                rng.gen_range(0.0..2.0 * PI),
            )
        })
        .collect()
}

#[test]
fn test_new_tree_is_empty() {
    let tree = QuadTree::new(root());
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.depth(), 0);
    assert_eq!(tree.query(0.1, 0.1, 0.5).count(), 0);
}

#[test]
fn test_two_point_scenario() {
    let mut tree = QuadTree::new(root());
    tree.insert(Point::new(0.5, 0.5, 0.0)).unwrap();
    tree.insert(Point::new(-0.5, 0.5, 1.0)).unwrap();

    let r = tree.root();
    assert_eq!(r.mass(), 2);
    assert_relative_eq!(r.centroid().x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(r.centroid().y, 0.5, epsilon = 1e-12);
    let expected_phase = (0.5 * 1.0f64.sin()).atan2(0.5 + 0.5 * 1.0f64.cos());
    assert_relative_eq!(r.centroid().phase, expected_phase, epsilon = 1e-12);
    assert_relative_eq!(r.centroid().phase, 0.5, epsilon = 1e-12);

    let children = r.children().expect("root should have been subdivided");
    let ne = tree.node(children[NE]);
    let nw = tree.node(children[NW]);
    assert_eq!(ne.centroid(), Point::new(0.5, 0.5, 0.0));
    assert_eq!(nw.centroid(), Point::new(-0.5, 0.5, 1.0));
    assert!(tree.node(children[SW]).is_empty());
    assert!(tree.node(children[SE]).is_empty());
    assert_eq!(tree.node_count(), 5);
    assert_eq!(tree.depth(), 1);
}

#[test]
fn test_every_point_inside_its_node() {
    let points = random_points(300, 11);
    let tree = QuadTree::build(&points, root()).unwrap();
    for (id, node) in tree.nodes() {
        if node.is_empty() {
            continue;
        }
        let c = node.centroid();
        assert!(node.boundary().contains(c.x, c.y), "node {} centroid escapes its boundary", id);
    }
}

#[test]
fn test_mass_is_conserved() {
    let points = random_points(257, 5);
    let tree = QuadTree::build(&points, root()).unwrap();
    assert_eq!(tree.len(), points.len());

    let mut leaves = 0;
    for (id, node) in tree.nodes() {
        match node.children() {
            Some(children) => {
                let below: usize = children.iter().map(|&c| tree.node(c).mass()).sum();
                assert_eq!(node.mass(), below, "node {} mass differs from its children", id);
            }
            None if !node.is_empty() => {
                assert_eq!(node.mass(), 1);
                leaves += 1;
            }
            None => assert_eq!(node.mass(), 0),
        }
    }
    assert_eq!(leaves, points.len());
}

#[test]
fn test_aggregate_is_independent_of_insertion_order() {
    let mut points = random_points(200, 3);
    let first = QuadTree::build(&points, root()).unwrap();
    points.shuffle(&mut StdRng::seed_from_u64(99));
    let second = QuadTree::build(&points, root()).unwrap();

    let a = first.root().centroid();
    let b = second.root().centroid();
    assert_eq!(first.root().mass(), second.root().mass());
    assert_relative_eq!(a.x, b.x, epsilon = 1e-9);
    assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
}

#[test]
fn test_two_point_phase_merge_is_symmetric() {
    let p = Point::new(0.5, 0.5, 0.3);
    let q = Point::new(-0.5, -0.5, 2.0);
    let a = QuadTree::build(&[p, q], root()).unwrap();
    let b = QuadTree::build(&[q, p], root()).unwrap();
    assert_relative_eq!(a.root().centroid().phase, b.root().centroid().phase, epsilon = 1e-12);
    assert_relative_eq!(a.root().centroid().phase, 1.15, epsilon = 1e-12);
}

#[test]
fn test_root_aggregate_is_mean_position() {
    let points = random_points(64, 8);
    let tree = QuadTree::build(&points, root()).unwrap();
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;
    assert_relative_eq!(tree.root().centroid().x, mean_x, epsilon = 1e-9);
    assert_relative_eq!(tree.root().centroid().y, mean_y, epsilon = 1e-9);
}

#[test]
fn test_out_of_root_is_reported_with_entity() {
    let points = [Point::new(0.1, 0.1, 0.0), Point::new(2.5, 0.0, 0.0)];
    match QuadTree::build(&points, root()) {
        Err(SwarmError::OutOfBounds { entity, x, y, boundary }) => {
            assert_eq!(entity, Some(1));
            assert_eq!((x, y), (2.5, 0.0));
            assert_eq!(boundary, root());
        }
        other => panic!("expected OutOfBounds, got {:?}", other),
    }
}

#[test]
fn test_point_on_root_edge_is_rejected() {
    let mut tree = QuadTree::new(root());
    assert!(matches!(
        tree.insert(Point::new(2.0, 0.3, 0.0)),
        Err(SwarmError::OutOfBounds { entity: None, .. })
    ));
}

#[test]
fn test_point_on_internal_seam_is_rejected() {
    let mut tree = QuadTree::new(root());
    tree.insert(Point::new(0.3, 0.3, 0.0)).unwrap();
    match tree.insert(Point::new(0.0, 0.7, 0.0)) {
        Err(SwarmError::OutOfBounds { boundary, .. }) => {
            assert_eq!(boundary, Quad::new(1.0, 1.0, 1.0));
        }
        other => panic!("expected OutOfBounds on the seam, got {:?}", other),
    }
}

#[test]
fn test_antipodal_phases_merge_to_zero() {
    let mut tree = QuadTree::new(root());
    tree.insert(Point::new(0.5, 0.5, 0.0)).unwrap();
    tree.insert(Point::new(-0.5, -0.5, PI)).unwrap();
    assert_eq!(tree.root().centroid().phase, 0.0);
    assert_eq!(tree.root().mass(), 2);
}

#[test]
fn test_coincident_points_hit_depth_guard() {
    let mut tree = QuadTree::new(root());
    tree.insert(Point::new(0.3, 0.7, 0.0)).unwrap();
    match tree.insert(Point::new(0.3, 0.7, 1.0)) {
        Err(SwarmError::DegenerateSeparation { depth, .. }) => assert!(depth <= MAX_TREE_DEPTH),
        other => panic!("expected DegenerateSeparation, got {:?}", other),
    }
}

#[test]
fn test_close_points_separate() {
    let mut tree = QuadTree::new(root());
    tree.insert(Point::new(0.3, 0.7, 0.0)).unwrap();
    tree.insert(Point::new(0.3 + 1e-7, 0.7, 1.0)).unwrap();
    assert_eq!(tree.len(), 2);
    assert!(tree.depth() > 20);
}

#[test]
fn test_query_excludes_receiver() {
    let points = random_points(100, 21);
    let tree = QuadTree::build(&points, root()).unwrap();
    for p in &points {
        for source in tree.query(p.x, p.y, 0.5) {
            assert!(!(source.com_x == p.x && source.com_y == p.y));
        }
    }
}

#[test]
fn test_zero_theta_visits_every_other_point() {
    let points = random_points(50, 4);
    let tree = QuadTree::build(&points, root()).unwrap();
    let p = points[17];
    let sources: Vec<_> = tree.query(p.x, p.y, 0.0).collect();
    assert_eq!(sources.len(), points.len() - 1);
    assert!(sources.iter().all(|s| s.mass == 1));
}

#[test]
fn test_large_theta_collapses_to_root() {
    let points = random_points(40, 6);
    let tree = QuadTree::build(&points, root()).unwrap();
    let sources: Vec<_> = tree.query(15.0, 15.0, 1e6).collect();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].mass, points.len());
    assert_relative_eq!(sources[0].com_x, tree.root().centroid().x, epsilon = 1e-12);
}

#[test]
fn test_query_mass_always_sums_to_others() {
    let points = random_points(120, 13);
    let tree = QuadTree::build(&points, root()).unwrap();
    for theta in [0.3, 0.5, 1.0] {
        for p in points.iter().take(20) {
            let mass: usize = tree.query(p.x, p.y, theta).map(|s| s.mass).sum();
            // A receiver is only skipped when it is alone in a yielded node.
            assert!(mass == points.len() - 1 || mass == points.len());
        }
    }
}

#[test]
fn test_query_visits_children_nw_ne_se_sw() {
    let points = [
        Point::new(-1.0, 1.0, 0.0),  // NW
        Point::new(1.0, 1.0, 0.0),   // NE
        Point::new(-1.0, -1.0, 0.0), // SW
        Point::new(1.0, -1.0, 0.0),  // SE
    ];
    let tree = QuadTree::build(&points, root()).unwrap();
    let order: Vec<(f64, f64)> = tree.query(0.1, 0.2, 0.0).map(|s| (s.com_x, s.com_y)).collect();
    assert_eq!(order, vec![(-1.0, 1.0), (1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)]);
}

#[test]
fn test_depth_tracks_deepest_node() {
    let mut tree = QuadTree::new(root());
    for (i, p) in random_points(500, 13).into_iter().enumerate() {
        tree.insert(p).unwrap();
        let deepest = tree.nodes().map(|(_, n)| n.depth()).max().unwrap();
        assert_eq!(tree.depth(), deepest, "after {} insertions", i + 1);
    }
    tree.insert(Point::new(0.3, 0.7, 0.0)).unwrap();
    tree.insert(Point::new(0.3 + 1e-7, 0.7, 1.0)).unwrap();
    assert_eq!(tree.depth(), tree.nodes().map(|(_, n)| n.depth()).max().unwrap());
}

fn time_far_queries(tree: &QuadTree, queries: usize) -> f64 {
    let start = Instant::now();
    let mut yielded = 0;
    for i in 0..queries {
        let x = -1.5 + 3.0 * (i as f64) / (queries as f64);
        yielded += tree.query(x, 1.95, 1e9).count();
    }
    assert_eq!(yielded, queries);
    start.elapsed().as_secs_f64()
}

#[test]
fn test_query_cost_independent_of_tree_size() {
    let small = QuadTree::build(&random_points(1_000, 5), root()).unwrap();
    let large = QuadTree::build(&random_points(64_000, 6), root()).unwrap();
    assert!(large.node_count() > 32 * small.node_count());

    // Warm up, then take the best of a few runs to damp scheduler noise.
    time_far_queries(&small, 2_000);
    let best = |tree: &QuadTree| (0..3).map(|_| time_far_queries(tree, 20_000)).fold(f64::INFINITY, f64::min);
    let t_small = best(&small);
    let t_large = best(&large);
    assert!(
        t_large < 8.0 * t_small + 0.05,
        "root-only queries slowed from {:.4}s to {:.4}s",
        t_small,
        t_large
    );
}

#[test]
fn test_from_state_matches_build() {
    let points = random_points(30, 2);
    let raw = flatten_points(&points);
    let a = QuadTree::build(&points, root()).unwrap();
    let b = QuadTree::from_state(SwarmState::new(&raw), root()).unwrap();
    assert_eq!(a.node_count(), b.node_count());
    assert_eq!(a.root().centroid(), b.root().centroid());
}
