//! Property-based tests for nearest-neighbour queries.
//!
//! Every query is cross-checked against a linear scan.
//!
//! Run with: cargo test -p spatial-index -- proptest

#![allow(clippy::unwrap_used)]

use nalgebra::Point3;
use proptest::prelude::*;
use spatial_index::SpatialIndex;

// =============================================================================
// Strategies
// =============================================================================

fn arb_point(range: f64) -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-range..range).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_cloud(max_points: usize) -> impl Strategy<Value = Vec<Point3<f64>>> {
    prop::collection::vec(arb_point(10.0), 2..=max_points)
}

// =============================================================================
// Property Tests: Exactness
// =============================================================================

proptest! {
    /// The grid search agrees with a linear scan for queries inside and
    /// around the bounds.
    #[test]
    fn find_matches_brute_force(
        cloud in arb_cloud(200),
        queries in prop::collection::vec(arb_point(14.0), 1..20),
        cells in 1usize..12,
    ) {
        let index = SpatialIndex::build(&cloud, &[], cells).unwrap();
        for query in &queries {
            let fast = index.find(query).unwrap();
            let slow = index.find_brute_force(query).unwrap();
            prop_assert!(
                (fast.distance - slow.distance).abs() <= 1e-12,
                "grid {} vs scan {} for {:?}", fast.distance, slow.distance, query
            );
            let reported = (cloud[fast.index] - query).norm();
            prop_assert!((reported - fast.distance).abs() <= 1e-12);
        }
    }

    /// Clustered clouds leave most cells empty and exercise the ring search.
    #[test]
    fn sparse_clusters_match_brute_force(
        cluster in prop::collection::vec(arb_point(0.5), 2..30),
        queries in prop::collection::vec(arb_point(10.0), 1..20),
    ) {
        let aux = [Point3::new(-10.0, -10.0, -10.0), Point3::new(10.0, 10.0, 10.0)];
        let index = SpatialIndex::build(&cluster, &aux, 16).unwrap();
        for query in &queries {
            let fast = index.find(query).unwrap();
            let slow = index.find_brute_force(query).unwrap();
            prop_assert!((fast.distance - slow.distance).abs() <= 1e-12);
        }
    }

    /// Every indexed point finds itself at distance zero.
    #[test]
    fn find_is_reflexive(cloud in arb_cloud(100), cells in 1usize..10) {
        let index = SpatialIndex::build(&cloud, &[], cells).unwrap();
        for point in &cloud {
            let hit = index.find(point).unwrap();
            prop_assert_eq!(hit.distance, 0.0);
            prop_assert_eq!(cloud[hit.index], *point);
        }
    }

    /// Every finite point is binned exactly once.
    #[test]
    fn every_point_binned_once(cloud in arb_cloud(200), cells in 1usize..12) {
        let index = SpatialIndex::build(&cloud, &[], cells).unwrap();
        let total: usize = index.cells().iter().map(|c| c.len()).sum();
        prop_assert_eq!(total, cloud.len());
        prop_assert_eq!(index.binned_count(), cloud.len());
        prop_assert_eq!(index.dropped_count(), 0);
    }
}
