// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property-based tests for capacity merging, clustering and obstacle
//! avoidance.
//!
//! Run with: cargo test -p pipenet-router -- proptest

use pipenet_router::{
    cluster_positions, merged_radius, route_category, Aabb, BasementLayout, ExitStrategy, FloorExit,
    FloorObjectStore, ObstacleSet, PipeCategory, Point3, RiserPoint, RouteOutcome, RouteRequest, RouteRng,
    RouterConfig, SegmentKind,
};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Riser inside a 10 x 6 basement with a 3 m ceiling.
fn arb_riser() -> impl Strategy<Value = RiserPoint> {
    (0.5..9.5f64, 0.5..5.5f64, 0.02..0.06f64).prop_map(|(x, y, r)| RiserPoint::new(Point3::new(x, y, 3.0), r))
}

/// Ceiling-hung obstacle (duct, beam pocket) below the slab.
fn arb_obstacle() -> impl Strategy<Value = Aabb> {
    (0.0..10.0f64, 0.0..6.0f64, 0.05..1.5f64, 0.05..1.5f64, 2.3..2.9f64).prop_map(|(x, y, w, d, z)| {
        Aabb::from_corners(Point3::new(x, y, z), Point3::new(x + w, y + d, 3.0))
    })
}

fn layout() -> BasementLayout {
    BasementLayout::open(Aabb::from_corners(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 6.0, 3.0),
    ))
}

/// Runs of aligned risers separated by gaps wider than the 0.1 tolerance.
///
/// Each group starts with its base coordinate; the other members sit less
/// than the tolerance above it.
fn arb_aligned_groups() -> impl Strategy<Value = (Vec<f64>, Vec<Vec<f64>>)> {
    prop::collection::vec((0.101..2.0f64, prop::collection::vec(0.0..0.099f64, 0..4)), 1..6).prop_map(|runs| {
        let mut base = 0.5;
        let mut bases = Vec::new();
        let mut groups = Vec::new();
        for (gap, offsets) in runs {
            let mut group = vec![base];
            group.extend(offsets.iter().map(|o| base + o));
            let top = offsets.iter().copied().fold(0.0, f64::max);
            bases.push(base);
            groups.push(group);
            base += top + gap;
        }
        (bases, groups)
    })
}

// Wall search parks floor drops a hair inside full clearance.
const FLUSH: f64 = 1e-6;

/// Runs keep their clearance envelope off hard obstacles; fittings and
/// sleeves, which sit inside that envelope, keep their own bounds off.
fn check_clearance(
    outcome: &RouteOutcome,
    obstacles: &ObstacleSet,
    config: &RouterConfig,
) -> Result<(), TestCaseError> {
    let drop_at_end = matches!(
        outcome.exit.map(|e| e.strategy),
        Some(ExitStrategy::Floor(FloorExit::AtTrunkEnd))
    );
    for segment in outcome.rendered() {
        let volume = match segment.kind {
            SegmentKind::Fitting | SegmentKind::Insulation => segment.bounds(),
            SegmentKind::Exit { through_floor: true } if drop_at_end => continue,
            _ => segment.clearance_bounds(config.clearance_scale).expanded(-FLUSH),
        };
        prop_assert!(
            !volume.intersects_any(&obstacles.no_clearance),
            "{:?} from {:?} to {:?} overlaps an obstacle",
            segment.kind,
            segment.p1,
            segment.p2
        );
    }
    Ok(())
}

// =============================================================================
// Capacity merging
// =============================================================================

proptest! {
    #[test]
    fn proptest_merge_is_symmetric(r1 in 0.001..1.0f64, r2 in 0.001..1.0f64, e in 1.5..6.0f64) {
        let a = merged_radius(r1, r2, e);
        let b = merged_radius(r2, r1, e);
        prop_assert!((a - b).abs() <= 1e-12 * a.max(1.0));
    }

    #[test]
    fn proptest_merge_never_shrinks(r1 in 0.001..1.0f64, r2 in 0.001..1.0f64, e in 1.5..6.0f64) {
        let m = merged_radius(r1, r2, e);
        prop_assert!(m >= r1.max(r2));
    }

    #[test]
    fn proptest_merge_zero_is_identity(r in 0.0..1.0f64, e in 1.5..6.0f64) {
        prop_assert_eq!(merged_radius(r, 0.0, e), r);
        prop_assert_eq!(merged_radius(0.0, r, e), r);
    }
}

// =============================================================================
// Clustering
// =============================================================================

proptest! {
    /// No coordinate is snapped further than the tolerance, and cluster
    /// keys never crowd each other.
    #[test]
    fn proptest_clusters_stay_within_tolerance(
        coords in prop::collection::vec(0.0..10.0f64, 0..24),
        tolerance in 0.01..0.5f64,
    ) {
        let clusters = cluster_positions(&coords, tolerance);
        let total: usize = clusters.iter().map(|c| c.members.len()).sum();
        prop_assert_eq!(total, coords.len());
        for cluster in &clusters {
            for &m in &cluster.members {
                prop_assert!(coords[m] >= cluster.key);
                prop_assert!(coords[m] - cluster.key < tolerance);
            }
        }
        for pair in clusters.windows(2) {
            prop_assert!(pair[1].key - pair[0].key >= tolerance);
        }
    }

    /// Risers aligned within the tolerance share one key: the lowest of them.
    #[test]
    fn proptest_aligned_groups_share_a_key((bases, groups) in arb_aligned_groups()) {
        let coords: Vec<f64> = groups.iter().flatten().copied().collect();
        let clusters = cluster_positions(&coords, 0.1);
        prop_assert_eq!(clusters.len(), groups.len());

        let mut first = 0;
        for ((cluster, group), base) in clusters.iter().zip(&groups).zip(&bases) {
            prop_assert_eq!(cluster.key, *base);
            prop_assert_eq!(cluster.members.len(), group.len());
            prop_assert!(cluster.members.iter().all(|&m| (first..first + group.len()).contains(&m)));
            first += group.len();
        }
    }
}

// =============================================================================
// Routing invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever is emitted with a clear trunk stays out of every hard obstacle.
    #[test]
    fn proptest_hot_water_avoids_obstacles(
        seed in any::<u64>(),
        risers in prop::collection::vec(arb_riser(), 1..8),
        boxes in prop::collection::vec(arb_obstacle(), 0..6),
    ) {
        let config = RouterConfig::default();
        let layout = layout();
        let obstacles = ObstacleSet::solid(boxes);
        let request = RouteRequest::new(PipeCategory::HotWater, &risers, &layout, &obstacles);
        let mut rng = RouteRng::seeded(seed);
        let outcome = route_category(&request, &config, &mut rng, &mut FloorObjectStore::new());

        let placed = risers.len() - outcome.dropped_at_intake;
        prop_assert!(outcome.attempts <= placed * (placed + 1) / 2);
        prop_assert!(outcome.reduction_depth < placed.max(1));
        prop_assert_eq!(
            outcome.connected_risers() + outcome.folded_branch_risers + outcome.stripped_risers,
            placed
        );

        if !outcome.trunk_fallback {
            check_clearance(&outcome, &obstacles, &config)?;
        }
    }

    /// Open-loop categories, exits included, keep the same clearance.
    #[test]
    fn proptest_drainage_and_gas_avoid_obstacles(
        seed in any::<u64>(),
        category in prop::sample::select(vec![PipeCategory::Sewer, PipeCategory::Gas]),
        risers in prop::collection::vec(arb_riser(), 1..8),
        boxes in prop::collection::vec(arb_obstacle(), 0..6),
    ) {
        let config = RouterConfig::default();
        let layout = layout();
        let obstacles = ObstacleSet::solid(boxes);
        let request = RouteRequest::new(category, &risers, &layout, &obstacles).with_exit(true);
        let mut rng = RouteRng::seeded(seed);
        let outcome = route_category(&request, &config, &mut rng, &mut FloorObjectStore::new());

        if !outcome.trunk_fallback {
            check_clearance(&outcome, &obstacles, &config)?;
        }
    }

    /// Same seed, same network.
    #[test]
    fn proptest_routing_is_deterministic(
        seed in any::<u64>(),
        risers in prop::collection::vec(arb_riser(), 1..6),
        boxes in prop::collection::vec(arb_obstacle(), 0..4),
    ) {
        let config = RouterConfig::default();
        let layout = layout();
        let obstacles = ObstacleSet::solid(boxes);
        let request = RouteRequest::new(PipeCategory::Sewer, &risers, &layout, &obstacles);
        let a = route_category(&request, &config, &mut RouteRng::seeded(seed), &mut FloorObjectStore::new());
        let b = route_category(&request, &config, &mut RouteRng::seeded(seed), &mut FloorObjectStore::new());
        prop_assert_eq!(a, b);
    }
}
