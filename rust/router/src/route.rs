// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-category routing pipeline.
//!
//! intake -> clustering -> trunk placement (with riser-set reduction) ->
//! branches -> exit -> fittings

use crate::branch::synthesize_branches;
use crate::cluster::{cluster_positions, Cluster};
use crate::config::RouterConfig;
use crate::context::RouteContext;
use crate::exit::{synthesize_exit, ExitDescriptor};
use crate::fittings::emit_fittings;
use crate::intake::{intake_risers, primary_axis, riser_footprint, Intake, PlacedRiser};
use crate::obstacles::ObstacleSet;
use crate::rng::RouteRng;
use crate::trunk::{place_trunk, TrunkPlacement};
use crate::types::{BasementLayout, FloorObjectStore, PipeCategory, PipeSegment, RiserPoint, SegmentKind};
use pipenet_geometry::{merge_all, Aabb, Axis};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Inputs of one routing invocation
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest<'a> {
    pub category: PipeCategory,
    pub risers: &'a [RiserPoint],
    pub layout: &'a BasementLayout,
    pub obstacles: &'a ObstacleSet,
    /// Retry with extreme risers stripped when no trunk line is clear
    pub allow_reduction: bool,
    /// Lead the network out of the building
    pub exit_required: bool,
}

impl<'a> RouteRequest<'a> {
    /// Request with reduction enabled and the category's default exit rule
    pub fn new(
        category: PipeCategory,
        risers: &'a [RiserPoint],
        layout: &'a BasementLayout,
        obstacles: &'a ObstacleSet,
    ) -> Self {
        Self {
            category,
            risers,
            layout,
            obstacles,
            allow_reduction: true,
            exit_required: category.default_exit_required(),
        }
    }

    pub fn with_reduction(mut self, allow: bool) -> Self {
        self.allow_reduction = allow;
        self
    }

    pub fn with_exit(mut self, required: bool) -> Self {
        self.exit_required = required;
        self
    }
}

/// Everything produced for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOutcome {
    pub category: PipeCategory,
    /// Runs, then fittings, then insulation sleeves
    pub segments: Vec<PipeSegment>,
    pub exit: Option<ExitDescriptor>,
    pub primary_axis: Option<Axis>,
    /// Risers with no valid position at intake
    pub dropped_at_intake: usize,
    /// Risers left out by riser-set reduction
    pub stripped_risers: usize,
    /// Risers whose branch could not be built
    pub folded_branch_risers: usize,
    /// Risers moved halfway toward the trunk to clear an obstacle
    pub retreated_branch_risers: usize,
    /// Folded capacity no connected sibling could carry
    pub stranded_spillover: f64,
    /// Trunk placement attempts, one per riser subset tried
    pub attempts: usize,
    /// Extreme clusters stripped, one at a time, before a trunk fit
    pub reduction_depth: usize,
    /// Lateral trunk offset in diameters
    pub trunk_offset_steps: i32,
    /// No subset produced a clear trunk; the centroid line was used anyway
    pub trunk_fallback: bool,
}

impl RouteOutcome {
    pub fn empty(category: PipeCategory) -> Self {
        Self {
            category,
            segments: Vec::new(),
            exit: None,
            primary_axis: None,
            dropped_at_intake: 0,
            stripped_risers: 0,
            folded_branch_risers: 0,
            retreated_branch_risers: 0,
            stranded_spillover: 0.0,
            attempts: 0,
            reduction_depth: 0,
            trunk_offset_steps: 0,
            trunk_fallback: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn trunk(&self) -> Option<&PipeSegment> {
        self.segments.iter().find(|s| s.kind == SegmentKind::Main)
    }

    /// Segments of one kind
    pub fn of_kind(&self, kind: SegmentKind) -> impl Iterator<Item = &PipeSegment> {
        self.segments.iter().filter(move |s| s.kind == kind)
    }

    pub fn connected_risers(&self) -> usize {
        self.of_kind(SegmentKind::Riser).count()
    }

    /// Segments inside the basement footprint
    pub fn rendered(&self) -> impl Iterator<Item = &PipeSegment> {
        self.segments.iter().filter(|s| !s.outside_footprint)
    }
}

/// One pass of the pipeline front half over a riser subset
struct TrunkAttempt<'a> {
    ctx: RouteContext<'a>,
    /// Indices into the placed risers, ascending
    subset: Vec<usize>,
    primary: Axis,
    /// Members index into the placed risers
    clusters: Vec<Cluster>,
    placement: TrunkPlacement,
}

/// Outcome of [`search_trunk`]
struct TrunkSearch<'a> {
    attempt: TrunkAttempt<'a>,
    attempts: usize,
    depth: usize,
    fallback: bool,
}

/// Size, orient, cluster and place a trunk for `subset` alone
///
/// The pipe plane follows the subset's own main radius, so a reduced set
/// may route higher than the full one; every riser volume accepted at
/// intake stays inside the smaller check volume.
fn attempt_subset<'a>(
    request: &RouteRequest<'a>,
    config: &'a RouterConfig,
    placed: &[PlacedRiser],
    subset: Vec<usize>,
    primary: Option<Axis>,
    rng: &mut RouteRng,
) -> TrunkAttempt<'a> {
    let radius = merge_all(subset.iter().map(|&i| placed[i].radius), config.merge_exponent);
    let ctx = RouteContext::new(config, request.layout, request.obstacles, request.category, radius);

    let mut footprint = Aabb::empty();
    for &i in &subset {
        footprint.union_with(&riser_footprint(&placed[i].pos, placed[i].radius, ctx.pipe_z));
    }
    let primary = primary.unwrap_or_else(|| primary_axis(&footprint, rng));

    let coords: Vec<f64> = subset.iter().map(|&i| placed[i].pos[primary.index()]).collect();
    let clusters = cluster_positions(&coords, config.alignment_tolerance())
        .into_iter()
        .map(|mut cluster| {
            for member in cluster.members.iter_mut() {
                *member = subset[*member];
            }
            cluster
        })
        .collect();

    let placement = place_trunk(&ctx, &footprint, primary, radius);
    TrunkAttempt {
        ctx,
        subset,
        primary,
        clusters,
        placement,
    }
}

/// Queue the subsets left after stripping the lowest and the highest cluster
///
/// The high strip is pushed first so the low strip is popped first.
fn push_reductions(
    attempt: &TrunkAttempt<'_>,
    depth: usize,
    stack: &mut Vec<(Vec<usize>, usize)>,
    seen: &mut FxHashSet<Vec<usize>>,
) {
    let clusters = &attempt.clusters;
    if clusters.len() < 2 {
        return;
    }
    for stripped in [&clusters[clusters.len() - 1], &clusters[0]] {
        let reduced: Vec<usize> = attempt
            .subset
            .iter()
            .copied()
            .filter(|i| !stripped.members.contains(i))
            .collect();
        if seen.insert(reduced.clone()) {
            stack.push((reduced, depth + 1));
        }
    }
}

/// Find a riser subset that admits a clear trunk
///
/// Starts from every placed riser. On failure the extreme clusters of the
/// failed subset are stripped, low end before high end, and the reduced
/// subsets are retried depth-first from an explicit stack, each one
/// re-running orientation, clustering and placement. Every strip removes
/// at least one riser, so the depth stays below the riser count; subsets
/// are tried once and the attempts are capped at `n (n + 1) / 2`, the
/// number of contiguous runs of `n` risers. When nothing fits, the full
/// set's best-effort placement is kept.
fn search_trunk<'a>(
    request: &RouteRequest<'a>,
    config: &'a RouterConfig,
    intake: &Intake,
    rng: &mut RouteRng,
) -> TrunkSearch<'a> {
    let placed = &intake.placed;
    let n = placed.len();
    let budget = n * (n + 1) / 2;

    let full = attempt_subset(request, config, placed, (0..n).collect(), Some(intake.primary), rng);
    if full.placement.valid {
        return TrunkSearch {
            attempt: full,
            attempts: 1,
            depth: 0,
            fallback: false,
        };
    }

    let mut attempts = 1;
    let mut stack = Vec::new();
    let mut seen: FxHashSet<Vec<usize>> = FxHashSet::default();
    if request.allow_reduction {
        push_reductions(&full, 0, &mut stack, &mut seen);
    }

    while let Some((subset, depth)) = stack.pop() {
        if attempts >= budget {
            break;
        }
        attempts += 1;
        let attempt = attempt_subset(request, config, placed, subset, None, rng);
        if attempt.placement.valid {
            tracing::debug!(
                category = ?request.category,
                kept = attempt.subset.len(),
                depth,
                attempts,
                "Trunk fits after stripping extreme risers"
            );
            return TrunkSearch {
                attempt,
                attempts,
                depth,
                fallback: false,
            };
        }
        push_reductions(&attempt, depth, &mut stack, &mut seen);
    }

    TrunkSearch {
        attempt: full,
        attempts,
        depth: 0,
        fallback: true,
    }
}

/// Route one category's risers into a trunk-and-branch network
///
/// Never fails: risers, branches and subsets that cannot be placed are
/// dropped or folded and counted on the outcome. `floor_objects` is only
/// touched when a floor exit lands on a placed object.
pub fn route_category(
    request: &RouteRequest<'_>,
    config: &RouterConfig,
    rng: &mut RouteRng,
    floor_objects: &mut FloorObjectStore,
) -> RouteOutcome {
    let category = request.category;
    let mut outcome = RouteOutcome::empty(category);

    let estimate = merge_all(
        request
            .risers
            .iter()
            .map(|r| r.radius)
            .filter(|r| r.is_finite() && *r > 0.0),
        config.merge_exponent,
    );
    if estimate <= 0.0 {
        outcome.dropped_at_intake = request.risers.len();
        tracing::debug!(category = ?category, "No risers to route");
        return outcome;
    }

    let intake_ctx = RouteContext::new(config, request.layout, request.obstacles, category, estimate);
    let intake = intake_risers(&intake_ctx, request.risers, rng);
    outcome.dropped_at_intake = intake.dropped;
    if intake.is_empty() {
        tracing::warn!(category = ?category, dropped = intake.dropped, "Every riser was dropped at intake");
        return outcome;
    }

    let TrunkSearch {
        attempt,
        attempts,
        depth,
        fallback,
    } = search_trunk(request, config, &intake, rng);
    if fallback {
        tracing::warn!(
            category = ?category,
            attempts,
            "No clear trunk line, keeping the centroid line"
        );
    }
    let ctx = attempt.ctx;
    outcome.primary_axis = Some(attempt.primary);

    let mut trunk = attempt.placement.segment;
    let branches = synthesize_branches(&ctx, &trunk, &attempt.clusters, &intake.placed);

    let mut exit_segments = Vec::new();
    if request.exit_required {
        let plan = synthesize_exit(&ctx, &mut trunk, &branches.connectors, floor_objects);
        exit_segments = plan.segments;
        outcome.exit = Some(plan.descriptor);
    }

    let mut segments =
        Vec::with_capacity(1 + branches.connectors.len() + branches.risers.len() + exit_segments.len());
    segments.push(trunk);
    segments.extend(branches.connectors);
    segments.extend(branches.risers);
    segments.extend(exit_segments);

    outcome.segments = emit_fittings(&ctx, segments);
    outcome.stripped_risers = intake.placed.len() - attempt.subset.len();
    outcome.folded_branch_risers = branches.folded;
    outcome.retreated_branch_risers = branches.retreated;
    outcome.stranded_spillover = branches.stranded_spillover;
    outcome.attempts = attempts;
    outcome.reduction_depth = depth;
    outcome.trunk_offset_steps = attempt.placement.offset_steps;
    outcome.trunk_fallback = fallback;

    tracing::info!(
        category = ?category,
        risers = request.risers.len(),
        clusters = attempt.clusters.len(),
        attempts = outcome.attempts,
        reduction_depth = outcome.reduction_depth,
        dropped = outcome.dropped_at_intake,
        stripped = outcome.stripped_risers,
        folded = outcome.folded_branch_risers,
        segments = outcome.segments.len(),
        "Routed category"
    );

    outcome
}
