// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fitting and insulation emission for a finished network.

use crate::context::RouteContext;
use crate::types::{EndCaps, PipeSegment, SegmentKind};
use pipenet_geometry::{Aabb, Axis, Point3};
use rustc_hash::FxHashSet;

/// Joint positions closer than this share a fitting
const JOINT_CELL: f64 = 1e-4;

type JointKey = (i64, i64, i64, Axis);

#[inline]
fn joint_key(p: &Point3<f64>, axis: Axis) -> JointKey {
    (
        (p.x / JOINT_CELL).round() as i64,
        (p.y / JOINT_CELL).round() as i64,
        (p.z / JOINT_CELL).round() as i64,
        axis,
    )
}

/// Fitting sleeve centered on a joint, oriented along the run axis
pub fn fitting_at(ctx: &RouteContext<'_>, joint: Point3<f64>, axis: Axis, run_radius: f64) -> PipeSegment {
    let half = ctx.config.fitting_length_scale * run_radius;
    let c = joint[axis.index()];
    PipeSegment::along(
        axis,
        c - half,
        c + half,
        joint,
        ctx.config.fitting_radius_scale * run_radius,
        SegmentKind::Fitting,
        EndCaps::BOTH,
    )
}

/// Flag off-footprint runs, then add fittings and, for closed-loop
/// categories, insulation sleeves
///
/// Every open end receives one fitting; joints shared by runs along the
/// same axis get a single fitting. Runs lying wholly outside the basement
/// footprint are kept but flagged, and get neither fittings nor sleeves.
pub fn emit_fittings(ctx: &RouteContext<'_>, mut segments: Vec<PipeSegment>) -> Vec<PipeSegment> {
    let footprint = &ctx.layout.interior;
    let mut joints: FxHashSet<JointKey> = FxHashSet::default();
    let mut fittings = Vec::new();

    for segment in segments.iter_mut() {
        segment.outside_footprint = !segment.bounds().intersects_xy(footprint);
        if segment.outside_footprint {
            continue;
        }
        for hi in [false, true] {
            if segment.caps.at(hi) {
                continue;
            }
            let joint = segment.end(hi);
            if joints.insert(joint_key(&joint, segment.axis)) {
                fittings.push(fitting_at(ctx, joint, segment.axis, segment.radius));
            }
        }
    }

    let sleeves = if ctx.category.is_closed_loop() {
        insulate(ctx, &segments, &fittings)
    } else {
        Vec::new()
    };

    let outside = segments.iter().filter(|s| s.outside_footprint).count();
    if outside > 0 {
        tracing::debug!(category = ?ctx.category, outside, "Segments outside the basement footprint");
    }

    segments.reserve(fittings.len() + sleeves.len());
    segments.extend(fittings);
    segments.extend(sleeves);
    segments
}

/// Insulation sleeves along each run, interrupted around fittings
///
/// Each fitting blocks an exclusion zone: its bounds grown by the sleeve
/// radius across the run and by a small gap along it. Only leftover pieces
/// spanning the whole sleeve cross-section and long enough to matter are
/// kept.
fn insulate(ctx: &RouteContext<'_>, runs: &[PipeSegment], fittings: &[PipeSegment]) -> Vec<PipeSegment> {
    let config = ctx.config;
    let mut sleeves = Vec::new();

    for run in runs.iter().filter(|r| !r.outside_footprint) {
        let axis = run.axis;
        let [t0, t1] = axis.transverse();
        let radius = config.insulation_radius_scale * run.radius;
        let sleeve = PipeSegment { radius, ..*run }.bounds();
        let gap = config.insulation_gap_radii * run.radius;

        let mut pieces: Vec<Aabb> = vec![sleeve];
        for fitting in fittings {
            let zone = fitting
                .bounds()
                .expanded_along(t0, radius)
                .expanded_along(t1, radius)
                .expanded_along(axis, gap);
            if !zone.intersects(&sleeve) {
                continue;
            }
            pieces = pieces.iter().flat_map(|p| p.subtract(&zone)).collect();
        }

        let min_length = config.insulation_min_length_radii * run.radius;
        for piece in pieces {
            let full = (piece.len(t0) - sleeve.len(t0)).abs() < 1e-9 && (piece.len(t1) - sleeve.len(t1)).abs() < 1e-9;
            if !full || piece.len(axis) < min_length {
                continue;
            }
            sleeves.push(PipeSegment::along(
                axis,
                piece.lo(axis),
                piece.hi(axis),
                run.p1,
                radius,
                SegmentKind::Insulation,
                EndCaps::BOTH,
            ));
        }
    }

    sleeves
}
