// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Trunk placement: centroid start with an alternating lateral search.

use crate::context::RouteContext;
use crate::types::{EndCaps, PipeSegment, SegmentKind};
use pipenet_geometry::{Aabb, Axis, Point3};

/// Outcome of [`place_trunk`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrunkPlacement {
    pub segment: PipeSegment,
    /// Signed lateral offset in steps of one trunk diameter
    pub offset_steps: i32,
    /// False when no candidate cleared the obstacles; `segment` is then
    /// the unshifted centroid line
    pub valid: bool,
}

/// Beam running along the trunk and overlapping it in plan
///
/// Beams crossing the trunk are allowed: the pipe plane sits below them.
/// A beam parallel to the trunk would hide or pinch it along its length.
fn runs_along_beam(segment: &PipeSegment, beams: &[Aabb]) -> bool {
    let primary = segment.axis;
    let perp = primary.other_horizontal();
    let c = segment.p1[perp.index()];
    let r = segment.radius;
    beams.iter().any(|beam| {
        let beam_axis = if beam.len(Axis::X) >= beam.len(Axis::Y) {
            Axis::X
        } else {
            Axis::Y
        };
        beam_axis == primary
            && c + r > beam.lo(perp)
            && c - r < beam.hi(perp)
            && segment.p2[primary.index()] > beam.lo(primary)
            && segment.p1[primary.index()] < beam.hi(primary)
    })
}

fn trunk_at(span: &Aabb, primary: Axis, c: f64, radius: f64, z: f64) -> PipeSegment {
    let perp = primary.other_horizontal();
    let mut at = Point3::new(0.0, 0.0, z);
    at[perp.index()] = c;
    PipeSegment::along(
        primary,
        span.lo(primary),
        span.hi(primary),
        at,
        radius,
        SegmentKind::Main,
        EndCaps::BOTH,
    )
}

/// Place a trunk spanning `footprint` along `primary`
///
/// The first candidate runs through the footprint centroid (clamped into
/// the interior). Further candidates step one trunk diameter at a time,
/// alternating sides: 0, +1, -1, +2, -2, ... A side whose next step would
/// leave the interior is exhausted and the search continues on the other
/// side only. At most `ceil(interior width / step)` steps are tried.
pub fn place_trunk(ctx: &RouteContext<'_>, footprint: &Aabb, primary: Axis, radius: f64) -> TrunkPlacement {
    let interior = &ctx.layout.interior;
    let perp = primary.other_horizontal();
    let span = footprint.expanded_along(primary, radius);

    let min_c = interior.lo(perp) + radius;
    let max_c = interior.hi(perp) - radius;
    let c0 = if min_c <= max_c {
        footprint.center()[perp.index()].clamp(min_c, max_c)
    } else {
        interior.center()[perp.index()]
    };

    let step = 2.0 * radius;
    let budget = if step > 0.0 {
        ((interior.len(perp) / step).ceil() as i32).max(1)
    } else {
        1
    };

    let valid_at = |c: f64| {
        let segment = trunk_at(&span, primary, c, radius, ctx.pipe_z);
        (ctx.run_is_clear(&segment) && !runs_along_beam(&segment, &ctx.layout.beams)).then_some(segment)
    };

    if let Some(segment) = valid_at(c0) {
        return TrunkPlacement {
            segment,
            offset_steps: 0,
            valid: true,
        };
    }

    let mut up_open = true;
    let mut down_open = true;
    for k in 1..=budget {
        for sign in [1, -1] {
            let open = if sign > 0 { &mut up_open } else { &mut down_open };
            if !*open {
                continue;
            }
            let offset = sign * k;
            let c = c0 + offset as f64 * step;
            if c < min_c || c > max_c {
                *open = false;
                continue;
            }
            if let Some(segment) = valid_at(c) {
                return TrunkPlacement {
                    segment,
                    offset_steps: offset,
                    valid: true,
                };
            }
        }
        if !up_open && !down_open {
            break;
        }
    }

    tracing::debug!(
        category = ?ctx.category,
        axis = ?primary,
        budget,
        "No clear trunk line found"
    );
    TrunkPlacement {
        segment: trunk_at(&span, primary, c0, radius, ctx.pipe_z),
        offset_steps: 0,
        valid: false,
    }
}
