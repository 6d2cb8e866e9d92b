// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exit synthesis: leading the trunk out of the building.
//!
//! Strategies are tried in order of cost:
//!
//! 1. straight extension of the trunk end nearer an exterior wall
//! 2. right-angle bend from a trunk end to the nearer perpendicular wall
//! 3. vertical drop through the floor at the nearest reachable wall
//!
//! The floor exit always yields a result, so synthesis never fails.

use crate::context::RouteContext;
use crate::types::{EndCaps, FloorObjectStore, PipeSegment, RemovedObjects, SegmentKind};
use pipenet_geometry::{nearest_wall_position, Aabb, Axis, Point3};
use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-6;

/// How a floor exit joins the trunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloorExit {
    /// Trunk extended along its own line to the drop point
    InLine,
    /// Trunk extended, then a bend connector to the drop point
    ExtendedTrunk,
    /// Drop from the middle of the trunk, directly or through a tee connector
    MidSpan,
    /// Right-angle connector from a trunk end to the drop point
    Bend,
    /// No wall position was reachable; the drop sits at the trunk end
    AtTrunkEnd,
}

/// Which exit strategy succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitStrategy {
    Straight { at_high: bool },
    RightAngle { at_high: bool, toward_high: bool },
    Floor(FloorExit),
}

/// Summary of the exit attached to a network
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitDescriptor {
    pub strategy: ExitStrategy,
    /// Where the network leaves the room, at pipe height
    pub exit_point: Point3<f64>,
    /// Floor objects removed to make room for the drop
    pub removed_objects: Option<RemovedObjects>,
}

/// Segments and descriptor produced by [`synthesize_exit`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExitPlan {
    pub segments: Vec<PipeSegment>,
    pub descriptor: ExitDescriptor,
}

/// Attach an exit to `trunk`
///
/// The trunk may be extended and has the cap removed at the end the exit
/// attaches to. `connectors` are the already-placed branch connectors, used
/// to reject bends that would nest with one of them.
pub fn synthesize_exit(
    ctx: &RouteContext<'_>,
    trunk: &mut PipeSegment,
    connectors: &[PipeSegment],
    floor_objects: &mut FloorObjectStore,
) -> ExitPlan {
    if let Some(plan) = straight_exit(ctx, trunk) {
        return plan;
    }
    if let Some(plan) = right_angle_exit(ctx, trunk, connectors) {
        return plan;
    }
    floor_exit(ctx, trunk, floor_objects)
}

fn point_with(base: Point3<f64>, axis: Axis, value: f64) -> Point3<f64> {
    let mut p = base;
    p[axis.index()] = value;
    p
}

fn straight_exit(ctx: &RouteContext<'_>, trunk: &mut PipeSegment) -> Option<ExitPlan> {
    let interior = &ctx.layout.interior;
    let primary = trunk.axis;
    let gap_lo = trunk.end_coord(false) - interior.lo(primary);
    let gap_hi = interior.hi(primary) - trunk.end_coord(true);
    let at_high = gap_hi < gap_lo;
    let (gap, wall) = if at_high {
        (gap_hi, interior.hi(primary))
    } else {
        (gap_lo, interior.lo(primary))
    };
    let start = trunk.end(at_high);

    if gap <= EPS {
        // trunk already reaches the wall
        return Some(ExitPlan {
            segments: Vec::new(),
            descriptor: ExitDescriptor {
                strategy: ExitStrategy::Straight { at_high },
                exit_point: start,
                removed_objects: None,
            },
        });
    }

    let exit = PipeSegment::new(
        start,
        point_with(start, primary, wall),
        trunk.radius,
        primary,
        SegmentKind::Exit { through_floor: false },
        EndCaps::new(false, true),
    );
    if !ctx.run_is_clear(&exit) {
        return None;
    }
    trunk.caps.set(at_high, false);
    tracing::debug!(category = ?ctx.category, at_high, length = gap, "Straight wall exit");
    Some(ExitPlan {
        segments: vec![exit],
        descriptor: ExitDescriptor {
            strategy: ExitStrategy::Straight { at_high },
            exit_point: point_with(start, primary, wall),
            removed_objects: None,
        },
    })
}

/// A bend whose perpendicular range nests with a connector it overlaps
fn nests_with_connector(bend: &PipeSegment, connectors: &[PipeSegment]) -> bool {
    let perp = bend.axis;
    let primary = perp.other_horizontal();
    let (b_lo, b_hi) = (bend.end_coord(false), bend.end_coord(true));
    connectors.iter().any(|c| {
        let overlaps = (c.p1[primary.index()] - bend.p1[primary.index()]).abs() < c.radius + bend.radius;
        if !overlaps {
            return false;
        }
        let (c_lo, c_hi) = (c.end_coord(false), c.end_coord(true));
        (b_lo <= c_lo && b_hi >= c_hi) || (c_lo <= b_lo && c_hi >= b_hi)
    })
}

fn right_angle_exit(
    ctx: &RouteContext<'_>,
    trunk: &mut PipeSegment,
    connectors: &[PipeSegment],
) -> Option<ExitPlan> {
    let interior = &ctx.layout.interior;
    let primary = trunk.axis;
    let perp = primary.other_horizontal();
    let c = trunk.p1[perp.index()];
    let toward_high = interior.hi(perp) - c < c - interior.lo(perp);
    let wall = if toward_high {
        interior.hi(perp)
    } else {
        interior.lo(perp)
    };

    let prefer_high = interior.hi(primary) - trunk.end_coord(true) < trunk.end_coord(false) - interior.lo(primary);
    for at_high in [prefer_high, !prefer_high] {
        let start = trunk.end(at_high);
        let bend = PipeSegment::new(
            start,
            point_with(start, perp, wall),
            trunk.radius,
            perp,
            SegmentKind::BendConnector,
            EndCaps::new(false, true),
        );
        if bend.length() <= EPS || !ctx.run_is_clear(&bend) || nests_with_connector(&bend, connectors) {
            continue;
        }
        trunk.caps.set(at_high, false);
        tracing::debug!(category = ?ctx.category, at_high, toward_high, "Right-angle wall exit");
        return Some(ExitPlan {
            segments: vec![bend],
            descriptor: ExitDescriptor {
                strategy: ExitStrategy::RightAngle { at_high, toward_high },
                exit_point: point_with(start, perp, wall),
                removed_objects: None,
            },
        });
    }
    None
}

fn floor_exit(ctx: &RouteContext<'_>, trunk: &mut PipeSegment, floor_objects: &mut FloorObjectStore) -> ExitPlan {
    let layout = ctx.layout;
    let primary = trunk.axis;
    let perp = primary.other_horizontal();
    let c = trunk.p1[perp.index()];
    let floor_z = layout.floor_z();
    let search: Vec<Aabb> = ctx.obstacles.all().copied().collect();
    let reach = ctx.config.clearance_scale * trunk.radius;

    // the unmodified end point counts as distance zero and wins outright
    let candidates = [false, true].map(|at_high| {
        let end = trunk.end(at_high);
        let pos = nearest_wall_position(end, reach, &layout.interior, &layout.walls, &search, true, floor_z);
        (at_high, pos, (pos - end).xy().norm())
    });
    let (at_high, pos, distance) = if candidates[1].2 < candidates[0].2 {
        candidates[1]
    } else {
        candidates[0]
    };

    let mut segments = Vec::with_capacity(2);
    let (lo, hi) = (trunk.end_coord(false), trunk.end_coord(true));
    let along = pos[primary.index()];
    let lateral = pos[perp.index()] - c;
    let beyond = along < lo - EPS || along > hi + EPS;
    let mut removed_objects = None;

    let kind = if distance <= EPS {
        trunk.caps.set(at_high, false);
        removed_objects = floor_objects.remove_at(&pos);
        tracing::warn!(
            category = ?ctx.category,
            x = pos.x,
            y = pos.y,
            removed = removed_objects.map_or(0, |r| r.count),
            "No reachable wall for floor exit, dropping at trunk end"
        );
        FloorExit::AtTrunkEnd
    } else if lateral.abs() <= EPS {
        if beyond {
            let extend_high = along > hi;
            trunk.set_end_coord(extend_high, along);
            trunk.caps.set(extend_high, false);
            FloorExit::InLine
        } else {
            FloorExit::MidSpan
        }
    } else {
        let joint = point_with(pos, perp, c);
        let kind = if beyond {
            let extend_high = along > hi;
            trunk.set_end_coord(extend_high, along);
            trunk.caps.set(extend_high, false);
            FloorExit::ExtendedTrunk
        } else if (along - lo).abs() <= EPS || (along - hi).abs() <= EPS {
            trunk.caps.set((along - hi).abs() <= EPS, false);
            FloorExit::Bend
        } else {
            FloorExit::MidSpan
        };
        segments.push(PipeSegment::new(
            joint,
            pos,
            trunk.radius,
            perp,
            SegmentKind::BendConnector,
            EndCaps::NONE,
        ));
        kind
    };

    segments.push(PipeSegment::new(
        Point3::new(pos.x, pos.y, floor_z),
        Point3::new(pos.x, pos.y, ctx.pipe_z),
        trunk.radius,
        Axis::Z,
        SegmentKind::Exit { through_floor: true },
        EndCaps::new(true, false),
    ));

    tracing::debug!(category = ?ctx.category, exit = ?kind, distance, "Floor exit");
    ExitPlan {
        segments,
        descriptor: ExitDescriptor {
            strategy: ExitStrategy::Floor(kind),
            exit_point: Point3::new(pos.x, pos.y, ctx.pipe_z),
            removed_objects,
        },
    }
}
