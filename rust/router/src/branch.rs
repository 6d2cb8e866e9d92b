// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Branch synthesis: connectors from the trunk out to each cluster's risers.
//!
//! Each cluster gets up to two connectors, one on each side of the trunk,
//! running along the perpendicular axis at the cluster key. Risers are
//! visited nearest-first so every connector only ever grows outward. A
//! riser whose extension is blocked is either retreated halfway toward the
//! trunk (long extensions only) or folded into a spillover capacity that
//! enlarges the next riser of the cluster that does connect. Risers within
//! one main radius of the trunk line drop straight into it with no
//! connector.

use crate::cluster::Cluster;
use crate::context::RouteContext;
use crate::intake::PlacedRiser;
use crate::types::{EndCaps, PipeSegment, SegmentKind};
use pipenet_geometry::{merged_radius, Axis, Point3};

/// Geometry produced by [`synthesize_branches`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Branches {
    pub risers: Vec<PipeSegment>,
    pub connectors: Vec<PipeSegment>,
    /// Risers that could not be connected; their capacity went to spillover
    pub folded: usize,
    /// Risers moved halfway toward the trunk to clear an obstacle
    pub retreated: usize,
    /// Spillover still pending when its cluster ran out of risers
    pub stranded_spillover: f64,
}

#[derive(Debug, Clone, Copy)]
struct Side {
    sign: f64,
    /// Current outer end along the perpendicular axis
    end: f64,
    radius: f64,
    risers: usize,
}

impl Side {
    fn new(sign: f64, trunk_c: f64) -> Self {
        Self {
            sign,
            end: trunk_c,
            radius: 0.0,
            risers: 0,
        }
    }

    /// Outer end after reaching a riser at `perp` with radius `r`
    fn reach(&self, perp: f64, r: f64) -> f64 {
        let target = perp + self.sign * r;
        if self.sign * (target - self.end) > 0.0 {
            target
        } else {
            self.end
        }
    }
}

fn riser_segment(pos: Point3<f64>, radius: f64, pipe_z: f64) -> PipeSegment {
    PipeSegment::new(
        Point3::new(pos.x, pos.y, pipe_z),
        pos,
        radius,
        Axis::Z,
        SegmentKind::Riser,
        EndCaps::new(false, true),
    )
}

fn connector(
    primary: Axis,
    key: f64,
    trunk_c: f64,
    end: f64,
    radius: f64,
    z: f64,
    cluster: usize,
) -> PipeSegment {
    let perp = primary.other_horizontal();
    let mut a = Point3::new(0.0, 0.0, z);
    a[primary.index()] = key;
    a[perp.index()] = trunk_c;
    let mut b = a;
    b[perp.index()] = end;
    PipeSegment::new(a, b, radius, perp, SegmentKind::Connector { cluster }, EndCaps::new(false, true))
}

/// Connect every cluster's risers to `trunk`
///
/// Cluster members index into `risers`; connectors are tagged with the
/// cluster's position in `clusters`.
pub fn synthesize_branches(
    ctx: &RouteContext<'_>,
    trunk: &PipeSegment,
    clusters: &[Cluster],
    risers: &[PlacedRiser],
) -> Branches {
    let config = ctx.config;
    let primary = trunk.axis;
    let perp = primary.other_horizontal();
    let trunk_c = trunk.p1[perp.index()];
    let main_radius = trunk.radius;
    let mut out = Branches::default();

    for (cluster_index, cluster) in clusters.iter().enumerate() {
        let mut members: Vec<usize> = cluster.members.to_vec();
        members.sort_by(|&a, &b| {
            let da = (risers[a].pos[perp.index()] - trunk_c).abs();
            let db = (risers[b].pos[perp.index()] - trunk_c).abs();
            da.total_cmp(&db).then(a.cmp(&b))
        });

        let mut sides = [Side::new(-1.0, trunk_c), Side::new(1.0, trunk_c)];
        let mut spill = 0.0;

        for m in members {
            let riser = &risers[m];
            let r = riser.radius;
            let mut pos = riser.pos;
            pos[primary.index()] = cluster.key;

            if pos != riser.pos && !ctx.riser_is_clear(&pos, r) {
                spill = merged_radius(spill, r, config.spillover_exponent);
                out.folded += 1;
                tracing::debug!(riser = riser.source, "Snapped riser collides, folding into spillover");
                continue;
            }

            // pending spillover is carried by this riser only if the larger pipe fits
            let grown = merged_radius(r, spill, config.spillover_exponent);
            let riser_radius = if grown > r && ctx.riser_is_clear(&pos, grown) {
                grown
            } else {
                r
            };
            let lateral = pos[perp.index()] - trunk_c;
            if lateral.abs() <= main_radius {
                out.risers.push(riser_segment(pos, riser_radius, ctx.pipe_z));
                if riser_radius > r {
                    spill = 0.0;
                }
                continue;
            }

            let side = if lateral < 0.0 { &mut sides[0] } else { &mut sides[1] };
            let radius = merged_radius(side.radius, riser_radius, config.merge_exponent).min(main_radius);
            let end = side.reach(pos[perp.index()], riser_radius);
            let candidate = connector(primary, cluster.key, trunk_c, end, radius, ctx.pipe_z, cluster_index);

            let mut accepted = ctx.run_is_clear(&candidate).then_some((pos, end));
            if accepted.is_none() {
                let extension = (pos[perp.index()] + side.sign * riser_radius - side.end).abs();
                if extension > config.retreat_radii * r {
                    let mut retreated = pos;
                    retreated[perp.index()] -= side.sign * extension / 2.0;
                    let end = side.reach(retreated[perp.index()], riser_radius);
                    let candidate =
                        connector(primary, cluster.key, trunk_c, end, radius, ctx.pipe_z, cluster_index);
                    if ctx.run_is_clear(&candidate) && ctx.riser_is_clear(&retreated, riser_radius) {
                        out.retreated += 1;
                        accepted = Some((retreated, end));
                    }
                }
            }

            match accepted {
                Some((pos, end)) => {
                    side.end = end;
                    side.radius = radius;
                    side.risers += 1;
                    out.risers.push(riser_segment(pos, riser_radius, ctx.pipe_z));
                    if riser_radius > r {
                        spill = 0.0;
                    }
                }
                None => {
                    spill = merged_radius(spill, r, config.spillover_exponent);
                    out.folded += 1;
                    tracing::debug!(riser = riser.source, cluster = cluster_index, "Branch blocked, folding into spillover");
                }
            }
        }

        if spill > 0.0 {
            out.stranded_spillover = merged_radius(out.stranded_spillover, spill, config.spillover_exponent);
        }

        for side in sides {
            if side.risers == 0 {
                continue;
            }
            out.connectors.push(connector(
                primary,
                cluster.key,
                trunk_c,
                side.end,
                side.radius,
                ctx.pipe_z,
                cluster_index,
            ));
        }
    }

    out
}
