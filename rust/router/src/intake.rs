// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Riser intake: placement with jitter and footprint accumulation.

use crate::context::RouteContext;
use crate::rng::RouteRng;
use crate::types::RiserPoint;
use pipenet_geometry::{Aabb, Axis, Point3};

/// A riser accepted into the network at its (possibly jittered) position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedRiser {
    /// Index into the input riser list
    pub source: usize,
    /// Accepted position; `z` is the riser top
    pub pos: Point3<f64>,
    pub radius: f64,
    pub has_secondary_flow: bool,
    /// Attempts used, 0 for the unmodified position
    pub jitter_attempt: u32,
}

/// Result of [`intake_risers`]
#[derive(Debug, Clone, PartialEq)]
pub struct Intake {
    pub placed: Vec<PlacedRiser>,
    /// Risers with no valid position, including malformed input
    pub dropped: usize,
    /// Union of the placed risers' horizontal extents at the pipe plane
    pub footprint: Aabb,
    /// Longer horizontal axis of the footprint
    pub primary: Axis,
}

impl Intake {
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }
}

/// Horizontal extent of one riser at the pipe plane
pub fn riser_footprint(pos: &Point3<f64>, radius: f64, pipe_z: f64) -> Aabb {
    Aabb::from_corners(
        Point3::new(pos.x - radius, pos.y - radius, pipe_z),
        Point3::new(pos.x + radius, pos.y + radius, pipe_z),
    )
}

/// Longer horizontal axis of a footprint; equal extents are broken by `rng`
pub fn primary_axis(footprint: &Aabb, rng: &mut RouteRng) -> Axis {
    let dx = footprint.len(Axis::X);
    let dy = footprint.len(Axis::Y);
    if dx > dy {
        Axis::X
    } else if dy > dx {
        Axis::Y
    } else {
        rng.horizontal_axis()
    }
}

/// Place every riser, trying the input position and then random offsets
///
/// Each attempt perturbs one randomly chosen horizontal coordinate of the
/// original position by up to `jitter_radii` riser radii. Risers with no
/// valid attempt are dropped and logged; intake never fails.
pub fn intake_risers(ctx: &RouteContext<'_>, risers: &[RiserPoint], rng: &mut RouteRng) -> Intake {
    let config = ctx.config;
    let mut placed = Vec::with_capacity(risers.len());
    let mut dropped = 0;
    let mut footprint = Aabb::empty();

    for (index, riser) in risers.iter().enumerate() {
        if let Err(err) = riser.validate(index) {
            tracing::warn!(category = ?ctx.category, error = %err, "Skipping malformed riser");
            dropped += 1;
            continue;
        }

        let mut accepted = None;
        for attempt in 0..=config.jitter_attempts {
            let mut pos = riser.pos;
            if attempt > 0 {
                let axis = rng.horizontal_axis();
                pos[axis.index()] += rng.signed_unit() * config.jitter_radii * riser.radius;
            }
            if ctx.riser_is_clear(&pos, riser.radius) {
                accepted = Some((pos, attempt));
                break;
            }
        }

        match accepted {
            Some((pos, attempt)) => {
                if attempt > 0 {
                    tracing::debug!(
                        category = ?ctx.category,
                        riser = index,
                        attempt,
                        "Riser placed after jitter"
                    );
                }
                footprint.union_with(&riser_footprint(&pos, riser.radius, ctx.pipe_z));
                placed.push(PlacedRiser {
                    source: index,
                    pos,
                    radius: riser.radius,
                    has_secondary_flow: riser.has_secondary_flow,
                    jitter_attempt: attempt,
                });
            }
            None => {
                tracing::warn!(
                    category = ?ctx.category,
                    riser = index,
                    x = riser.pos.x,
                    y = riser.pos.y,
                    attempts = config.jitter_attempts + 1,
                    "Dropping riser with no valid placement"
                );
                dropped += 1;
            }
        }
    }

    let primary = if placed.is_empty() {
        Axis::X
    } else {
        primary_axis(&footprint, rng)
    };

    Intake {
        placed,
        dropped,
        footprint,
        primary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::obstacles::ObstacleSet;
    use crate::types::{BasementLayout, PipeCategory};

    fn layout() -> BasementLayout {
        BasementLayout::open(Aabb::from_corners(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 6.0, 3.0),
        ))
    }

    #[test]
    fn test_clear_risers_are_kept_in_place() {
        let config = RouterConfig::default();
        let layout = layout();
        let obstacles = ObstacleSet::new();
        let ctx = RouteContext::new(&config, &layout, &obstacles, PipeCategory::Sewer, 0.05);
        let risers = [
            RiserPoint::new(Point3::new(2.0, 3.0, 3.0), 0.05),
            RiserPoint::new(Point3::new(6.0, 3.2, 3.0), 0.05),
        ];
        let mut rng = RouteRng::seeded(1);
        let intake = intake_risers(&ctx, &risers, &mut rng);
        assert_eq!(intake.placed.len(), 2);
        assert_eq!(intake.dropped, 0);
        assert_eq!(intake.primary, Axis::X);
        assert!(intake.placed.iter().all(|p| p.jitter_attempt == 0));
        assert_eq!(intake.placed[1].pos, risers[1].pos);
    }

    #[test]
    fn test_blocked_riser_is_jittered_or_dropped() {
        let config = RouterConfig::default();
        let layout = layout();
        // Column hugging the riser; a few radii of jitter clears it on one side
        let column = Aabb::from_corners(Point3::new(1.95, 2.95, 0.0), Point3::new(2.05, 3.05, 3.0));
        let obstacles = ObstacleSet::solid(vec![column]);
        let ctx = RouteContext::new(&config, &layout, &obstacles, PipeCategory::Sewer, 0.05);
        let risers = [RiserPoint::new(Point3::new(2.0, 3.0, 3.0), 0.05)];
        let mut rng = RouteRng::seeded(9);
        let intake = intake_risers(&ctx, &risers, &mut rng);
        assert_eq!(intake.placed.len() + intake.dropped, 1);
        if let Some(p) = intake.placed.first() {
            assert!(p.jitter_attempt > 0);
            assert!(ctx.riser_is_clear(&p.pos, p.radius));
        }
    }

    #[test]
    fn test_riser_outside_building_is_dropped() {
        let config = RouterConfig {
            jitter_attempts: 3,
            ..RouterConfig::default()
        };
        let layout = layout();
        let obstacles = ObstacleSet::new();
        let ctx = RouteContext::new(&config, &layout, &obstacles, PipeCategory::Gas, 0.02);
        let risers = [
            RiserPoint::new(Point3::new(40.0, 3.0, 3.0), 0.02),
            RiserPoint::new(Point3::new(4.0, 3.0, 3.0), -1.0),
        ];
        let mut rng = RouteRng::seeded(3);
        let intake = intake_risers(&ctx, &risers, &mut rng);
        assert!(intake.is_empty());
        assert_eq!(intake.dropped, 2);
    }
}
