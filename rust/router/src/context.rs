// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared state of one routing invocation and its placement tests.

use crate::config::RouterConfig;
use crate::obstacles::ObstacleSet;
use crate::types::{BasementLayout, PipeCategory, PipeSegment};
use pipenet_geometry::{Aabb, Point3};

/// Read-only inputs every routing stage consults
#[derive(Debug, Clone, Copy)]
pub struct RouteContext<'a> {
    pub config: &'a RouterConfig,
    pub layout: &'a BasementLayout,
    pub obstacles: &'a ObstacleSet,
    pub category: PipeCategory,
    /// Height of the horizontal pipe plane for this category
    pub pipe_z: f64,
    /// Lowest point a riser check volume reaches
    pub riser_floor_z: f64,
}

impl<'a> RouteContext<'a> {
    /// Derive the pipe plane from the category tier and the estimated main radius
    pub fn new(
        config: &'a RouterConfig,
        layout: &'a BasementLayout,
        obstacles: &'a ObstacleSet,
        category: PipeCategory,
        main_radius: f64,
    ) -> Self {
        let pad = config.clearance_scale * main_radius;
        let pipe_z = layout.ceiling_z - category.tier() as f64 * config.tier_spacing - pad;
        Self {
            config,
            layout,
            obstacles,
            category,
            pipe_z,
            riser_floor_z: pipe_z - pad,
        }
    }

    /// A horizontal run clears every hard obstacle
    pub fn run_is_clear(&self, segment: &PipeSegment) -> bool {
        !segment
            .clearance_bounds(self.config.clearance_scale)
            .intersects_any(&self.obstacles.no_clearance)
    }

    /// Check volume of a riser standing at `(x, y)` with its top at `pos.z`
    ///
    /// Reaches at least `riser_floor_z`, and further down for risers grown
    /// past the main radius estimate.
    pub fn riser_volume(&self, pos: &Point3<f64>, radius: f64) -> Aabb {
        let pad = self.config.clearance_scale * radius;
        let floor = self.riser_floor_z.min(self.pipe_z - pad);
        Aabb::from_corners(
            Point3::new(pos.x - pad, pos.y - pad, floor),
            Point3::new(pos.x + pad, pos.y + pad, pos.z),
        )
    }

    /// A riser stays in the building and clears obstacles, walls and beams
    pub fn riser_is_clear(&self, pos: &Point3<f64>, radius: f64) -> bool {
        if pos.z <= self.pipe_z {
            return false;
        }
        let volume = self.riser_volume(pos, radius);
        self.layout.building.contains(&volume)
            && !volume.intersects_any(&self.obstacles.no_clearance)
            && !volume.intersects_any(&self.layout.walls)
            && !volume.intersects_any(&self.layout.beams)
    }
}
