// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Obstacle sets and the per-pass accumulator.

use crate::types::PipeSegment;
use pipenet_geometry::Aabb;
use serde::{Deserialize, Serialize};

/// Boxes the router must avoid, grouped by how much room they need
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSet {
    /// Solids pipes may not overlap; tested by every run
    #[serde(default)]
    pub no_clearance: Vec<Aabb>,
    /// Volumes kept free for walking or driving
    #[serde(default)]
    pub travel_clearance: Vec<Aabb>,
    /// Volumes kept free floor to ceiling (stairs, ramps)
    #[serde(default)]
    pub full_clearance: Vec<Aabb>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding only hard obstacles
    pub fn solid(no_clearance: Vec<Aabb>) -> Self {
        Self {
            no_clearance,
            ..Self::default()
        }
    }

    /// Every box in all three groups
    pub fn all(&self) -> impl Iterator<Item = &Aabb> {
        self.no_clearance
            .iter()
            .chain(&self.travel_clearance)
            .chain(&self.full_clearance)
    }

    pub fn len(&self) -> usize {
        self.no_clearance.len() + self.travel_clearance.len() + self.full_clearance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Obstacle set that grows as categories are routed
///
/// Each routed category's segments become hard obstacles for the ones that
/// follow. Boxes are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct ObstacleAccumulator {
    set: ObstacleSet,
    absorbed: usize,
}

impl ObstacleAccumulator {
    pub fn new(base: ObstacleSet) -> Self {
        Self { set: base, absorbed: 0 }
    }

    #[inline]
    pub fn obstacles(&self) -> &ObstacleSet {
        &self.set
    }

    /// Append the bounds of routed segments as hard obstacles
    pub fn absorb(&mut self, segments: &[PipeSegment]) {
        self.set.no_clearance.reserve(segments.len());
        for segment in segments {
            self.set.no_clearance.push(segment.bounds());
        }
        self.absorbed += segments.len();
    }

    /// Number of segment boxes added since construction
    pub fn absorbed(&self) -> usize {
        self.absorbed
    }

    pub fn into_inner(self) -> ObstacleSet {
        self.set
    }
}
