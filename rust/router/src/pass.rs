// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Basement pass: routes every category in order against a growing
//! obstacle set.

use crate::config::RouterConfig;
use crate::obstacles::{ObstacleAccumulator, ObstacleSet};
use crate::rng::RouteRng;
use crate::route::{route_category, RouteOutcome, RouteRequest};
use crate::types::{BasementLayout, FloorObjectStore, FlowDirection, PipeCategory, RiserPoint};
use pipenet_geometry::Vector3;
use serde::{Deserialize, Serialize};

/// Riser points of every category in one basement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureSet {
    #[serde(default)]
    pub drains: Vec<RiserPoint>,
    #[serde(default)]
    pub cold: Vec<RiserPoint>,
    #[serde(default)]
    pub hot: Vec<RiserPoint>,
    #[serde(default)]
    pub gas: Vec<RiserPoint>,
}

impl FixtureSet {
    pub fn risers(&self, category: PipeCategory) -> &[RiserPoint] {
        match category {
            PipeCategory::Sewer => &self.drains,
            PipeCategory::ColdWater => &self.cold,
            PipeCategory::HotWater => &self.hot,
            PipeCategory::Gas => &self.gas,
        }
    }

    /// Fill in supply risers from the drains when none were given
    pub fn with_derived_supply(mut self, config: &RouterConfig) -> Self {
        if self.cold.is_empty() && self.hot.is_empty() && !self.drains.is_empty() {
            let (cold, hot) = derive_supply_risers(&self.drains, config);
            self.cold = cold;
            self.hot = hot;
        }
        self
    }
}

/// Supply risers beside each drain
///
/// Every drain gets a cold supply offset along +X; drains flagged with a
/// secondary flow also get a hot supply offset along -X. Supply risers are
/// thinner than the drain and carry inflow.
pub fn derive_supply_risers(drains: &[RiserPoint], config: &RouterConfig) -> (Vec<RiserPoint>, Vec<RiserPoint>) {
    let offset = Vector3::new(config.supply_offset, 0.0, 0.0);
    let mut cold = Vec::with_capacity(drains.len());
    let mut hot = Vec::new();
    for drain in drains {
        let radius = drain.radius * config.supply_radius_scale;
        cold.push(RiserPoint::new(drain.pos + offset, radius).with_flow(FlowDirection::In));
        if drain.has_secondary_flow {
            hot.push(RiserPoint::new(drain.pos - offset, radius).with_flow(FlowDirection::In));
        }
    }
    (cold, hot)
}

/// Identifies the room being piped; seeds every category's generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PassSeed {
    pub floor_index: u32,
    pub room_id: u32,
}

/// Output of [`route_basement`]
#[derive(Debug, Clone, PartialEq)]
pub struct PassResult {
    /// One outcome per category, in routing order
    pub outcomes: Vec<RouteOutcome>,
    /// Base obstacles plus every routed segment
    pub obstacles: ObstacleSet,
}

impl PassResult {
    pub fn outcome(&self, category: PipeCategory) -> Option<&RouteOutcome> {
        self.outcomes.iter().find(|o| o.category == category)
    }
}

/// Route sewer, cold water, hot water and gas in that order
///
/// Each category sees the segments of the ones routed before it as hard
/// obstacles. Categories with no risers produce an empty outcome.
pub fn route_basement(
    layout: &BasementLayout,
    fixtures: &FixtureSet,
    base_obstacles: ObstacleSet,
    floor_objects: &mut FloorObjectStore,
    seed: PassSeed,
    config: &RouterConfig,
) -> PassResult {
    let mut accumulator = ObstacleAccumulator::new(base_obstacles);
    let mut outcomes = Vec::with_capacity(PipeCategory::ALL.len());

    for category in PipeCategory::ALL {
        let risers = fixtures.risers(category);
        let outcome = if risers.is_empty() {
            RouteOutcome::empty(category)
        } else {
            let request = RouteRequest::new(category, risers, layout, accumulator.obstacles());
            let mut rng = RouteRng::for_invocation(seed.floor_index, seed.room_id, category);
            route_category(&request, config, &mut rng, floor_objects)
        };
        accumulator.absorb(&outcome.segments);
        outcomes.push(outcome);
    }

    tracing::info!(
        floor = seed.floor_index,
        room = seed.room_id,
        absorbed = accumulator.absorbed(),
        "Basement pass complete"
    );

    PassResult {
        outcomes,
        obstacles: accumulator.into_inner(),
    }
}
