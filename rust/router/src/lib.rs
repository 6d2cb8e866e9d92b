// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipenet Router
//!
//! Procedural drain, water and gas piping for basements. Risers dropping
//! from fixtures above are gathered into a trunk-and-branch network hung
//! below the ceiling, sized with a power-mean capacity rule, led out of the
//! building and dressed with fittings and insulation.
//!
//! | Module      | Responsibility                                        |
//! |-------------|-------------------------------------------------------|
//! | `intake`    | riser placement with jitter, footprint, primary axis  |
//! | `cluster`   | 1D grouping of riser coordinates                      |
//! | `trunk`     | trunk line search                                     |
//! | `branch`    | connectors, retreat and spillover                     |
//! | `exit`      | wall and floor exits                                  |
//! | `fittings`  | joint fittings and insulation sleeves                 |
//! | `route`     | per-category pipeline and riser-set reduction         |
//! | `pass`      | all categories of one basement, obstacle accumulation |
//! | `render`    | mesh export                                           |
//!
//! Routing is deterministic for a given seed and never fails; everything
//! that cannot be placed is reported on [`RouteOutcome`].

pub mod branch;
pub mod cluster;
pub mod config;
pub mod context;
pub mod error;
pub mod exit;
pub mod fittings;
pub mod intake;
pub mod obstacles;
pub mod pass;
pub mod render;
pub mod rng;
pub mod route;
pub mod trunk;
pub mod types;

pub use cluster::{cluster_positions, Cluster};
pub use config::RouterConfig;
pub use context::RouteContext;
pub use error::{Error, Result};
pub use exit::{ExitDescriptor, ExitStrategy, FloorExit};
pub use obstacles::{ObstacleAccumulator, ObstacleSet};
pub use pass::{derive_supply_risers, route_basement, FixtureSet, PassResult, PassSeed};
pub use render::{outcome_mesh, outcome_meshes, tessellate_segment, CategoryMesh};
pub use rng::RouteRng;
pub use route::{route_category, RouteOutcome, RouteRequest};
pub use trunk::TrunkPlacement;
pub use types::{
    BasementLayout, EndCaps, FloorObject, FloorObjectKind, FloorObjectStore, FlowDirection, PipeCategory,
    PipeSegment, RemovedObjects, RiserPoint, SegmentKind,
};

pub use pipenet_geometry::{merge_all, merged_radius, Aabb, Axis, Point3};
