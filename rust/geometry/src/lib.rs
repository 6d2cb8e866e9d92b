// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipenet Geometry
//!
//! Axis-aligned box utilities, pipe capacity merging, obstacle-aware wall
//! search and pipe tessellation shared by the basement pipe router.

pub mod aabb;
pub mod capacity;
pub mod error;
pub mod mesh;
pub mod wall_search;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use aabb::{Aabb, Axis};
pub use capacity::{merge_all, merged_radius, try_merged_radius};
pub use error::{Error, Result};
pub use mesh::{pipe_cylinder, Mesh};
pub use wall_search::{nearest_wall_hit, nearest_wall_position, WallHit};
