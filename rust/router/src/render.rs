// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle mesh export of routed networks.

use crate::error::Result;
use crate::route::RouteOutcome;
use crate::types::{PipeCategory, PipeSegment};
use pipenet_geometry::{pipe_cylinder, Mesh};

/// Merged geometry of one category
#[derive(Debug, Clone)]
pub struct CategoryMesh {
    pub category: PipeCategory,
    pub color: [f32; 4],
    pub material: &'static str,
    pub mesh: Mesh,
}

/// Tessellate one segment, closing its capped ends
pub fn tessellate_segment(segment: &PipeSegment, sides: u32) -> Result<Mesh> {
    Ok(pipe_cylinder(
        segment.p1,
        segment.p2,
        segment.radius,
        sides,
        segment.caps.lo,
        segment.caps.hi,
    )?)
}

/// One merged mesh for everything a category placed inside the footprint
///
/// Degenerate segments are skipped.
pub fn outcome_mesh(outcome: &RouteOutcome, sides: u32) -> CategoryMesh {
    let mut meshes = Vec::new();
    for segment in outcome.rendered() {
        match tessellate_segment(segment, sides) {
            Ok(mesh) => meshes.push(mesh),
            Err(err) => {
                tracing::debug!(category = ?outcome.category, error = %err, "Skipping segment");
            }
        }
    }
    CategoryMesh {
        category: outcome.category,
        color: outcome.category.color(),
        material: outcome.category.material(),
        mesh: Mesh::concat(&meshes),
    }
}

/// Meshes of every non-empty outcome
pub fn outcome_meshes(outcomes: &[RouteOutcome], sides: u32) -> Vec<CategoryMesh> {
    outcomes
        .iter()
        .filter(|o| !o.is_empty())
        .map(|o| outcome_mesh(o, sides))
        .collect()
}
