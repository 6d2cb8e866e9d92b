// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Router tuning parameters.
//!
//! All lengths are in meters. Values expressed "in radii" are multiplied by
//! the radius of the pipe they apply to.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tunable constants for one routing pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Interior wall thickness; the clustering tolerance is derived from it
    pub wall_thickness: f64,
    /// Alignment tolerance as a multiple of wall thickness
    pub alignment_walls: f64,
    /// Power-mean exponent used to size merged runs
    pub merge_exponent: f64,
    /// Power-mean exponent used to fold unconnected risers into a sibling
    pub spillover_exponent: f64,
    /// Random offsets tried after the unmodified riser position
    pub jitter_attempts: u32,
    /// Maximum riser jitter, in riser radii
    pub jitter_radii: f64,
    /// Blocked connector extension above which a halfway retreat is tried, in riser radii
    pub retreat_radii: f64,
    /// Clearance padding applied to every placement test, in pipe radii
    pub clearance_scale: f64,
    /// Fitting radius, in pipe radii
    pub fitting_radius_scale: f64,
    /// Fitting half-length, in pipe radii
    pub fitting_length_scale: f64,
    /// Insulation sleeve radius, in pipe radii
    pub insulation_radius_scale: f64,
    /// Axial gap kept between a sleeve and a fitting, in pipe radii
    pub insulation_gap_radii: f64,
    /// Shortest sleeve worth emitting, in pipe radii
    pub insulation_min_length_radii: f64,
    /// Vertical spacing between the planes of consecutive pipe categories
    pub tier_spacing: f64,
    /// Horizontal offset of derived supply risers from their drain
    pub supply_offset: f64,
    /// Derived supply riser radius relative to the drain radius
    pub supply_radius_scale: f64,
    /// Facets around tessellated pipes
    pub mesh_sides: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            wall_thickness: 0.1,
            alignment_walls: 1.0,
            merge_exponent: 4.0,
            spillover_exponent: 3.0,
            jitter_attempts: 20,
            jitter_radii: 4.0,
            retreat_radii: 8.0,
            clearance_scale: 1.25,
            fitting_radius_scale: 1.2,
            fitting_length_scale: 1.0,
            insulation_radius_scale: 1.15,
            insulation_gap_radii: 0.25,
            insulation_min_length_radii: 4.0,
            tier_spacing: 0.1,
            supply_offset: 0.15,
            supply_radius_scale: 0.5,
            mesh_sides: 12,
        }
    }
}

impl RouterConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Distance below which two riser positions share a connector line
    #[inline]
    pub fn alignment_tolerance(&self) -> f64 {
        self.alignment_walls * self.wall_thickness
    }

    /// Check ranges and the containment of fittings and sleeves in the
    /// clearance volume every placement test uses
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("wall_thickness", self.wall_thickness),
            ("alignment_walls", self.alignment_walls),
            ("clearance_scale", self.clearance_scale),
            ("fitting_radius_scale", self.fitting_radius_scale),
            ("fitting_length_scale", self.fitting_length_scale),
            ("insulation_radius_scale", self.insulation_radius_scale),
            ("supply_radius_scale", self.supply_radius_scale),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("jitter_radii", self.jitter_radii),
            ("retreat_radii", self.retreat_radii),
            ("insulation_gap_radii", self.insulation_gap_radii),
            ("insulation_min_length_radii", self.insulation_min_length_radii),
            ("tier_spacing", self.tier_spacing),
            ("supply_offset", self.supply_offset),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!("{name} must be >= 0, got {value}")));
            }
        }
        for (name, value) in [
            ("merge_exponent", self.merge_exponent),
            ("spillover_exponent", self.spillover_exponent),
        ] {
            if !value.is_finite() || value <= 1.0 {
                return Err(Error::InvalidConfig(format!("{name} must be > 1, got {value}")));
            }
        }
        let largest_attachment = self
            .fitting_radius_scale
            .max(self.fitting_length_scale)
            .max(self.insulation_radius_scale);
        if self.clearance_scale < largest_attachment {
            return Err(Error::InvalidConfig(format!(
                "clearance_scale {} is smaller than fittings/insulation ({})",
                self.clearance_scale, largest_attachment
            )));
        }
        if self.mesh_sides < 3 {
            return Err(Error::InvalidConfig(format!(
                "mesh_sides must be >= 3, got {}",
                self.mesh_sides
            )));
        }
        Ok(())
    }
}
