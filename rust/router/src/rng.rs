// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic random source for jitter and tie-breaking.

use crate::types::PipeCategory;
use pipenet_geometry::Axis;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator injected into every routing invocation
///
/// Identical seeds and inputs give identical output.
#[derive(Debug, Clone)]
pub struct RouteRng {
    rng: StdRng,
}

impl RouteRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator for one category of one room on one floor
    pub fn for_invocation(floor_index: u32, room_id: u32, category: PipeCategory) -> Self {
        let mut h = 0x9E37_79B9_7F4A_7C15u64;
        for part in [floor_index as u64, room_id as u64, category.tier() as u64] {
            h = mix64(h ^ part);
        }
        Self::seeded(h)
    }

    /// Uniform value in `[-1, 1)`
    pub fn signed_unit(&mut self) -> f64 {
        self.rng.gen_range(-1.0..1.0)
    }

    pub fn horizontal_axis(&mut self) -> Axis {
        if self.rng.gen_bool(0.5) {
            Axis::X
        } else {
            Axis::Y
        }
    }
}

// splitmix64 finalizer
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RouteRng::for_invocation(1, 7, PipeCategory::Gas);
        let mut b = RouteRng::for_invocation(1, 7, PipeCategory::Gas);
        for _ in 0..16 {
            assert_eq!(a.signed_unit(), b.signed_unit());
            assert_eq!(a.horizontal_axis(), b.horizontal_axis());
        }
    }

    #[test]
    fn test_categories_get_distinct_streams() {
        let mut a = RouteRng::for_invocation(0, 0, PipeCategory::Sewer);
        let mut b = RouteRng::for_invocation(0, 0, PipeCategory::ColdWater);
        let xs: Vec<f64> = (0..4).map(|_| a.signed_unit()).collect();
        let ys: Vec<f64> = (0..4).map(|_| b.signed_unit()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_signed_unit_range() {
        let mut rng = RouteRng::seeded(42);
        for _ in 0..1000 {
            let v = rng.signed_unit();
            assert!((-1.0..1.0).contains(&v));
        }
    }
}
