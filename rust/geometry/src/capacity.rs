// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipe capacity merging
//!
//! Two pipes feeding a shared run are sized with a generalized (power) mean:
//! `(r1^e + r2^e)^(1/e)`. With `e = 2` the cross-sectional areas add up;
//! higher exponents bias the result toward the larger input so that long
//! trunks collecting many small risers stay a plausible size.

use crate::error::{Error, Result};

/// Merge two pipe radii with the given exponent
///
/// `merged_radius(r, 0.0, e) == r` and the result is symmetric in its radii
/// and never smaller than the larger of the two for `e > 1`.
#[inline]
pub fn merged_radius(r1: f64, r2: f64, exponent: f64) -> f64 {
    if r1 <= 0.0 {
        return r2.max(0.0);
    }
    if r2 <= 0.0 {
        return r1;
    }
    (r1.powf(exponent) + r2.powf(exponent)).powf(1.0 / exponent)
}

/// Checked variant of [`merged_radius`] for values coming from outside the router
pub fn try_merged_radius(r1: f64, r2: f64, exponent: f64) -> Result<f64> {
    if !exponent.is_finite() || exponent <= 1.0 {
        return Err(Error::InvalidExponent(exponent));
    }
    for r in [r1, r2] {
        if !r.is_finite() || r < 0.0 {
            return Err(Error::InvalidRadius(r));
        }
    }
    Ok(merged_radius(r1, r2, exponent))
}

/// Fold any number of radii into one
pub fn merge_all<I>(radii: I, exponent: f64) -> f64
where
    I: IntoIterator<Item = f64>,
{
    radii
        .into_iter()
        .fold(0.0, |acc, r| merged_radius(acc, r, exponent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_with_zero() {
        for e in [1.5, 2.0, 3.0, 4.0] {
            assert_eq!(merged_radius(0.05, 0.0, e), 0.05);
            assert_eq!(merged_radius(0.0, 0.05, e), 0.05);
        }
    }

    #[test]
    fn test_area_preserving_exponent() {
        // e = 2: two equal pipes merge into sqrt(2) times the radius
        assert_relative_eq!(merged_radius(1.0, 1.0, 2.0), 2.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_higher_exponent_biases_toward_larger() {
        let cubic = merged_radius(0.04, 0.02, 3.0);
        let quartic = merged_radius(0.04, 0.02, 4.0);
        assert!(quartic < cubic);
        assert!(quartic > 0.04);
    }

    #[test]
    fn test_merge_all_matches_pairwise() {
        let radii = [0.02, 0.03, 0.025];
        let pairwise = merged_radius(merged_radius(0.02, 0.03, 3.0), 0.025, 3.0);
        assert_relative_eq!(merge_all(radii, 3.0), pairwise, epsilon = 1e-12);
        assert_eq!(merge_all(std::iter::empty(), 3.0), 0.0);
    }

    #[test]
    fn test_try_merged_radius_validation() {
        assert!(try_merged_radius(0.1, 0.1, 1.0).is_err());
        assert!(try_merged_radius(-0.1, 0.1, 3.0).is_err());
        assert!(try_merged_radius(f64::NAN, 0.1, 3.0).is_err());
        assert!(try_merged_radius(0.1, 0.1, 3.0).is_ok());
    }
}
