// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned boxes
//!
//! Every obstacle, wall, beam and pipe run handled by the router is an
//! axis-aligned box in f64 precision. Intersection is strict (the boxes must
//! share a positive volume), so a pipe resting flush against a wall does not
//! count as colliding with it.

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One of the three world axes. Z is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// The two horizontal axes, in order
    pub const HORIZONTAL: [Axis; 2] = [Axis::X, Axis::Y];

    /// Component index into a point or vector
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The horizontal axis perpendicular to this one (Z maps to X)
    #[inline]
    pub fn other_horizontal(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y | Axis::Z => Axis::X,
        }
    }

    /// The two axes perpendicular to this one
    #[inline]
    pub fn transverse(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }

    /// Unit vector along the axis
    #[inline]
    pub fn unit(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a box from two corners in any order
    pub fn from_corners(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Create a box from explicit bounds, rejecting NaN and inverted input
    pub fn try_new(min: Point3<f64>, max: Point3<f64>) -> Result<Self> {
        let bounds = Self { min, max };
        if min.iter().chain(max.iter()).any(|v| !v.is_finite()) {
            return Err(Error::DegenerateBounds(format!("non-finite bounds {:?}", bounds)));
        }
        if !bounds.is_normalized() {
            return Err(Error::DegenerateBounds(format!("inverted bounds {:?}", bounds)));
        }
        Ok(bounds)
    }

    /// Zero-volume box at a point
    #[inline]
    pub fn from_point(p: Point3<f64>) -> Self {
        Self { min: p, max: p }
    }

    /// Inverted box that any `expand_to_point` / `union_with` overwrites
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Check min <= max on every axis
    #[inline]
    pub fn is_normalized(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    #[inline]
    pub fn lo(&self, axis: Axis) -> f64 {
        self.min[axis.index()]
    }

    #[inline]
    pub fn hi(&self, axis: Axis) -> f64 {
        self.max[axis.index()]
    }

    #[inline]
    pub fn set_lo(&mut self, axis: Axis, value: f64) {
        self.min[axis.index()] = value;
    }

    #[inline]
    pub fn set_hi(&mut self, axis: Axis, value: f64) {
        self.max[axis.index()] = value;
    }

    /// Extent along an axis
    #[inline]
    pub fn len(&self, axis: Axis) -> f64 {
        self.hi(axis) - self.lo(axis)
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        if !self.is_normalized() {
            return 0.0;
        }
        self.len(Axis::X) * self.len(Axis::Y) * self.len(Axis::Z)
    }

    /// Grow the box to include a point
    #[inline]
    pub fn expand_to_point(&mut self, p: Point3<f64>) {
        self.min = self.min.inf(&p);
        self.max = self.max.sup(&p);
    }

    /// Grow the box to include another box
    #[inline]
    pub fn union_with(&mut self, other: &Aabb) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Copy expanded by `amount` on every side
    #[inline]
    pub fn expanded(&self, amount: f64) -> Self {
        let d = Vector3::repeat(amount);
        Self {
            min: self.min - d,
            max: self.max + d,
        }
    }

    /// Copy expanded by `amount` on both sides of one axis
    #[inline]
    pub fn expanded_along(&self, axis: Axis, amount: f64) -> Self {
        let mut out = *self;
        out.min[axis.index()] -= amount;
        out.max[axis.index()] += amount;
        out
    }

    /// Strict overlap test: touching faces do not intersect
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Strict overlap test ignoring Z
    #[inline]
    pub fn intersects_xy(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// True if any box in `boxes` overlaps this one
    pub fn intersects_any<'a, I>(&self, boxes: I) -> bool
    where
        I: IntoIterator<Item = &'a Aabb>,
    {
        boxes.into_iter().any(|b| self.intersects(b))
    }

    /// Inclusive point containment
    #[inline]
    pub fn contains_point(&self, p: &Point3<f64>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    /// Inclusive point containment ignoring Z
    #[inline]
    pub fn contains_point_xy(&self, p: &Point3<f64>) -> bool {
        (0..2).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    /// Inclusive box containment
    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        (0..3).all(|i| other.min[i] >= self.min[i] && other.max[i] <= self.max[i])
    }

    /// Overlap region, if the boxes intersect strictly
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        if !self.intersects(other) {
            return None;
        }
        Some(Aabb {
            min: self.min.sup(&other.min),
            max: self.max.inf(&other.max),
        })
    }

    /// Box difference `self - other` as up to six disjoint pieces
    ///
    /// The pieces are produced slab by slab (X, then Y, then Z), so when
    /// `other` spans the full cross-section of `self` only the pieces along
    /// the remaining axis survive.
    pub fn subtract(&self, other: &Aabb) -> SmallVec<[Aabb; 6]> {
        let mut pieces = SmallVec::new();
        let clip = match self.intersection(other) {
            Some(clip) => clip,
            None => {
                pieces.push(*self);
                return pieces;
            }
        };

        let mut rest = *self;
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            if clip.lo(axis) > rest.lo(axis) {
                let mut below = rest;
                below.set_hi(axis, clip.lo(axis));
                pieces.push(below);
            }
            if clip.hi(axis) < rest.hi(axis) {
                let mut above = rest;
                above.set_lo(axis, clip.hi(axis));
                pieces.push(above);
            }
            rest.set_lo(axis, clip.lo(axis));
            rest.set_hi(axis, clip.hi(axis));
        }
        pieces
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::from_point(Point3::origin())
    }
}
