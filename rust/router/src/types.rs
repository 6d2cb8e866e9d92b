// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core data model: risers, categories, pipe segments and the basement layout.

use crate::error::{Error, Result};
use pipenet_geometry::{Aabb, Axis, Point3};
use serde::{Deserialize, Serialize};

/// Direction of flow through a riser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlowDirection {
    /// Supply entering the fixture
    In,
    /// Waste leaving the fixture
    Out,
    #[default]
    Undetermined,
}

/// Vertical pipe stub where a fixture above penetrates the basement ceiling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiserPoint {
    /// Ceiling penetration point; `z` is the top of the riser
    pub pos: Point3<f64>,
    pub radius: f64,
    /// Fixture also needs a hot supply
    #[serde(default)]
    pub has_secondary_flow: bool,
    #[serde(default)]
    pub flow: FlowDirection,
}

impl RiserPoint {
    pub fn new(pos: Point3<f64>, radius: f64) -> Self {
        Self {
            pos,
            radius,
            has_secondary_flow: false,
            flow: FlowDirection::Undetermined,
        }
    }

    /// Builder-style setter for the secondary-flow flag
    pub fn with_secondary_flow(mut self, secondary: bool) -> Self {
        self.has_secondary_flow = secondary;
        self
    }

    pub fn with_flow(mut self, flow: FlowDirection) -> Self {
        self.flow = flow;
        self
    }

    /// Reject NaN coordinates and non-positive radii
    pub fn validate(&self, index: usize) -> Result<()> {
        if self.pos.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidRiser {
                index,
                reason: "non-finite position".into(),
            });
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidRiser {
                index,
                reason: format!("radius {} is not positive", self.radius),
            });
        }
        Ok(())
    }
}

/// Pipe system a network belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipeCategory {
    Sewer,
    ColdWater,
    HotWater,
    Gas,
}

impl PipeCategory {
    /// Routing order of a basement pass
    pub const ALL: [PipeCategory; 4] = [
        PipeCategory::Sewer,
        PipeCategory::ColdWater,
        PipeCategory::HotWater,
        PipeCategory::Gas,
    ];

    /// Vertical plane index below the ceiling; drains hang highest
    #[inline]
    pub fn tier(self) -> u32 {
        match self {
            PipeCategory::Sewer => 0,
            PipeCategory::ColdWater => 1,
            PipeCategory::HotWater => 2,
            PipeCategory::Gas => 3,
        }
    }

    /// Recirculating systems need no building exit and get insulation
    #[inline]
    pub fn is_closed_loop(self) -> bool {
        matches!(self, PipeCategory::HotWater)
    }

    /// Whether a network of this category must leave the building
    #[inline]
    pub fn default_exit_required(self) -> bool {
        !self.is_closed_loop()
    }

    /// Display color (linear RGBA)
    pub fn color(self) -> [f32; 4] {
        match self {
            PipeCategory::Sewer => [0.45, 0.33, 0.22, 1.0],
            PipeCategory::ColdWater => [0.15, 0.45, 0.85, 1.0],
            PipeCategory::HotWater => [0.85, 0.2, 0.15, 1.0],
            PipeCategory::Gas => [0.95, 0.8, 0.1, 1.0],
        }
    }

    /// Typical pipe material
    pub fn material(self) -> &'static str {
        match self {
            PipeCategory::Sewer => "PVC",
            PipeCategory::ColdWater | PipeCategory::HotWater => "Copper",
            PipeCategory::Gas => "Black steel",
        }
    }
}

/// Which ends of a segment are closed with a flat cap
///
/// An open end is a joint with another run and receives a fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EndCaps {
    pub lo: bool,
    pub hi: bool,
}

impl EndCaps {
    pub const BOTH: EndCaps = EndCaps { lo: true, hi: true };
    pub const NONE: EndCaps = EndCaps { lo: false, hi: false };

    pub fn new(lo: bool, hi: bool) -> Self {
        Self { lo, hi }
    }

    #[inline]
    pub fn at(&self, hi: bool) -> bool {
        if hi {
            self.hi
        } else {
            self.lo
        }
    }

    #[inline]
    pub fn set(&mut self, hi: bool, capped: bool) {
        if hi {
            self.hi = capped;
        } else {
            self.lo = capped;
        }
    }

    fn swapped(self) -> Self {
        Self {
            lo: self.hi,
            hi: self.lo,
        }
    }
}

/// Role of a segment in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Vertical stub from the ceiling down to the pipe plane
    Riser,
    /// Perpendicular run joining a cluster's risers to the trunk
    Connector { cluster: usize },
    /// The trunk
    Main,
    /// Right-angle run toward a wall or floor exit
    BendConnector,
    /// Last run leaving the building, through a wall or the floor
    Exit { through_floor: bool },
    Fitting,
    Insulation,
}

/// Straight, axis-aligned pipe run
///
/// Endpoints are ordered so that `p1` has the lower coordinate along `axis`;
/// `caps.lo` belongs to `p1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeSegment {
    pub p1: Point3<f64>,
    pub p2: Point3<f64>,
    pub radius: f64,
    pub axis: Axis,
    pub kind: SegmentKind,
    pub caps: EndCaps,
    /// Lies wholly outside the basement footprint and is not rendered
    #[serde(default)]
    pub outside_footprint: bool,
}

impl PipeSegment {
    /// Create a segment, ordering the endpoints along `axis`
    ///
    /// `caps.lo` refers to `a` and `caps.hi` to `b` as passed in.
    pub fn new(
        a: Point3<f64>,
        b: Point3<f64>,
        radius: f64,
        axis: Axis,
        kind: SegmentKind,
        caps: EndCaps,
    ) -> Self {
        let (p1, p2, caps) = if a[axis.index()] <= b[axis.index()] {
            (a, b, caps)
        } else {
            (b, a, caps.swapped())
        };
        Self {
            p1,
            p2,
            radius,
            axis,
            kind,
            caps,
            outside_footprint: false,
        }
    }

    /// Segment along `axis` from `lo` to `hi`, other coordinates taken from `at`
    pub fn along(
        axis: Axis,
        lo: f64,
        hi: f64,
        at: Point3<f64>,
        radius: f64,
        kind: SegmentKind,
        caps: EndCaps,
    ) -> Self {
        let mut a = at;
        let mut b = at;
        a[axis.index()] = lo;
        b[axis.index()] = hi;
        Self::new(a, b, radius, axis, kind, caps)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.p2[self.axis.index()] - self.p1[self.axis.index()]
    }

    /// Endpoint, `hi = true` for the upper end along the axis
    #[inline]
    pub fn end(&self, hi: bool) -> Point3<f64> {
        if hi {
            self.p2
        } else {
            self.p1
        }
    }

    /// Coordinate of an end along the run axis
    #[inline]
    pub fn end_coord(&self, hi: bool) -> f64 {
        self.end(hi)[self.axis.index()]
    }

    /// Move one end along the run axis
    pub fn set_end_coord(&mut self, hi: bool, value: f64) {
        let i = self.axis.index();
        if hi {
            self.p2[i] = value;
        } else {
            self.p1[i] = value;
        }
    }

    /// Tight bounds of the pipe body
    pub fn bounds(&self) -> Aabb {
        let [t0, t1] = self.axis.transverse();
        Aabb::from_corners(self.p1, self.p2)
            .expanded_along(t0, self.radius)
            .expanded_along(t1, self.radius)
    }

    /// Bounds padded by `scale * radius` on every side
    ///
    /// This is the volume tested during placement; it covers the fittings
    /// and insulation later attached to the run.
    pub fn clearance_bounds(&self, scale: f64) -> Aabb {
        Aabb::from_corners(self.p1, self.p2).expanded(scale * self.radius)
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.axis != Axis::Z
    }
}

/// What sits on the basement floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloorObjectKind {
    ParkingSpace,
    /// Invisible collision volume placed with the following object
    Collider,
    /// Decorative trim placed with the following object
    Trim,
    Other,
}

impl FloorObjectKind {
    /// Helper objects are spawned right before the object they belong to
    #[inline]
    pub fn is_helper(self) -> bool {
        matches!(self, FloorObjectKind::Collider | FloorObjectKind::Trim)
    }
}

/// A placed floor-level object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorObject {
    pub bounds: Aabb,
    pub kind: FloorObjectKind,
}

/// Objects removed from a [`FloorObjectStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedObjects {
    /// Index the main object had before removal
    pub index: usize,
    /// Main object plus its helpers
    pub count: usize,
}

/// Shared, ordered store of floor objects placed by earlier generation stages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorObjectStore {
    objects: Vec<FloorObject>,
}

impl FloorObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, object: FloorObject) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[FloorObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove the first non-helper object whose footprint covers `point`,
    /// together with the contiguous helpers placed right before it
    pub fn remove_at(&mut self, point: &Point3<f64>) -> Option<RemovedObjects> {
        let index = self
            .objects
            .iter()
            .position(|o| !o.kind.is_helper() && o.bounds.contains_point_xy(point))?;
        let first = self.objects[..index]
            .iter()
            .rposition(|o| !o.kind.is_helper())
            .map_or(0, |i| i + 1);
        self.objects.drain(first..=index);
        Some(RemovedObjects {
            index,
            count: index + 1 - first,
        })
    }
}

impl From<Vec<FloorObject>> for FloorObjectStore {
    fn from(objects: Vec<FloorObject>) -> Self {
        Self { objects }
    }
}

/// Static description of the basement being piped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasementLayout {
    /// Usable room volume, floor to ceiling
    pub interior: Aabb,
    /// Whole building; risers must stay inside it
    pub building: Aabb,
    /// Underside of the ceiling slab
    pub ceiling_z: f64,
    /// Interior walls
    #[serde(default)]
    pub walls: Vec<Aabb>,
    /// Ceiling beams
    #[serde(default)]
    pub beams: Vec<Aabb>,
}

impl BasementLayout {
    /// Layout with no interior walls or beams; the building is the interior
    pub fn open(interior: Aabb) -> Self {
        Self {
            interior,
            building: interior,
            ceiling_z: interior.max.z,
            walls: Vec::new(),
            beams: Vec::new(),
        }
    }

    #[inline]
    pub fn floor_z(&self) -> f64 {
        self.interior.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_orders_endpoints_and_caps() {
        let seg = PipeSegment::new(
            Point3::new(5.0, 1.0, 2.0),
            Point3::new(1.0, 1.0, 2.0),
            0.1,
            Axis::X,
            SegmentKind::Main,
            EndCaps::new(true, false),
        );
        assert_eq!(seg.p1.x, 1.0);
        assert_eq!(seg.p2.x, 5.0);
        assert!(!seg.caps.lo);
        assert!(seg.caps.hi);
        assert!((seg.length() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_segment_bounds() {
        let seg = PipeSegment::along(
            Axis::Y,
            0.0,
            2.0,
            Point3::new(1.0, 0.0, 2.5),
            0.1,
            SegmentKind::Main,
            EndCaps::BOTH,
        );
        let b = seg.bounds();
        assert!((b.len(Axis::Y) - 2.0).abs() < 1e-12);
        assert!((b.len(Axis::X) - 0.2).abs() < 1e-12);
        let padded = seg.clearance_bounds(1.25);
        assert!((padded.len(Axis::Y) - 2.25).abs() < 1e-12);
    }

    #[test]
    fn test_category_properties() {
        assert!(PipeCategory::Sewer.default_exit_required());
        assert!(PipeCategory::Gas.default_exit_required());
        assert!(!PipeCategory::HotWater.default_exit_required());
        let tiers: Vec<u32> = PipeCategory::ALL.iter().map(|c| c.tier()).collect();
        assert_eq!(tiers, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_riser_validation() {
        let ok = RiserPoint::new(Point3::new(1.0, 1.0, 3.0), 0.05);
        assert!(ok.validate(0).is_ok());
        let bad = RiserPoint::new(Point3::new(f64::NAN, 1.0, 3.0), 0.05);
        assert!(matches!(bad.validate(3), Err(Error::InvalidRiser { index: 3, .. })));
        let flat = RiserPoint::new(Point3::new(1.0, 1.0, 3.0), 0.0);
        assert!(flat.validate(0).is_err());
    }

    #[test]
    fn test_store_removes_object_with_helpers() {
        let cell = |x: f64, kind| FloorObject {
            bounds: Aabb::from_corners(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 0.5)),
            kind,
        };
        let mut store = FloorObjectStore::from(vec![
            cell(0.0, FloorObjectKind::ParkingSpace),
            cell(2.0, FloorObjectKind::Collider),
            cell(2.0, FloorObjectKind::Trim),
            cell(2.0, FloorObjectKind::ParkingSpace),
            cell(4.0, FloorObjectKind::ParkingSpace),
        ]);
        let removed = store.remove_at(&Point3::new(2.5, 0.5, 0.0)).unwrap();
        assert_eq!(removed, RemovedObjects { index: 3, count: 3 });
        assert_eq!(store.len(), 2);
        assert!(store.remove_at(&Point3::new(9.0, 9.0, 0.0)).is_none());
    }
}
