// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Nearest wall search
//!
//! Finds the closest spot where a pipe of a given radius sits flush against
//! either a side of the containing room bounds or one of the interior walls,
//! reachable by a straight horizontal move that does not pass through any
//! obstacle. Used to place floor-penetrating exit pipes along a wall.

use crate::aabb::{Aabb, Axis};
use nalgebra::Point3;
use smallvec::SmallVec;

/// Slack subtracted from the padding so that a flush placement does not
/// register as an overlap because of rounding.
const FLUSH_EPSILON: f64 = 1e-7;

/// A valid flush placement found by [`nearest_wall_hit`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit {
    /// Shifted point, flush with the wall
    pub position: Point3<f64>,
    /// Horizontal travel distance from the query point
    pub distance: f64,
    /// Axis the point was moved along
    pub axis: Axis,
}

/// Find the nearest reachable flush wall position
///
/// # Arguments
/// * `point` - Query point (pipe centerline)
/// * `radius` - Pipe radius including any clearance
/// * `bounds` - Containing room bounds; each of its four sides is a candidate wall
/// * `walls` - Interior walls
/// * `obstacles` - Boxes the move (and the optional drop) must not cross
/// * `vertical` - Also require a clear vertical drop from the candidate to `floor_z`
/// * `floor_z` - Floor height for the vertical drop test
///
/// # Returns
/// The closest valid candidate, or `None` when nothing qualifies
pub fn nearest_wall_hit(
    point: Point3<f64>,
    radius: f64,
    bounds: &Aabb,
    walls: &[Aabb],
    obstacles: &[Aabb],
    vertical: bool,
    floor_z: f64,
) -> Option<WallHit> {
    let mut candidates: SmallVec<[(Axis, f64); 16]> = SmallVec::new();

    for axis in Axis::HORIZONTAL {
        candidates.push((axis, bounds.lo(axis) + radius));
        candidates.push((axis, bounds.hi(axis) - radius));
    }

    for wall in walls {
        for axis in Axis::HORIZONTAL {
            let other = axis.other_horizontal();
            let c = point[other.index()];
            // the wall must be in the path of a move along `axis`
            if c - radius < wall.lo(other) || c + radius > wall.hi(other) {
                continue;
            }
            let v = point[axis.index()];
            if v < wall.lo(axis) {
                candidates.push((axis, wall.lo(axis) - radius));
            } else if v > wall.hi(axis) {
                candidates.push((axis, wall.hi(axis) + radius));
            }
        }
    }

    let pad = (radius - FLUSH_EPSILON).max(0.0);
    let mut best: Option<WallHit> = None;

    for (axis, value) in candidates {
        if value < bounds.lo(axis) + radius - FLUSH_EPSILON
            || value > bounds.hi(axis) - radius + FLUSH_EPSILON
        {
            continue;
        }
        let mut candidate = point;
        candidate[axis.index()] = value;
        let distance = (value - point[axis.index()]).abs();

        if best.map_or(false, |b| distance >= b.distance) {
            continue;
        }

        let path = Aabb::from_corners(point, candidate).expanded(pad);
        if path.intersects_any(obstacles) || path.intersects_any(walls) {
            continue;
        }

        if vertical {
            let mut drop = Aabb::from_corners(
                Point3::new(candidate.x, candidate.y, floor_z),
                candidate,
            )
            .expanded(pad);
            drop.set_lo(Axis::Z, floor_z);
            if drop.intersects_any(obstacles) || drop.intersects_any(walls) {
                continue;
            }
        }

        best = Some(WallHit {
            position: candidate,
            distance,
            axis,
        });
    }

    best
}

/// Nearest flush wall position, or `point` unchanged when none is reachable
///
/// Callers cannot tell a failed search from a point that is already flush
/// against a wall; use [`nearest_wall_hit`] when the difference matters.
pub fn nearest_wall_position(
    point: Point3<f64>,
    radius: f64,
    bounds: &Aabb,
    walls: &[Aabb],
    obstacles: &[Aabb],
    vertical: bool,
    floor_z: f64,
) -> Point3<f64> {
    nearest_wall_hit(point, radius, bounds, walls, obstacles, vertical, floor_z)
        .map(|hit| hit.position)
        .unwrap_or(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn room() -> Aabb {
        Aabb::from_corners(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 3.0))
    }

    #[test]
    fn test_picks_nearest_bound() {
        let p = Point3::new(1.0, 5.0, 2.5);
        let hit = nearest_wall_hit(p, 0.1, &room(), &[], &[], false, 0.0).unwrap();
        assert_eq!(hit.axis, Axis::X);
        assert_relative_eq!(hit.position.x, 0.1);
        assert_relative_eq!(hit.position.y, 5.0);
        assert_relative_eq!(hit.distance, 0.9);
    }

    #[test]
    fn test_interior_wall_is_closer() {
        let wall = Aabb::from_corners(Point3::new(2.0, 0.0, 0.0), Point3::new(2.2, 10.0, 3.0));
        let p = Point3::new(2.6, 5.0, 2.5);
        let hit = nearest_wall_hit(p, 0.1, &room(), &[wall], &[], false, 0.0).unwrap();
        assert_relative_eq!(hit.position.x, 2.3, epsilon = 1e-12);
    }

    #[test]
    fn test_blocked_path_is_rejected() {
        let p = Point3::new(1.0, 5.0, 2.5);
        let blocker = Aabb::from_corners(Point3::new(0.3, 4.0, 2.0), Point3::new(0.6, 6.0, 3.0));
        let hit = nearest_wall_hit(p, 0.1, &room(), &[], &[blocker], false, 0.0).unwrap();
        // the -X side is blocked, next best is -Y or +Y at distance 4.9
        assert_ne!(hit.axis, Axis::X);
        assert_relative_eq!(hit.distance, 4.9, epsilon = 1e-12);
    }

    #[test]
    fn test_vertical_drop_is_checked() {
        let p = Point3::new(1.0, 5.0, 2.5);
        // stair under the -X flush spot, clear of the horizontal path
        let stair = Aabb::from_corners(Point3::new(0.0, 4.5, 0.0), Point3::new(0.5, 5.5, 1.0));
        let flat = nearest_wall_hit(p, 0.1, &room(), &[], &[stair], false, 0.0).unwrap();
        assert_eq!(flat.axis, Axis::X);
        let dropped = nearest_wall_hit(p, 0.1, &room(), &[], &[stair], true, 0.0).unwrap();
        assert_ne!(dropped.axis, Axis::X);
    }

    #[test]
    fn test_no_candidate_returns_input() {
        let p = Point3::new(5.0, 5.0, 2.5);
        let cage = Aabb::from_corners(Point3::new(4.0, 4.0, 0.0), Point3::new(6.0, 6.0, 3.0));
        let shell = cage.subtract(&cage.expanded_along(Axis::X, -0.5).expanded_along(Axis::Y, -0.5));
        assert!(nearest_wall_hit(p, 0.1, &room(), &[], &shell, false, 0.0).is_none());
        assert_eq!(nearest_wall_position(p, 0.1, &room(), &[], &shell, false, 0.0), p);
    }
}
