// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures and pipe tessellation

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use std::f64::consts::TAU;

/// Triangle mesh in flat GPU-ready buffers
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Concatenate meshes into one, rebasing indices
    pub fn concat(meshes: &[Mesh]) -> Self {
        let vertices: usize = meshes.iter().map(Mesh::vertex_count).sum();
        let indices: usize = meshes.iter().map(|m| m.indices.len()).sum();
        let mut out = Self::with_capacity(vertices, indices);
        for mesh in meshes {
            let base = out.vertex_count() as u32;
            out.positions.extend_from_slice(&mesh.positions);
            out.normals.extend_from_slice(&mesh.normals);
            out.indices.extend(mesh.indices.iter().map(|&i| i + base));
        }
        out
    }

    #[inline]
    fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions
            .extend([position.x as f32, position.y as f32, position.z as f32]);
        self.normals
            .extend([normal.x as f32, normal.y as f32, normal.z as f32]);
    }

    #[inline]
    fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend([i0, i1, i2]);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Tessellate a straight pipe between two points
///
/// # Arguments
/// * `p1`, `p2` - Centerline endpoints
/// * `radius` - Outer radius
/// * `sides` - Number of facets around the circumference (at least 3)
/// * `cap_start`, `cap_end` - Close the tube with a flat disc at that end
pub fn pipe_cylinder(
    p1: Point3<f64>,
    p2: Point3<f64>,
    radius: f64,
    sides: u32,
    cap_start: bool,
    cap_end: bool,
) -> Result<Mesh> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::InvalidRadius(radius));
    }
    let axis = p2 - p1;
    let length = axis.norm();
    if length < 1e-9 {
        return Err(Error::EmptyMesh(format!(
            "zero-length pipe at ({:.3}, {:.3}, {:.3})",
            p1.x, p1.y, p1.z
        )));
    }
    let sides = sides.max(3);
    let dir = axis / length;

    // Any vector not parallel to the axis seeds the circumferential basis
    let seed = if dir.z.abs() < 0.9 { Vector3::z() } else { Vector3::x() };
    let u = dir.cross(&seed).normalize();
    let v = dir.cross(&u);

    let caps = cap_start as usize + cap_end as usize;
    let mut mesh = Mesh::with_capacity(
        2 * sides as usize + caps * (sides as usize + 1),
        6 * sides as usize + caps * 3 * sides as usize,
    );

    // Side wall: ring of vertex pairs sharing the outward normal
    for i in 0..sides {
        let angle = TAU * i as f64 / sides as f64;
        let normal = u * angle.cos() + v * angle.sin();
        mesh.add_vertex(p1 + normal * radius, normal);
        mesh.add_vertex(p2 + normal * radius, normal);
    }
    for i in 0..sides {
        let a = 2 * i;
        let b = 2 * ((i + 1) % sides);
        mesh.add_triangle(a, b, a + 1);
        mesh.add_triangle(a + 1, b, b + 1);
    }

    for (center, normal, enabled) in [(p1, -dir, cap_start), (p2, dir, cap_end)] {
        if !enabled {
            continue;
        }
        let hub = mesh.vertex_count() as u32;
        mesh.add_vertex(center, normal);
        for i in 0..sides {
            let angle = TAU * i as f64 / sides as f64;
            let offset = u * angle.cos() + v * angle.sin();
            mesh.add_vertex(center + offset * radius, normal);
        }
        for i in 0..sides {
            let a = hub + 1 + i;
            let b = hub + 1 + (i + 1) % sides;
            if normal.dot(&dir) > 0.0 {
                mesh.add_triangle(hub, a, b);
            } else {
                mesh.add_triangle(hub, b, a);
            }
        }
    }

    Ok(mesh)
}
