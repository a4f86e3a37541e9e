//! Procedural meshes: cube, cylinder and sphere.
//!
//! All meshes are centered on the origin, use the Z axis as "up", and wind
//! counter-clockwise when seen from outside. Each carries one normal and one
//! texture coordinate per vertex and a default [`Material`].

use std::f32::consts::{PI, TAU};
use std::rc::Rc;

use crate::error::MeshError;
use crate::math::{Vec2, Vec3};
use crate::scene::{Material, TriMesh};

/// Collects per-vertex attributes while a primitive is generated.
#[derive(Default)]
struct MeshBuilder {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<usize>,
}

impl MeshBuilder {
    fn vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> usize {
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        self.positions.len() - 1
    }

    fn triangle(&mut self, a: usize, b: usize, c: usize) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    fn quad(&mut self, a: usize, b: usize, c: usize, d: usize) {
        self.triangle(a, b, c);
        self.triangle(a, c, d);
    }

    fn build(self) -> Result<TriMesh, MeshError> {
        Ok(TriMesh::new(self.positions, self.indices)?
            .with_normals(self.normals, Vec::new())?
            .with_texcoords(self.uvs, Vec::new())?
            .with_material(Rc::new(Material::default())))
    }
}

/// Axis-aligned cube with edge length `size`: 24 vertices, 12 triangles.
pub fn cube(size: f32) -> Result<TriMesh, MeshError> {
    let h = size / 2.0;
    // (normal, u axis, v axis) with u x v == normal.
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (-Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (-Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (-Vec3::Z, Vec3::Y, Vec3::X),
    ];

    let mut b = MeshBuilder::default();
    for (n, u, v) in faces {
        let corner = |su: f32, sv: f32| (n + u * su + v * sv) * h;
        let i0 = b.vertex(corner(-1.0, -1.0), n, Vec2::new(0.0, 0.0));
        let i1 = b.vertex(corner(1.0, -1.0), n, Vec2::new(1.0, 0.0));
        let i2 = b.vertex(corner(1.0, 1.0), n, Vec2::new(1.0, 1.0));
        let i3 = b.vertex(corner(-1.0, 1.0), n, Vec2::new(0.0, 1.0));
        b.quad(i0, i1, i2, i3);
    }
    b.build()
}

/// Cylinder around the Z axis, `height` tall.
///
/// `segments` is clamped to at least 3 and `height_segments` to at least 1.
/// With `caps` the two ends are closed by triangle fans.
pub fn cylinder(
    radius: f32,
    height: f32,
    segments: usize,
    height_segments: usize,
    caps: bool,
) -> Result<TriMesh, MeshError> {
    let segments = segments.max(3);
    let height_segments = height_segments.max(1);
    let half = height / 2.0;
    let mut b = MeshBuilder::default();

    let ring = |i: usize| {
        let theta = TAU * i as f32 / segments as f32;
        Vec3::new(theta.cos(), theta.sin(), 0.0)
    };

    // Side: a (segments + 1) x (height_segments + 1) grid, seam duplicated for UVs.
    let columns = segments + 1;
    for j in 0..=height_segments {
        let t = j as f32 / height_segments as f32;
        let z = -half + height * t;
        for i in 0..=segments {
            let n = ring(i);
            b.vertex(
                n * radius + Vec3::new(0.0, 0.0, z),
                n,
                Vec2::new(i as f32 / segments as f32, t),
            );
        }
    }
    for j in 0..height_segments {
        for i in 0..segments {
            let a = j * columns + i;
            let c = (j + 1) * columns + i;
            b.quad(a, a + 1, c + 1, c);
        }
    }

    if caps {
        for (z, normal) in [(half, Vec3::Z), (-half, -Vec3::Z)] {
            let center = b.vertex(Vec3::new(0.0, 0.0, z), normal, Vec2::new(0.5, 0.5));
            let first = b.positions.len();
            for i in 0..=segments {
                let n = ring(i);
                b.vertex(
                    n * radius + Vec3::new(0.0, 0.0, z),
                    normal,
                    Vec2::new(0.5 + 0.5 * n.x, 0.5 + 0.5 * n.y),
                );
            }
            for i in 0..segments {
                let (p, q) = (first + i, first + i + 1);
                if normal.z > 0.0 {
                    b.triangle(center, p, q);
                } else {
                    b.triangle(center, q, p);
                }
            }
        }
    }
    b.build()
}

/// UV sphere with poles on the Z axis.
///
/// `lat_segments` is clamped to at least 2 and `long_segments` to at least 3.
pub fn sphere(radius: f32, lat_segments: usize, long_segments: usize) -> Result<TriMesh, MeshError> {
    let lat = lat_segments.max(2);
    let long = long_segments.max(3);
    let mut b = MeshBuilder::default();

    for j in 0..=lat {
        let phi = PI * j as f32 / lat as f32;
        for i in 0..=long {
            let theta = TAU * i as f32 / long as f32;
            let n = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
            b.vertex(
                n * radius,
                n,
                Vec2::new(i as f32 / long as f32, j as f32 / lat as f32),
            );
        }
    }

    let columns = long + 1;
    for j in 0..lat {
        for i in 0..long {
            let a = j * columns + i;
            let d = a + 1;
            let bl = a + columns;
            let c = bl + 1;
            // The first and last rows touch a pole; skip their degenerate halves.
            if j + 1 < lat {
                b.triangle(a, bl, c);
            }
            if j > 0 {
                b.triangle(a, c, d);
            }
        }
    }
    b.build()
}
