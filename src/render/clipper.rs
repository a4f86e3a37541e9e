//! Near-plane clipping in camera space.
//!
//! Only the near plane is clipped. Geometry crossing the other frustum planes
//! is handled by clamping the screen-space bounding box during rasterization.
//!
//! The camera looks down -Z, so a vertex is *behind* the near plane when its
//! camera-space `z` is greater than the plane's `z` (it is closer to, or behind,
//! the eye).

use crate::vertex::Vertex;

/// Result of clipping one triangle against the near plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NearClip {
    /// Entirely in front of the plane; draw as is.
    Inside,
    /// Entirely behind the plane; draw nothing.
    Outside,
    /// One vertex survived: a single smaller triangle.
    One([Vertex; 3]),
    /// Two vertices survived: the remaining quad as two triangles.
    Two([Vertex; 3], [Vertex; 3]),
}

/// Point where the edge `a -> b` crosses the plane `z = plane_z`.
///
/// Falls back to the midpoint when the edge is nearly parallel to the plane.
#[inline]
fn intersect(plane_z: f32, a: &Vertex, b: &Vertex) -> Vertex {
    let dz = b.position.z - a.position.z;
    let k = if dz.abs() < 1e-6 {
        0.5
    } else {
        (plane_z - a.position.z) / dz
    };
    a.lerp(b, k)
}

/// Clip a camera-space triangle against the plane `z = plane_z`.
///
/// Sub-triangles keep the winding of the input so back-face culling still
/// works on them.
pub fn clip_near(plane_z: f32, v: [Vertex; 3]) -> NearClip {
    let behind = |v: &Vertex| v.position.z > plane_z;
    let count = v.iter().filter(|v| behind(v)).count();
    match count {
        0 => return NearClip::Inside,
        3 => return NearClip::Outside,
        _ => {}
    }

    // Rotate (keeping cyclic order) until v[0] is the vertex furthest behind.
    let mut v = v;
    while v[0].position.z < v[1].position.z || v[0].position.z < v[2].position.z {
        v.rotate_left(1);
    }

    if behind(&v[1]) {
        // v0, v1 behind; v2 in front.
        let v02 = intersect(plane_z, &v[0], &v[2]);
        let v12 = intersect(plane_z, &v[1], &v[2]);
        NearClip::One([v02, v12, v[2]])
    } else if behind(&v[2]) {
        // v0, v2 behind; v1 in front.
        let v01 = intersect(plane_z, &v[0], &v[1]);
        let v12 = intersect(plane_z, &v[1], &v[2]);
        NearClip::One([v01, v[1], v12])
    } else {
        // Only v0 behind.
        let v01 = intersect(plane_z, &v[0], &v[1]);
        let v02 = intersect(plane_z, &v[0], &v[2]);
        NearClip::Two([v01, v[1], v[2]], [v01, v[2], v02])
    }
}
