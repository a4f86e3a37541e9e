use crate::math::{Vec2, Vec3};

/// A triangle corner with all attributes the rasterizer interpolates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub const fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// Vertex at `position` facing +Z with zero texture coordinates.
    pub const fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::Z, Vec2::ZERO)
    }

    /// Linearly interpolate every attribute: `t = 0` gives `self`, `t = 1` gives `other`.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            normal: self.normal.lerp(other.normal, t),
            uv: self.uv.lerp(other.uv, t),
        }
    }
}
