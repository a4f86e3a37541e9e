//! Lighting types for the renderer.

use crate::math::{Mat4, Vec3};

/// The single light of a scene.
///
/// Vectors point **towards** the light: a surface is lit when
/// `normal.dot(direction) > 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    /// A light infinitely far away. The direction is camera-relative, so the
    /// light follows the camera like a headlamp.
    Directional(Vec3),
    /// A light at a world-space position.
    Point(Vec3),
}

impl Default for Light {
    fn default() -> Self {
        Self::directional(Vec3::new(-0.15, 0.6, 1.0))
    }
}

impl Light {
    /// Create a directional light; the direction is normalized automatically.
    pub fn directional(towards_light: Vec3) -> Self {
        Self::Directional(towards_light.normalize())
    }

    pub fn point(position: Vec3) -> Self {
        Self::Point(position)
    }

    /// Resolve the light into camera space for one frame.
    pub fn to_camera(&self, view: &Mat4) -> CameraLight {
        match *self {
            Self::Directional(direction) => CameraLight::Directional(direction.normalize()),
            Self::Point(position) => CameraLight::Point(view.transform_point(position)),
        }
    }
}

/// A light expressed in camera space, computed once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraLight {
    Directional(Vec3),
    Point(Vec3),
}

impl CameraLight {
    /// Unit vector from a camera-space surface point towards the light.
    #[inline]
    pub fn direction_at(&self, position: Vec3) -> Vec3 {
        match *self {
            Self::Directional(direction) => direction,
            Self::Point(light) => (light - position).normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_is_normalized() {
        let light = Light::directional(Vec3::new(0.0, 0.0, 2.0)).to_camera(&Mat4::identity());
        let d = light.direction_at(Vec3::new(3.0, -1.0, -7.0));
        assert!((d.magnitude() - 1.0).abs() < 0.001);
        assert!((d.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_point_light_direction_depends_on_position() {
        let light = CameraLight::Point(Vec3::new(0.0, 1.0, 0.0));
        let normal = Vec3::new(0.0, 1.0, 1.0).normalize();
        // Light at 45 degrees from the normal: cos(45) ≈ 0.707
        let d = light.direction_at(Vec3::new(0.0, 0.0, 1.0));
        assert!((normal.dot(d) - 0.0).abs() < 0.001);
        let d = light.direction_at(Vec3::new(0.0, 0.0, 0.0));
        assert!((normal.dot(d) - 0.707).abs() < 0.01);
    }

    #[test]
    fn directional_light_ignores_view() {
        let light = Light::directional(Vec3::Y).to_camera(&Mat4::rotation_x(1.0));
        assert_eq!(light, CameraLight::Directional(Vec3::Y));
    }

    #[test]
    fn point_light_moves_with_view() {
        let view = Mat4::translation(0.0, 0.0, -10.0);
        let light = Light::point(Vec3::new(0.0, 0.0, 5.0)).to_camera(&view);
        assert_eq!(light, CameraLight::Point(Vec3::new(0.0, 0.0, -5.0)));
        // Surface below the light is lit straight on.
        let d = light.direction_at(Vec3::new(0.0, 0.0, -8.0));
        assert_eq!(d, Vec3::Z);
    }
}
