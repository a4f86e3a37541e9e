//! Orbit camera for turntable views of Z-up models.
//!
//! # Orientation
//!
//! The camera circles the origin at a fixed distance:
//!
//! - **Yaw**: rotation of the model around its vertical Z axis
//! - **Tilt**: elevation above the horizon (0 looks at the model side on,
//!   positive values look down onto it)
//!
//! The view matrix is `translate(0, 0, -distance) * rotX(tilt - PI/2) * rotZ(yaw)`:
//! `rotX(-PI/2)` stands the Z-up model upright in front of a camera that
//! looks down -Z.

use std::f32::consts::FRAC_PI_2;

use crate::math::{Mat4, Vec3};
use crate::projection;
use crate::scene::{BBox, Scene};

/// Margin applied when framing a bounding box.
const FIT_MARGIN: f32 = 1.55;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub distance: f32,
    /// Radians.
    pub yaw: f32,
    /// Radians.
    pub tilt: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            distance: 140.0,
            yaw: 0.0,
            tilt: 20f32.to_radians(),
            fov: 35f32.to_radians(),
        }
    }
}

impl OrbitCamera {
    pub fn view(&self) -> Mat4 {
        Mat4::translation(0.0, 0.0, -self.distance)
            * Mat4::rotation_x(self.tilt - FRAC_PI_2)
            * Mat4::rotation_z(self.yaw)
    }

    /// Perspective projection matching the camera's field of view.
    pub fn projection(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        projection::frustum(self.fov, aspect, near, far)
    }

    /// Distance at which a box of the given size fits the view, with margin.
    pub fn fit_distance(&self, size: Vec3, aspect: f32) -> f32 {
        let dh = size.x.max(size.y) / (2.0 * (self.fov * aspect / 2.0).tan());
        let dv = size.z / (2.0 * (self.fov / 2.0).tan());
        FIT_MARGIN * dh.max(dv)
    }

    /// Move the camera back far enough to frame `bbox`.
    ///
    /// Returns the box center, which the caller should move to the origin.
    pub fn fit(&mut self, bbox: &BBox, aspect: f32) -> Vec3 {
        if bbox.is_empty() {
            return Vec3::ZERO;
        }
        self.distance = self.fit_distance(bbox.size(), aspect);
        bbox.center()
    }

    /// Frame the whole scene and re-center its root on the origin.
    pub fn fit_scene(&mut self, scene: &mut Scene, aspect: f32) {
        let center = self.fit(&scene.bbox(), aspect);
        scene.root.transform = Mat4::translation_vec(-center) * scene.root.transform;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use crate::scene::SceneNode;
    use approx::assert_relative_eq;

    #[test]
    fn zero_tilt_looks_at_model_side_on() {
        let camera = OrbitCamera {
            distance: 10.0,
            tilt: 0.0,
            ..OrbitCamera::default()
        };
        // The model's up axis becomes the screen's up axis.
        let up = camera.view().transform_vector(Vec3::Z);
        assert_relative_eq!(up.y, 1.0, epsilon = 1e-6);
        // The origin sits straight ahead.
        let origin = camera.view().transform_point(Vec3::ZERO);
        assert_relative_eq!(origin.z, -10.0, epsilon = 1e-6);
    }

    #[test]
    fn right_angle_tilt_looks_down() {
        let camera = OrbitCamera {
            tilt: FRAC_PI_2,
            ..OrbitCamera::default()
        };
        let up = camera.view().transform_vector(Vec3::Z);
        assert_relative_eq!(up.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn fit_uses_largest_extent() {
        let camera = OrbitCamera {
            fov: FRAC_PI_2,
            ..OrbitCamera::default()
        };
        // Tall box: vertical extent dominates, tan(45) == 1.
        let d = camera.fit_distance(Vec3::new(1.0, 1.0, 10.0), 1.0);
        assert_relative_eq!(d, FIT_MARGIN * 5.0, epsilon = 1e-4);
    }

    #[test]
    fn fit_scene_recenters_root() {
        let mut scene = Scene::new();
        scene.add(
            SceneNode::mesh(primitives::cube(2.0).unwrap())
                .with_transform(Mat4::translation(5.0, 0.0, 3.0)),
        );
        let mut camera = OrbitCamera::default();
        camera.fit_scene(&mut scene, 4.0 / 3.0);
        let bbox = scene.bbox();
        assert_relative_eq!(bbox.center().x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(bbox.center().z, 0.0, epsilon = 1e-5);
        assert!(camera.distance > 2.0);
    }

    #[test]
    fn empty_scene_keeps_distance() {
        let mut camera = OrbitCamera::default();
        assert_eq!(camera.fit(&BBox::empty(), 1.0), Vec3::ZERO);
        assert_eq!(camera.distance, OrbitCamera::default().distance);
    }
}
