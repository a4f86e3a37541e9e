//! Projection matrix builders.
//!
//! All builders follow the same convention: the camera looks down **-Z**, and
//! after the homogeneous divide the visible volume is `[-1, 1]` on every axis
//! (near plane at `z = -1`, far plane at `z = +1`).
//!
//! The bottom-right element tells the two kinds apart: it is `0` for
//! perspective matrices and `1` for orthographic ones. The rasterizer inspects
//! it through [`ProjectionInfo`] to choose between perspective-correct and
//! linear depth interpolation.

use crate::math::Mat4;

/// Orthographic projection from six clip planes.
pub fn ortho(l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) -> Mat4 {
    Mat4::new([
        [2.0 / (r - l), 0.0, 0.0, -(r + l) / (r - l)],
        [0.0, 2.0 / (t - b), 0.0, -(t + b) / (t - b)],
        [0.0, 0.0, -2.0 / (f - n), -(f + n) / (f - n)],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Perspective projection from six clip planes (the near-plane window `l..r`, `b..t`).
pub fn perspective(l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) -> Mat4 {
    Mat4::new([
        [2.0 * n / (r - l), 0.0, (r + l) / (r - l), 0.0],
        [0.0, 2.0 * n / (t - b), (t + b) / (t - b), 0.0],
        [0.0, 0.0, -(f + n) / (f - n), -2.0 * f * n / (f - n)],
        [0.0, 0.0, -1.0, 0.0],
    ])
}

/// Symmetric perspective projection from a **vertical** field of view (radians).
pub fn frustum(fov_y: f32, aspect: f32, n: f32, f: f32) -> Mat4 {
    let t = (fov_y / 2.0).tan();
    perspective(-n * t * aspect, n * t * aspect, -n * t, n * t, n, f)
}

/// Symmetric perspective projection from a **horizontal** field of view (radians).
pub fn frustum_h(fov_x: f32, aspect: f32, n: f32, f: f32) -> Mat4 {
    let t = (fov_x / 2.0).tan();
    perspective(-n * t, n * t, -n * t / aspect, n * t / aspect, n, f)
}

/// Orthographic projection showing a window `height` units tall and
/// `height * aspect` units wide, centered on the view axis.
pub fn ortho_fov(height: f32, aspect: f32, n: f32, f: f32) -> Mat4 {
    let half_w = height * aspect / 2.0;
    let half_h = height / 2.0;
    ortho(-half_w, half_w, -half_h, half_h, n, f)
}

/// Perspective projection from a calibrated pinhole camera.
///
/// `k` is the 3x3 intrinsic matrix in computer-vision convention (focal
/// lengths and principal point in pixels), `width`/`height` is the image size
/// the calibration refers to.
pub fn from_intrinsics(k: [[f32; 3]; 3], width: f32, height: f32, n: f32, f: f32) -> Mat4 {
    Mat4::new([
        [
            k[0][0] * 2.0 / width,
            k[0][1] * 2.0 / width,
            -2.0 * k[0][2] / width + 1.0,
            0.0,
        ],
        [
            k[1][0] * 2.0 / height,
            k[1][1] * 2.0 / height,
            2.0 * k[1][2] / height - 1.0,
            0.0,
        ],
        [0.0, 0.0, -(f + n) / (f - n), -2.0 * f * n / (f - n)],
        [0.0, 0.0, -1.0, 0.0],
    ])
}

/// `true` for perspective matrices (bottom-right element is 0).
pub fn is_perspective(m: &Mat4) -> bool {
    m.get(3, 3) == 0.0
}

/// Camera-space `(near, far)` distances of a projection matrix.
pub fn clip_planes(m: &Mat4) -> (f32, f32) {
    let info = ProjectionInfo::from_matrix(m);
    (info.near, info.far)
}

/// Facts the rasterizer needs about a projection matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionInfo {
    /// `true` when the bottom-right element is 0.
    pub perspective: bool,
    /// Distance from the camera to the near plane (positive).
    pub near: f32,
    /// Distance from the camera to the far plane (positive).
    pub far: f32,
}

impl ProjectionInfo {
    /// Recover the projection kind and the near/far distances from a matrix
    /// built with this module's conventions.
    pub fn from_matrix(m: &Mat4) -> Self {
        let perspective = is_perspective(m);
        let (m22, m23) = (m.get(2, 2), m.get(2, 3));
        let (near, far) = if perspective {
            (m23 / (m22 - 1.0), m23 / (m22 + 1.0))
        } else {
            ((m23 + 1.0) / m22, (m23 - 1.0) / m22)
        };
        Self {
            perspective,
            near,
            far,
        }
    }

    /// Camera-space Z of the near plane. Vertices with a greater Z are behind it.
    pub fn near_z(&self) -> f32 {
        -self.near
    }

    /// The far plane expressed in the depth space used by the z-buffer:
    /// camera distance for perspective projections, NDC z for orthographic ones.
    pub fn far_depth(&self) -> f32 {
        if self.perspective {
            self.far
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn frustum_maps_near_and_far_to_unit_depth() {
        let m = frustum(FRAC_PI_2, 1.0, 1.0, 10.0);
        assert_relative_eq!(m.project_point(Vec3::new(0.0, 0.0, -1.0)).z, -1.0, epsilon = 1e-5);
        assert_relative_eq!(m.project_point(Vec3::new(0.0, 0.0, -10.0)).z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn frustum_edges_map_to_unit_square() {
        // 90 degree vertical fov: the top of the view at distance 2 is y = 2.
        let m = frustum(FRAC_PI_2, 2.0, 1.0, 10.0);
        let p = m.project_point(Vec3::new(4.0, 2.0, -2.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn frustum_h_uses_horizontal_fov() {
        let m = frustum_h(FRAC_PI_2, 2.0, 1.0, 10.0);
        let p = m.project_point(Vec3::new(2.0, 1.0, -2.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn ortho_maps_box_to_cube() {
        let m = ortho(-4.0, 4.0, -3.0, 3.0, 5.0, 15.0);
        let p = m.project_point(Vec3::new(4.0, -3.0, -5.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, -1.0, epsilon = 1e-6);
        assert_relative_eq!(m.project_point(Vec3::new(0.0, 0.0, -15.0)).z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn ortho_fov_is_centered() {
        assert_eq!(ortho_fov(6.0, 2.0, 1.0, 2.0), ortho(-6.0, 6.0, -3.0, 3.0, 1.0, 2.0));
    }

    #[test]
    fn info_recovers_planes() {
        let p = ProjectionInfo::from_matrix(&frustum(0.6, 1.5, 10.0, 7000.0));
        assert!(p.perspective);
        assert_relative_eq!(p.near, 10.0, max_relative = 1e-4);
        assert_relative_eq!(p.far, 7000.0, max_relative = 1e-3);
        assert_relative_eq!(p.far_depth(), p.far);

        let o = ProjectionInfo::from_matrix(&ortho(-40.0, 40.0, -30.0, 30.0, 50.0, 120.0));
        assert!(!o.perspective);
        assert_relative_eq!(o.near, 50.0, max_relative = 1e-5);
        assert_relative_eq!(o.far, 120.0, max_relative = 1e-5);
        assert_eq!(o.far_depth(), 1.0);
        assert_relative_eq!(o.near_z(), -50.0, max_relative = 1e-5);
    }

    #[test]
    fn clip_planes_match_builder_arguments() {
        assert!(is_perspective(&frustum(1.0, 1.0, 2.0, 20.0)));
        assert!(!is_perspective(&ortho(-1.0, 1.0, -1.0, 1.0, 2.0, 20.0)));
        let (n, f) = clip_planes(&perspective(-1.0, 1.0, -1.0, 1.0, 2.0, 20.0));
        assert_relative_eq!(n, 2.0, max_relative = 1e-5);
        assert_relative_eq!(f, 20.0, max_relative = 1e-4);
    }

    #[test]
    fn intrinsics_center_principal_point_maps_to_origin() {
        let k = [[500.0, 0.0, 320.0], [0.0, 500.0, 240.0], [0.0, 0.0, 1.0]];
        let m = from_intrinsics(k, 640.0, 480.0, 0.1, 100.0);
        let p = m.project_point(Vec3::new(0.0, 0.0, -3.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
        // fx = 500 px: a point 1 unit right at distance 1 lands 500 px from center.
        let q = m.project_point(Vec3::new(1.0, 0.0, -1.0));
        assert_relative_eq!(q.x, 500.0 / 320.0, epsilon = 1e-5);
    }
}
