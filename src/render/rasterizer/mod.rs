//! Triangle setup and rasterization.
//!
//! [`Rasterizer`] takes meshes to camera space, clips their triangles against
//! the near plane, and hands the survivors to the edge-function scan loop with
//! the shader matching the current render options.

mod edgefunction;
pub mod shader;

use log::trace;

use super::clipper::{clip_near, NearClip};
use super::framebuffer::FrameBuffer;
use crate::light::CameraLight;
use crate::math::{Mat4, Vec2, Vec3};
use crate::projection::ProjectionInfo;
use crate::scene::{Material, TriMesh};
use crate::vertex::Vertex;
use edgefunction::rasterize_with_shader;
use shader::{BaseColor, PhongShader, UnlitShader};

/// Counters gathered while rendering one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Meshes drawn.
    pub renderables: usize,
    /// Triangles submitted.
    pub triangles: usize,
    /// Triangles cut by the near plane.
    pub clipped: usize,
    /// Triangles dropped: behind the near plane, off screen, back facing or degenerate.
    pub culled: usize,
    /// Fragments that passed the depth test.
    pub pixels_shaded: usize,
}

/// Per-frame constants shared by every triangle.
#[derive(Clone, Copy, Debug)]
pub struct RasterState {
    pub projection: Mat4,
    pub info: ProjectionInfo,
    pub light: CameraLight,
    pub ambient: f32,
    pub lighting: bool,
    pub texturing: bool,
}

impl RasterState {
    pub fn new(projection: Mat4, light: CameraLight, ambient: f32) -> Self {
        Self {
            projection,
            info: ProjectionInfo::from_matrix(&projection),
            light,
            ambient,
            lighting: true,
            texturing: true,
        }
    }
}

/// Draws triangles into a [`FrameBuffer`].
///
/// Keeps scratch storage for transformed vertices so meshes of similar size
/// do not reallocate every frame.
pub struct Rasterizer {
    state: RasterState,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    stats: FrameStats,
}

impl Rasterizer {
    pub fn new(state: RasterState) -> Self {
        Self {
            state,
            positions: Vec::new(),
            normals: Vec::new(),
            stats: FrameStats::default(),
        }
    }

    /// Replace the per-frame state and reset the counters.
    pub fn begin_frame(&mut self, state: RasterState) {
        self.state = state;
        self.stats = FrameStats::default();
    }

    /// Replace the per-frame state, keeping the counters.
    pub fn set_state(&mut self, state: RasterState) {
        self.state = state;
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Draw every triangle of `mesh` placed with `modelview` (object to camera).
    pub fn paint_mesh(
        &mut self,
        buffer: &mut FrameBuffer,
        mesh: &TriMesh,
        modelview: &Mat4,
        material: &Material,
    ) {
        let Self {
            state,
            positions,
            normals,
            stats,
        } = self;

        // Normals need the inverse transpose to survive non-uniform scaling.
        let normal_matrix = modelview
            .inverse()
            .map(|m| m.transpose())
            .unwrap_or(*modelview);

        positions.clear();
        positions.extend(mesh.vertices().iter().map(|&p| modelview.transform_point(p)));
        normals.clear();
        normals.extend(mesh.normals().iter().map(|&n| normal_matrix.transform_vector(n)));

        trace!(
            "painting mesh: {} vertices, {} triangles",
            positions.len(),
            mesh.triangle_count()
        );

        stats.renderables += 1;
        for (t, corners) in mesh.indices().chunks_exact(3).enumerate() {
            let base = t * 3;
            let p = [positions[corners[0]], positions[corners[1]], positions[corners[2]]];
            let flat = (p[1] - p[0]).cross(p[2] - p[0]).normalize();

            let mut tri = [Vertex::default(); 3];
            for (c, vertex) in tri.iter_mut().enumerate() {
                let normal = mesh
                    .normal_index(base + c)
                    .map_or(flat, |i| normals[i]);
                let uv = mesh
                    .texcoord_index(base + c)
                    .map_or(Vec2::ZERO, |i| mesh.texcoords()[i]);
                *vertex = Vertex::new(p[c], normal, uv);
            }
            paint_triangle(buffer, state, stats, material, tri);
        }
    }

    /// Draw one camera-space triangle with `material`.
    pub fn paint_triangle(&mut self, buffer: &mut FrameBuffer, material: &Material, v: [Vertex; 3]) {
        paint_triangle(buffer, &self.state, &mut self.stats, material, v);
    }
}

fn paint_triangle(
    buffer: &mut FrameBuffer,
    state: &RasterState,
    stats: &mut FrameStats,
    material: &Material,
    v: [Vertex; 3],
) {
    stats.triangles += 1;
    match clip_near(state.info.near_z(), v) {
        NearClip::Inside => shade_triangle(buffer, state, stats, material, &v),
        NearClip::Outside => stats.culled += 1,
        NearClip::One(t) => {
            stats.clipped += 1;
            shade_triangle(buffer, state, stats, material, &t);
        }
        NearClip::Two(a, b) => {
            stats.clipped += 1;
            shade_triangle(buffer, state, stats, material, &a);
            shade_triangle(buffer, state, stats, material, &b);
        }
    }
}

/// Pick the shader for the current options and rasterize.
fn shade_triangle(
    buffer: &mut FrameBuffer,
    state: &RasterState,
    stats: &mut FrameStats,
    material: &Material,
    v: &[Vertex; 3],
) {
    let base = BaseColor::for_material(material, state.texturing);
    if state.lighting {
        let shader = PhongShader::new(v, material, base, state.light, state.ambient);
        rasterize_with_shader(buffer, state, v, &shader, stats);
    } else {
        let shader = UnlitShader::new(v, material, base);
        rasterize_with_shader(buffer, state, v, &shader, stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors;
    use crate::projection;
    use approx::assert_relative_eq;

    fn rasterizer(projection: Mat4) -> Rasterizer {
        let mut state = RasterState::new(projection, CameraLight::Directional(Vec3::Z), 0.0);
        state.lighting = false;
        Rasterizer::new(state)
    }

    fn vtx(x: f32, y: f32, z: f32) -> Vertex {
        Vertex::new(Vec3::new(x, y, z), Vec3::Z, Vec2::ZERO)
    }

    fn covered(fb: &FrameBuffer) -> usize {
        fb.depth()
            .as_slice()
            .iter()
            .filter(|&&d| d != FrameBuffer::CLEAR_DEPTH)
            .count()
    }

    #[test]
    fn triangle_behind_near_plane_paints_nothing() {
        let mut r = rasterizer(projection::frustum(1.0, 1.0, 1.0, 100.0));
        let mut fb = FrameBuffer::new(16, 16, colors::BLACK).unwrap();
        let m = Material::default();
        r.paint_triangle(&mut fb, &m, [vtx(-1.0, -1.0, -0.5), vtx(1.0, -1.0, -0.5), vtx(0.0, 1.0, -0.5)]);
        assert_eq!(covered(&fb), 0);
        assert_eq!(r.stats().culled, 1);
    }

    #[test]
    fn straddling_triangle_matches_manual_clip() {
        let proj = projection::frustum(1.4, 1.0, 1.0, 100.0);
        let tri = [vtx(-1.0, -1.0, -3.0), vtx(1.0, -1.0, -3.0), vtx(0.0, 1.0, 1.0)];
        let m = Material::default();

        let mut clipped = FrameBuffer::new(32, 32, colors::BLACK).unwrap();
        let mut r = rasterizer(proj);
        r.paint_triangle(&mut clipped, &m, tri);
        assert_eq!(r.stats().clipped, 1);

        let NearClip::Two(a, b) = clip_near(-1.0, tri) else {
            panic!("expected the apex alone to be cut");
        };
        let mut manual = FrameBuffer::new(32, 32, colors::BLACK).unwrap();
        let mut r = rasterizer(proj);
        r.paint_triangle(&mut manual, &m, a);
        r.paint_triangle(&mut manual, &m, b);
        assert_eq!(r.stats().clipped, 0);

        assert!(covered(&clipped) > 0);
        assert_eq!(clipped.depth().as_slice(), manual.depth().as_slice());
    }

    #[test]
    fn mesh_without_normals_uses_face_normal() {
        let mesh = TriMesh::new(
            vec![Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
            vec![0, 1, 2],
        )
        .unwrap();
        let mut r = rasterizer(projection::ortho(-2.0, 2.0, -2.0, 2.0, 0.5, 10.0));
        let mut fb = FrameBuffer::new(8, 8, colors::BLACK).unwrap();
        r.paint_mesh(&mut fb, &mesh, &Mat4::translation(0.0, 0.0, -3.0), &Material::default());
        assert_eq!(r.stats().renderables, 1);
        assert_eq!(fb.normals()[(4, 4)], Vec3::Z);
        assert_relative_eq!(fb.points()[(4, 4)].z, -3.0, epsilon = 1e-5);
    }

    #[test]
    fn lighting_toggle_switches_shader() {
        let proj = projection::ortho(-2.0, 2.0, -2.0, 2.0, 0.5, 10.0);
        let tri = [vtx(-1.0, -1.0, -3.0), vtx(1.0, -1.0, -3.0), vtx(0.0, 1.0, -3.0)];
        let material = Material::matte(Vec3::splat(0.5));

        let mut lit = Rasterizer::new(RasterState::new(proj, CameraLight::Directional(Vec3::X), 0.2));
        let mut fb = FrameBuffer::new(8, 8, colors::BLACK).unwrap();
        lit.paint_triangle(&mut fb, &material, tri);
        // Light grazes the surface: only ambient remains.
        assert_relative_eq!(fb.color()[(4, 4)].x, 0.1, epsilon = 1e-6);

        let mut unlit = rasterizer(proj);
        unlit.paint_triangle(&mut fb, &material, tri.map(|v| vtx(v.position.x, v.position.y, -2.0)));
        assert_relative_eq!(fb.color()[(4, 4)].x, 0.5, epsilon = 1e-6);
    }
}
