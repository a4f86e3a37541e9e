//! The renderer façade.
//!
//! Provides the [`Renderer`] struct which owns the frame buffers and the
//! per-frame settings (projection, view, light, default material, toggles)
//! and draws a bound [`Scene`] into them.

use std::rc::Rc;

use log::debug;

use super::framebuffer::FrameBuffer;
use super::rasterizer::{FrameStats, RasterState, Rasterizer};
use crate::colors::{self, Color};
use crate::error::RenderError;
use crate::grid::{DepthBuffer, Image, PointBuffer};
use crate::light::Light;
use crate::math::Mat4;
use crate::projection;
use crate::scene::{Material, Scene, TriMesh};

/// Ambient intensity used by [`Renderer::paint_mesh`] when no scene is bound.
const DEFAULT_AMBIENT: f32 = 0.1;

/// Runtime toggles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Lambert, ambient and specular terms. Off: `emissive + base color`.
    pub lighting: bool,
    /// Sample material textures. Off: use the diffuse color.
    pub texturing: bool,
    pub background: Color,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            lighting: true,
            texturing: true,
            background: colors::BLACK,
        }
    }
}

pub struct Renderer {
    buffer: FrameBuffer,
    options: RenderOptions,
    view: Mat4,
    projection: Mat4,
    /// Overrides the scene light when set.
    light: Option<Light>,
    /// Used for meshes without a material.
    material: Rc<Material>,
    scene: Option<Scene>,
    rasterizer: Rasterizer,
}

impl Renderer {
    pub const DEFAULT_WIDTH: usize = 800;
    pub const DEFAULT_HEIGHT: usize = 600;

    /// Create a renderer with `width` x `height` buffers, an orthographic
    /// projection and an identity view.
    pub fn new(width: usize, height: usize) -> Result<Self, RenderError> {
        let options = RenderOptions::default();
        let projection = projection::ortho(-40.0, 40.0, -30.0, 30.0, 50.0, 120.0);
        let light = Light::default().to_camera(&Mat4::identity());
        Ok(Self {
            buffer: FrameBuffer::new(width, height, options.background)?,
            options,
            view: Mat4::identity(),
            projection,
            light: None,
            material: Rc::new(Material::default()),
            scene: None,
            rasterizer: Rasterizer::new(RasterState::new(projection, light, DEFAULT_AMBIENT)),
        })
    }

    /// Reallocate and clear all buffers. Sizes must be non-zero.
    pub fn set_size(&mut self, width: usize, height: usize) -> Result<(), RenderError> {
        self.buffer.resize(width, height, self.options.background)
    }

    pub fn width(&self) -> usize {
        self.buffer.width()
    }

    pub fn height(&self) -> usize {
        self.buffer.height()
    }

    /// Width over height of the output image.
    pub fn aspect(&self) -> f32 {
        self.buffer.width() as f32 / self.buffer.height() as f32
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// World to camera transform.
    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Use `light` instead of the scene's own light.
    pub fn set_light(&mut self, light: Light) {
        self.light = Some(light);
    }

    /// Go back to the scene's light.
    pub fn clear_light(&mut self) {
        self.light = None;
    }

    /// Material for meshes that do not carry one.
    pub fn set_material(&mut self, material: Rc<Material>) {
        self.material = material;
    }

    pub fn material(&self) -> &Rc<Material> {
        &self.material
    }

    pub fn set_lighting(&mut self, on: bool) {
        self.options.lighting = on;
    }

    pub fn set_texturing(&mut self, on: bool) {
        self.options.texturing = on;
    }

    /// Takes effect at the next clear.
    pub fn set_background(&mut self, color: Color) {
        self.options.background = color;
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = Some(scene);
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Mutable access, e.g. to animate node transforms between frames.
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Reset all buffers to the background and far depth.
    pub fn clear(&mut self) {
        self.buffer.clear(self.options.background);
    }

    /// Per-frame rasterizer state for the current settings.
    fn raster_state(&self, scene_light: Light, ambient: f32) -> RasterState {
        let light = self.light.unwrap_or(scene_light).to_camera(&self.view);
        RasterState {
            lighting: self.options.lighting,
            texturing: self.options.texturing,
            ..RasterState::new(self.projection, light, ambient)
        }
    }

    /// Draw the bound scene from scratch.
    ///
    /// All buffers are cleared first, so rendering twice with the same inputs
    /// gives the same result. Afterwards, pixels deeper than the far plane
    /// are marked as empty in the range image.
    pub fn render(&mut self) -> Result<(), RenderError> {
        let scene = self.scene.as_ref().ok_or(RenderError::NoScene)?;
        let state = self.raster_state(scene.light, scene.ambient_light);

        self.buffer.clear(self.options.background);
        self.rasterizer.begin_frame(state);

        let shapes = scene.collect_shapes();
        for shape in &shapes {
            let material: &Material = shape.mesh.material().unwrap_or(&self.material);
            let modelview = self.view * shape.transform;
            self.rasterizer
                .paint_mesh(&mut self.buffer, shape.mesh, &modelview, material);
        }

        self.buffer.reset_far_points(state.info.far_depth());

        let stats = self.rasterizer.stats();
        debug!(
            "frame {}x{}: {} renderables, {} triangles ({} clipped, {} culled), {} pixels shaded",
            self.buffer.width(),
            self.buffer.height(),
            stats.renderables,
            stats.triangles,
            stats.clipped,
            stats.culled,
            stats.pixels_shaded
        );
        Ok(())
    }

    /// Draw a single mesh on top of the current buffers without clearing.
    ///
    /// Uses the bound scene's light and ambient term if there is a scene,
    /// defaults otherwise. Statistics accumulate until the next
    /// [`render`](Self::render).
    pub fn paint_mesh(&mut self, mesh: &TriMesh, transform: &Mat4) {
        let (light, ambient) = self
            .scene
            .as_ref()
            .map_or((Light::default(), DEFAULT_AMBIENT), |s| (s.light, s.ambient_light));
        let state = self.raster_state(light, ambient);
        self.rasterizer.set_state(state);

        let material = mesh.material().cloned().unwrap_or_else(|| self.material.clone());
        let modelview = self.view * *transform;
        self.rasterizer
            .paint_mesh(&mut self.buffer, mesh, &modelview, &material);
    }

    pub fn image(&self) -> &Image {
        self.buffer.color()
    }

    pub fn depth(&self) -> &DepthBuffer {
        self.buffer.depth()
    }

    /// Camera-space position per pixel; zero where nothing was hit.
    pub fn range_image(&self) -> &PointBuffer {
        self.buffer.points()
    }

    pub fn normals(&self) -> &PointBuffer {
        self.buffer.normals()
    }

    /// Counters of the last frame.
    pub fn stats(&self) -> FrameStats {
        self.rasterizer.stats()
    }
}
