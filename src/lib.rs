//! A CPU triangle rasterizer for offline rendering.
//!
//! Renders a scene graph of indexed triangle meshes into color, depth,
//! camera-space position (range image) and normal buffers, entirely on the CPU.
//!
//! # Quick Start
//!
//! ```no_run
//! use softraster::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut scene = Scene::new();
//! scene.add(SceneNode::mesh(primitives::cube(2.0)?));
//!
//! let mut renderer = Renderer::new(320, 240)?;
//! renderer.set_projection(projection::frustum(0.8, renderer.aspect(), 1.0, 100.0));
//! renderer.set_view(Mat4::translation(0.0, 0.0, -6.0) * Mat4::rotation_y(0.6));
//! renderer.set_scene(scene);
//! renderer.render()?;
//!
//! io::save_ppm(renderer.image(), "cube.ppm")?;
//! # Ok(())
//! # }
//! ```

// Public API - exposed to library consumers
pub mod camera;
pub mod colors;
pub mod error;
pub mod grid;
pub mod io;
pub mod light;
pub mod math;
pub mod primitives;
pub mod projection;
pub mod render;
pub mod scene;
pub mod texture;
pub mod vertex;

// Re-export commonly needed types at crate root for convenience
pub use error::{LoadError, MeshError, RenderError};
pub use render::{FrameStats, RenderOptions, Renderer};
pub use scene::{Material, Scene, SceneNode, TriMesh};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use softraster::prelude::*;
/// ```
pub mod prelude {
    // Camera
    pub use crate::camera::OrbitCamera;

    // Errors
    pub use crate::error::{LoadError, MeshError, RenderError};

    // Lighting
    pub use crate::light::Light;

    // Math
    pub use crate::math::{Mat4, Vec2, Vec3, Vec4};

    // Rendering
    pub use crate::render::{FrameStats, RenderOptions, Renderer};

    // Scene
    pub use crate::scene::{BBox, Material, NodeKind, Scene, SceneNode, TriMesh};
    pub use crate::texture::Texture;

    // Modules with free functions
    pub use crate::{io, primitives, projection};
}
