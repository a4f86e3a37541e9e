//! In-memory scene graph consumed by the renderer.

mod bbox;
mod material;
mod mesh;
mod node;

pub use bbox::BBox;
pub use material::Material;
pub use mesh::TriMesh;
pub use node::{NodeKind, Renderable, SceneNode};

use crate::light::Light;
use crate::math::Mat4;

/// A scene: the root of the node tree plus global lighting.
#[derive(Clone, Debug)]
pub struct Scene {
    pub root: SceneNode,
    /// Ambient intensity added to the Lambertian term.
    pub ambient_light: f32,
    /// Used unless the renderer overrides it.
    pub light: Light,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            root: SceneNode::group(),
            ambient_light: 0.1,
            light: Light::default(),
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under the root.
    pub fn add(&mut self, node: SceneNode) {
        self.root.add(node);
    }

    /// Flatten the visible scene into a draw list, in pre-order.
    pub fn collect_shapes(&self) -> Vec<Renderable<'_>> {
        let mut list = Vec::new();
        self.root.collect_shapes(&mut list, &Mat4::identity());
        list
    }

    /// World-space bounding box of all visible geometry.
    pub fn bbox(&self) -> BBox {
        self.root.bbox(&Mat4::identity())
    }
}
