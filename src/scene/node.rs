//! Scene graph nodes and flattening into a draw list.

use super::bbox::BBox;
use super::mesh::TriMesh;
use crate::math::Mat4;

/// What a node contributes besides its children.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Pure grouping node: only a transform for its children.
    Group,
    /// A drawable mesh; may still have children of its own.
    Mesh(TriMesh),
}

/// A node of the scene tree. Children are owned, so the graph has no cycles.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub visible: bool,
    /// Local transform, relative to the parent.
    pub transform: Mat4,
    pub kind: NodeKind,
    pub children: Vec<SceneNode>,
}

/// A mesh paired with its accumulated world transform, valid for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Renderable<'a> {
    pub mesh: &'a TriMesh,
    pub transform: Mat4,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::group()
    }
}

impl SceneNode {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            visible: true,
            transform: Mat4::identity(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::with_kind(NodeKind::Group)
    }

    pub fn mesh(mesh: TriMesh) -> Self {
        Self::with_kind(NodeKind::Mesh(mesh))
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn as_mesh(&self) -> Option<&TriMesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    /// Append every visible mesh in this subtree to `list`, in pre-order.
    ///
    /// Each node's world transform is `parent * self.transform`. An invisible
    /// node is skipped together with everything below it.
    pub fn collect_shapes<'a>(&'a self, list: &mut Vec<Renderable<'a>>, parent: &Mat4) {
        if !self.visible {
            return;
        }
        let world = *parent * self.transform;
        if let NodeKind::Mesh(mesh) = &self.kind {
            list.push(Renderable {
                mesh,
                transform: world,
            });
        }
        for child in &self.children {
            child.collect_shapes(list, &world);
        }
    }

    /// Bounding box of all visible geometry below this node, in the space of `parent`.
    pub fn bbox(&self, parent: &Mat4) -> BBox {
        let mut bbox = BBox::empty();
        if !self.visible {
            return bbox;
        }
        let world = *parent * self.transform;
        if let NodeKind::Mesh(mesh) = &self.kind {
            bbox += mesh.bbox(&world);
        }
        for child in &self.children {
            bbox += child.bbox(&world);
        }
        bbox
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn tri() -> TriMesh {
        TriMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
        )
        .unwrap()
    }

    fn origin_of(r: &Renderable) -> Vec3 {
        r.transform.transform_point(Vec3::ZERO)
    }

    #[test]
    fn flattens_in_pre_order_with_composed_transforms() {
        let root = SceneNode::group()
            .with_transform(Mat4::translation(1.0, 0.0, 0.0))
            .with_child(
                SceneNode::mesh(tri())
                    .with_transform(Mat4::translation(0.0, 2.0, 0.0))
                    .with_child(SceneNode::mesh(tri()).with_transform(Mat4::translation(0.0, 0.0, 3.0))),
            )
            .with_child(SceneNode::mesh(tri()).with_transform(Mat4::translation(5.0, 0.0, 0.0)));

        let mut list = Vec::new();
        root.collect_shapes(&mut list, &Mat4::identity());

        let origins: Vec<Vec3> = list.iter().map(origin_of).collect();
        assert_eq!(
            origins,
            vec![
                Vec3::new(1.0, 2.0, 0.0),
                Vec3::new(1.0, 2.0, 3.0),
                Vec3::new(6.0, 0.0, 0.0),
            ]
        );
    }

    #[test]
    fn invisible_subtree_is_skipped() {
        let mut hidden = SceneNode::mesh(tri()).with_child(SceneNode::mesh(tri()));
        hidden.visible = false;
        let root = SceneNode::group()
            .with_child(hidden)
            .with_child(SceneNode::mesh(tri()));

        let mut list = Vec::new();
        root.collect_shapes(&mut list, &Mat4::identity());
        assert_eq!(list.len(), 1);
        // The hidden child keeps its own flag.
        assert!(root.children[0].children[0].visible);
    }

    #[test]
    fn bbox_unions_children_in_world_space() {
        let root = SceneNode::group()
            .with_child(SceneNode::mesh(tri()))
            .with_child(SceneNode::mesh(tri()).with_transform(Mat4::translation(0.0, 0.0, -4.0)));
        let b = root.bbox(&Mat4::identity());
        assert_eq!(b.min, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(b.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn empty_group_has_empty_bbox() {
        assert!(SceneNode::group().bbox(&Mat4::identity()).is_empty());
        assert_eq!(SceneNode::group().with_child(SceneNode::group()).node_count(), 2);
    }
}
