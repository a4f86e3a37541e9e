//! Indexed triangle meshes.

use std::rc::Rc;

use super::bbox::BBox;
use super::material::Material;
use crate::error::MeshError;
use crate::math::{Mat4, Vec2, Vec3};

/// A triangle mesh with independently indexed positions, normals and
/// texture coordinates (OBJ style: each triangle corner picks its own
/// position, normal and UV).
///
/// Invariants, checked by every constructor:
/// - `indices.len() % 3 == 0`
/// - `normals_i` and `texcoords_i` are either empty or as long as `indices`
/// - every index is in range for the array it points into
///
/// When `normals_i` is empty and there is exactly one normal per vertex, the
/// position indices are reused for normals; with no usable normals at all the
/// renderer falls back to flat face normals. Texture coordinates follow the
/// same rule and default to `(0, 0)`.
#[derive(Clone, Debug, Default)]
pub struct TriMesh {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    indices: Vec<usize>,
    normals_i: Vec<usize>,
    texcoords_i: Vec<usize>,
    material: Option<Rc<Material>>,
}

fn check_range(name: &'static str, indices: &[usize], len: usize) -> Result<(), MeshError> {
    match indices.iter().find(|&&i| i >= len) {
        Some(&index) => Err(MeshError::IndexOutOfRange { name, index, len }),
        None => Ok(()),
    }
}

fn check_count(name: &'static str, expected: usize, found: usize) -> Result<(), MeshError> {
    if found == 0 || found == expected {
        Ok(())
    } else {
        Err(MeshError::AttributeIndexCount {
            name,
            expected,
            found,
        })
    }
}

impl TriMesh {
    /// Create a mesh from positions and triangle indices.
    pub fn new(vertices: Vec<Vec3>, indices: Vec<usize>) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::IndexCount(indices.len()));
        }
        check_range("position", &indices, vertices.len())?;
        Ok(Self {
            vertices,
            indices,
            ..Self::default()
        })
    }

    /// Attach normals. Pass an empty `normals_i` to index normals like positions.
    pub fn with_normals(
        mut self,
        normals: Vec<Vec3>,
        normals_i: Vec<usize>,
    ) -> Result<Self, MeshError> {
        check_count("normal", self.indices.len(), normals_i.len())?;
        check_range("normal", &normals_i, normals.len())?;
        self.normals = normals;
        self.normals_i = normals_i;
        Ok(self)
    }

    /// Attach texture coordinates. Pass an empty `texcoords_i` to index them like positions.
    pub fn with_texcoords(
        mut self,
        texcoords: Vec<Vec2>,
        texcoords_i: Vec<usize>,
    ) -> Result<Self, MeshError> {
        check_count("texcoord", self.indices.len(), texcoords_i.len())?;
        check_range("texcoord", &texcoords_i, texcoords.len())?;
        self.texcoords = texcoords;
        self.texcoords_i = texcoords_i;
        Ok(self)
    }

    pub fn with_material(mut self, material: Rc<Material>) -> Self {
        self.material = Some(material);
        self
    }

    pub fn set_material(&mut self, material: Option<Rc<Material>>) {
        self.material = material;
    }

    pub fn material(&self) -> Option<&Rc<Material>> {
        self.material.as_ref()
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn texcoords(&self) -> &[Vec2] {
        &self.texcoords
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Index into [`normals`](Self::normals) for triangle corner `corner`
    /// (an index into `indices`), or `None` if the mesh has no usable normals.
    #[inline]
    pub fn normal_index(&self, corner: usize) -> Option<usize> {
        if !self.normals_i.is_empty() {
            Some(self.normals_i[corner])
        } else if !self.normals.is_empty() && self.normals.len() == self.vertices.len() {
            Some(self.indices[corner])
        } else {
            None
        }
    }

    /// Index into [`texcoords`](Self::texcoords) for triangle corner `corner`.
    #[inline]
    pub fn texcoord_index(&self, corner: usize) -> Option<usize> {
        if !self.texcoords_i.is_empty() {
            Some(self.texcoords_i[corner])
        } else if !self.texcoords.is_empty() && self.texcoords.len() == self.vertices.len() {
            Some(self.indices[corner])
        } else {
            None
        }
    }

    /// Bounding box of the vertices after applying `xform`.
    pub fn bbox(&self, xform: &Mat4) -> BBox {
        let mut bbox = BBox::empty();
        for &p in &self.vertices {
            bbox += xform.transform_point(p);
        }
        bbox
    }
}
