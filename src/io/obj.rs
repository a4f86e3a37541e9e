//! Wavefront OBJ models with MTL materials, loaded through `tobj`.

use std::path::Path;
use std::rc::Rc;

use log::{debug, warn};

use super::LoadError;
use crate::math::{Vec2, Vec3};
use crate::scene::{Material, SceneNode, TriMesh};
use crate::texture::Texture;

/// `Ns` values below this are treated as unset.
const MIN_SHININESS: f32 = 1e-4;
const FALLBACK_SHININESS: f32 = 10.0;

fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

fn parse_color(value: &str) -> Option<Vec3> {
    let mut parts = value.split_whitespace().map(str::parse::<f32>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(r)), Some(Ok(g)), Some(Ok(b))) => Some(Vec3::new(r, g, b)),
        _ => None,
    }
}

/// Build a material from an MTL entry; textures are resolved relative to `dir`.
fn convert_material(mtl: &tobj::Material, dir: &Path) -> Material {
    let mut material = Material::default();
    if let Some(kd) = mtl.diffuse {
        material.diffuse = vec3(kd);
    }
    if let Some(ks) = mtl.specular {
        material.specular = vec3(ks);
    }
    if let Some(ke) = mtl.unknown_param.get("Ke").and_then(|v| parse_color(v)) {
        material.emissive = ke;
    }
    if let Some(ns) = mtl.shininess {
        material.shininess = if ns < MIN_SHININESS {
            FALLBACK_SHININESS
        } else {
            ns
        };
    }
    if let Some(d) = mtl.dissolve {
        material.opacity = d;
    }
    if let Some(name) = &mtl.diffuse_texture {
        material.texture_name = name.clone();
        match Texture::from_file(dir.join(name)) {
            Ok(texture) => material.texture = Some(texture),
            Err(e) => warn!("material {}: texture {name} not loaded: {e}", mtl.name),
        }
    }
    material
}

/// Merges tobj meshes that share a material into one `TriMesh`.
#[derive(Default)]
struct MeshParts {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    indices: Vec<usize>,
    normals_i: Vec<usize>,
    texcoords_i: Vec<usize>,
    /// Index of the `(0, 0)` texcoord shared by parts without UVs.
    default_uv: Option<usize>,
    flat_triangles: usize,
}

impl MeshParts {
    fn append(&mut self, mesh: &tobj::Mesh, with_uvs: bool) {
        let v_base = self.vertices.len();
        self.vertices
            .extend(mesh.positions.chunks_exact(3).map(|p| Vec3::new(p[0], p[1], p[2])));
        let start = self.indices.len();
        self.indices
            .extend(mesh.indices.iter().map(|&i| v_base + i as usize));
        let corners = &self.indices[start..];

        let n_base = self.normals.len();
        if !mesh.normal_indices.is_empty() {
            self.normals
                .extend(mesh.normals.chunks_exact(3).map(|n| Vec3::new(n[0], n[1], n[2])));
            self.normals_i
                .extend(mesh.normal_indices.iter().map(|&i| n_base + i as usize));
        } else {
            // No normals in the file: one flat normal per triangle.
            for (t, tri) in corners.chunks_exact(3).enumerate() {
                let (a, b, c) = (self.vertices[tri[0]], self.vertices[tri[1]], self.vertices[tri[2]]);
                self.normals.push((b - a).cross(c - a).normalize());
                self.normals_i.extend_from_slice(&[n_base + t; 3]);
            }
            self.flat_triangles += corners.len() / 3;
        }

        if !with_uvs {
            return;
        }
        let t_base = self.texcoords.len();
        if !mesh.texcoord_indices.is_empty() {
            // OBJ puts the texture origin at the bottom left.
            self.texcoords
                .extend(mesh.texcoords.chunks_exact(2).map(|t| Vec2::new(t[0], 1.0 - t[1])));
            self.texcoords_i
                .extend(mesh.texcoord_indices.iter().map(|&i| t_base + i as usize));
        } else {
            let default_uv = *self.default_uv.get_or_insert_with(|| {
                self.texcoords.push(Vec2::ZERO);
                t_base
            });
            self.texcoords_i
                .extend(std::iter::repeat(default_uv).take(mesh.indices.len()));
        }
    }

    fn build(self) -> Result<TriMesh, LoadError> {
        let mut mesh = TriMesh::new(self.vertices, self.indices)?
            .with_normals(self.normals, self.normals_i)?;
        if !self.texcoords_i.is_empty() {
            mesh = mesh.with_texcoords(self.texcoords, self.texcoords_i)?;
        }
        Ok(mesh)
    }
}

/// Load an OBJ file into a group node with one mesh child per material.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<SceneNode, LoadError> {
    let path = path.as_ref();
    let options = tobj::LoadOptions {
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };
    let (models, mtl) = tobj::load_obj(path, &options)?;

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let materials: Vec<Rc<Material>> = match mtl {
        Ok(list) => list
            .iter()
            .map(|m| Rc::new(convert_material(m, dir)))
            .collect(),
        Err(e) => {
            warn!("{}: no materials loaded: {e}", path.display());
            Vec::new()
        }
    };
    let fallback = Rc::new(Material::default());

    // Group the tobj meshes by material, in order of first use.
    let mut groups: Vec<(Option<usize>, Vec<&tobj::Mesh>)> = Vec::new();
    for model in &models {
        let id = model.mesh.material_id;
        match groups.iter_mut().find(|(g, _)| *g == id) {
            Some((_, meshes)) => meshes.push(&model.mesh),
            None => groups.push((id, vec![&model.mesh])),
        }
    }

    let mut node = SceneNode::group();
    for (id, meshes) in groups {
        let with_uvs = meshes.iter().any(|m| !m.texcoord_indices.is_empty());
        let mut parts = MeshParts::default();
        for mesh in meshes {
            parts.append(mesh, with_uvs);
        }
        if parts.flat_triangles > 0 {
            warn!(
                "{}: {} triangles without normals, using face normals",
                path.display(),
                parts.flat_triangles
            );
        }
        let material = id
            .and_then(|i| materials.get(i).cloned())
            .unwrap_or_else(|| fallback.clone());
        node.add(SceneNode::mesh(parts.build()?.with_material(material)));
    }

    debug!(
        "loaded {}: {} meshes, {} materials",
        path.display(),
        node.children.len(),
        materials.len()
    );
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Image;
    use crate::io::save_ppm;

    const OBJ: &str = "mtllib quad.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl red
f 1/1 2/2 3/3 4/4
usemtl plain
f 1//1 2//1 5//1
";

    const MTL: &str = "newmtl red
Kd 1 0 0
Ns 0
Ke 0.1 0.2 0.3
map_Kd tex.ppm

newmtl plain
Kd 0 0 1
Ns 30
d 0.5
map_Kd missing.ppm
";

    fn write_model() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("softraster-obj-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("quad.obj"), OBJ).unwrap();
        std::fs::write(dir.join("quad.mtl"), MTL).unwrap();
        save_ppm(&Image::new(2, 2, Vec3::new(0.0, 1.0, 0.0)), dir.join("tex.ppm")).unwrap();
        dir
    }

    #[test]
    fn meshes_and_materials() {
        let dir = write_model();
        let node = load_obj(dir.join("quad.obj")).unwrap();
        assert_eq!(node.children.len(), 2);

        let quad = node.children[0].as_mesh().unwrap();
        assert_eq!(quad.triangle_count(), 2);
        let red = quad.material().unwrap();
        assert_eq!(red.diffuse, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(red.emissive, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(red.shininess, FALLBACK_SHININESS);
        assert_eq!(red.texture.as_ref().map(|t| t.width()), Some(2));

        // No normals in the file: flat normals from the winding.
        let n = quad.normals()[quad.normal_index(0).unwrap()];
        assert_eq!(n, Vec3::Z);
        // V is flipped: vt (0, 0) becomes (0, 1).
        let uv = quad.texcoords()[quad.texcoord_index(0).unwrap()];
        assert_eq!(uv, Vec2::new(0.0, 1.0));

        let tri = node.children[1].as_mesh().unwrap();
        let plain = tri.material().unwrap();
        assert_eq!(plain.shininess, 30.0);
        assert_eq!(plain.opacity, 0.5);
        assert!(plain.texture.is_none());
        assert_eq!(plain.texture_name, "missing.ppm");
        assert_eq!(tri.normals()[tri.normal_index(2).unwrap()], Vec3::Z);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(matches!(
            load_obj("/nonexistent/model.obj"),
            Err(LoadError::Obj(_))
        ));
    }
}
