//! X3D scenes (XML encoding), read through `roxmltree`.
//!
//! `Transform` and `Group` elements become group nodes with a
//! `translation * rotation * scale` transform, `Shape` elements become meshes.
//! Geometry comes from `IndexedFaceSet` (polygons separated by `-1`, fanned
//! into triangles) or `IndexedTriangleSet`. Other elements are skipped.

use std::path::Path;
use std::rc::Rc;

use log::{debug, warn};
use roxmltree::{Document, Node};

use super::LoadError;
use crate::math::{Mat4, Vec2, Vec3};
use crate::scene::{Material, SceneNode, TriMesh};
use crate::texture::Texture;

/// X3D shininess is in `[0, 1]`; Phong exponents are larger.
const SHININESS_SCALE: f32 = 10.0;

fn malformed(msg: impl Into<String>) -> LoadError {
    LoadError::X3d(msg.into())
}

/// Parse a list of numbers; X3D allows commas between values.
fn numbers<T: std::str::FromStr>(text: &str) -> Result<Vec<T>, LoadError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| t.parse().map_err(|_| malformed(format!("invalid number {t:?}"))))
        .collect()
}

fn attr_numbers(node: Node, name: &str) -> Result<Vec<f32>, LoadError> {
    node.attribute(name).map_or(Ok(Vec::new()), numbers)
}

/// Exactly `N` numbers from an attribute, or `default` if it is absent.
fn attr_array<const N: usize>(node: Node, name: &str, default: [f32; N]) -> Result<[f32; N], LoadError> {
    let Some(text) = node.attribute(name) else {
        return Ok(default);
    };
    numbers::<f32>(text)?
        .try_into()
        .map_err(|_| malformed(format!("<{}> {name} needs {N} values", node.tag_name().name())))
}

fn attr_vec3(node: Node, name: &str, default: [f32; 3]) -> Result<Vec3, LoadError> {
    let [x, y, z] = attr_array(node, name, default)?;
    Ok(Vec3::new(x, y, z))
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

/// Split `-1` terminated polygons and fan each into triangles.
fn triangulate(indices: &[i64]) -> Vec<usize> {
    let mut tris = Vec::with_capacity(indices.len() * 3 / 2);
    for face in indices.split(|&i| i < 0) {
        for k in 1..face.len().saturating_sub(1) {
            tris.extend([face[0], face[k], face[k + 1]].map(|i| i as usize));
        }
    }
    tris
}

fn transform_of(node: Node) -> Result<Mat4, LoadError> {
    let [tx, ty, tz] = attr_array(node, "translation", [0.0, 0.0, 0.0])?;
    let [ax, ay, az, angle] = attr_array(node, "rotation", [0.0, 0.0, 1.0, 0.0])?;
    let [sx, sy, sz] = attr_array(node, "scale", [1.0, 1.0, 1.0])?;
    Ok(Mat4::translation(tx, ty, tz)
        * Mat4::rotation_axis(Vec3::new(ax, ay, az), angle)
        * Mat4::scaling(sx, sy, sz))
}

/// First URL of an `MFString` such as `"wood.png" "http://host/wood.png"`.
fn first_url(urls: &str) -> Option<&str> {
    let urls = urls.trim();
    match urls.strip_prefix('"') {
        Some(rest) => rest.split('"').next(),
        None => urls.split_whitespace().next(),
    }
    .filter(|u| !u.is_empty())
}

fn convert_appearance(appearance: Option<Node>, dir: &Path) -> Result<Material, LoadError> {
    let mut material = Material::default();
    let Some(appearance) = appearance else {
        return Ok(material);
    };
    if let Some(m) = child(appearance, "Material") {
        material.diffuse = attr_vec3(m, "diffuseColor", [0.8, 0.8, 0.8])?;
        material.specular = attr_vec3(m, "specularColor", [0.0, 0.0, 0.0])?;
        material.emissive = attr_vec3(m, "emissiveColor", [0.0, 0.0, 0.0])?;
        let [shininess] = attr_array(m, "shininess", [0.2])?;
        material.shininess = shininess * SHININESS_SCALE;
        let [transparency] = attr_array(m, "transparency", [0.0])?;
        material.opacity = 1.0 - transparency;
    }
    if let Some(url) = child(appearance, "ImageTexture")
        .and_then(|t| t.attribute("url"))
        .and_then(first_url)
    {
        material.texture_name = url.to_string();
        match Texture::from_file(dir.join(url)) {
            Ok(texture) => material.texture = Some(texture),
            Err(e) => warn!("X3D texture {url} not loaded: {e}"),
        }
    }
    Ok(material)
}

fn convert_geometry(geometry: Node) -> Result<TriMesh, LoadError> {
    let points = match child(geometry, "Coordinate") {
        Some(c) => attr_numbers(c, "point")?,
        None => Vec::new(),
    };
    let vertices: Vec<Vec3> = points
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();

    let normals: Vec<Vec3> = match child(geometry, "Normal") {
        Some(n) => attr_numbers(n, "vector")?
            .chunks_exact(3)
            .map(|n| Vec3::new(n[0], n[1], n[2]))
            .collect(),
        None => Vec::new(),
    };
    // Texture origin is at the bottom left.
    let texcoords: Vec<Vec2> = match child(geometry, "TextureCoordinate") {
        Some(t) => attr_numbers(t, "point")?
            .chunks_exact(2)
            .map(|t| Vec2::new(t[0], 1.0 - t[1]))
            .collect(),
        None => Vec::new(),
    };

    let (indices, normals_i, texcoords_i) = if geometry.has_tag_name("IndexedFaceSet") {
        let index = |name: &str| -> Result<Vec<usize>, LoadError> {
            let raw: Vec<i64> = geometry.attribute(name).map_or(Ok(Vec::new()), numbers)?;
            Ok(triangulate(&raw))
        };
        (index("coordIndex")?, index("normalIndex")?, index("texCoordIndex")?)
    } else {
        let index: Vec<i64> = geometry.attribute("index").map_or(Ok(Vec::new()), numbers)?;
        let index = index
            .into_iter()
            .map(|i| usize::try_from(i).map_err(|_| malformed(format!("negative index {i}"))))
            .collect::<Result<_, _>>()?;
        (index, Vec::new(), Vec::new())
    };

    // Empty attribute index arrays fall back to the position indices.
    let mut mesh = TriMesh::new(vertices, indices)?;
    if !normals.is_empty() {
        mesh = mesh.with_normals(normals, normals_i)?;
    }
    if !texcoords.is_empty() {
        mesh = mesh.with_texcoords(texcoords, texcoords_i)?;
    }
    Ok(mesh)
}

fn convert_shape(shape: Node, dir: &Path) -> Result<Option<SceneNode>, LoadError> {
    let Some(geometry) = shape
        .children()
        .find(|n| n.has_tag_name("IndexedFaceSet") || n.has_tag_name("IndexedTriangleSet"))
    else {
        warn!("X3D shape on line {} has no supported geometry", line_of(shape));
        return Ok(None);
    };
    let material = convert_appearance(child(shape, "Appearance"), dir)?;
    let mesh = convert_geometry(geometry)?.with_material(Rc::new(material));
    Ok(Some(SceneNode::mesh(mesh)))
}

fn line_of(node: Node) -> u32 {
    node.document().text_pos_at(node.range().start).row
}

fn convert_node(node: Node, dir: &Path) -> Result<Option<SceneNode>, LoadError> {
    match node.tag_name().name() {
        "Transform" | "Group" => {
            let mut group = SceneNode::group().with_transform(transform_of(node)?);
            for c in node.children().filter(Node::is_element) {
                if let Some(child) = convert_node(c, dir)? {
                    group.add(child);
                }
            }
            Ok(Some(group))
        }
        "Shape" => convert_shape(node, dir),
        other => {
            debug!("skipping X3D element <{other}>");
            Ok(None)
        }
    }
}

/// Parse an X3D document held in memory. Textures are resolved relative to `dir`.
pub fn parse_x3d(text: &str, dir: &Path) -> Result<SceneNode, LoadError> {
    let doc = Document::parse(text)?;
    let x3d = doc.root_element();
    if !x3d.has_tag_name("X3D") {
        return Err(malformed(format!("root element is <{}>", x3d.tag_name().name())));
    }
    let scene = child(x3d, "Scene").ok_or_else(|| malformed("no <Scene> element"))?;

    let mut root = SceneNode::group();
    for e in scene.children().filter(Node::is_element) {
        if let Some(node) = convert_node(e, dir)? {
            root.add(node);
        }
    }
    Ok(root)
}

/// Load an X3D file into a group node mirroring its transform hierarchy.
pub fn load_x3d<P: AsRef<Path>>(path: P) -> Result<SceneNode, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let node = parse_x3d(&text, dir)?;
    debug!("loaded {}: {} nodes", path.display(), node.node_count());
    Ok(node)
}
