//! STL meshes, binary and ASCII.
//!
//! Every facet becomes three fresh vertices sharing one normal, so the
//! resulting meshes are flat shaded.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::SplitWhitespace;

use log::{debug, warn};

use super::LoadError;
use crate::math::Vec3;
use crate::scene::TriMesh;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Accumulates facets in `TriMesh` layout.
#[derive(Default)]
struct Facets {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    normals_i: Vec<usize>,
    zero_normals: usize,
}

impl Facets {
    fn push(&mut self, normal: Vec3, corners: [Vec3; 3]) {
        // Many exporters leave the facet normal zeroed.
        let normal = if normal.magnitude() > 0.0 {
            normal.normalize()
        } else {
            self.zero_normals += 1;
            (corners[1] - corners[0])
                .cross(corners[2] - corners[0])
                .normalize()
        };
        let n = self.normals.len();
        self.normals.push(normal);
        self.vertices.extend_from_slice(&corners);
        self.normals_i.extend_from_slice(&[n, n, n]);
    }

    fn into_mesh(self) -> Result<TriMesh, LoadError> {
        if self.zero_normals > 0 {
            debug!("{} STL facets without normal, computed from winding", self.zero_normals);
        }
        let indices = (0..self.vertices.len()).collect();
        Ok(TriMesh::new(self.vertices, indices)?.with_normals(self.normals, self.normals_i)?)
    }
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_vec3(bytes: &[u8], offset: usize) -> Vec3 {
    Vec3::new(
        read_f32(bytes, offset),
        read_f32(bytes, offset + 4),
        read_f32(bytes, offset + 8),
    )
}

/// Facet count announced by a binary header, if the byte size matches it.
fn binary_facet_count(bytes: &[u8]) -> Option<usize> {
    let count = bytes.get(HEADER_LEN..HEADER_LEN + 4)?;
    let count = u32::from_le_bytes([count[0], count[1], count[2], count[3]]) as usize;
    (bytes.len() == HEADER_LEN + 4 + FACET_LEN * count).then_some(count)
}

fn parse_binary(bytes: &[u8], count: usize) -> Result<TriMesh, LoadError> {
    let mut facets = Facets::default();
    for facet in bytes[HEADER_LEN + 4..].chunks_exact(FACET_LEN).take(count) {
        facets.push(
            read_vec3(facet, 0),
            [read_vec3(facet, 12), read_vec3(facet, 24), read_vec3(facet, 36)],
        );
    }
    facets.into_mesh()
}

fn next_vec3(tokens: &mut SplitWhitespace<'_>) -> Result<Vec3, LoadError> {
    let mut next = || -> Result<f32, LoadError> {
        let token = tokens
            .next()
            .ok_or_else(|| LoadError::Stl("unexpected end of file".into()))?;
        token
            .parse()
            .map_err(|_| LoadError::Stl(format!("invalid number {token:?}")))
    };
    Ok(Vec3::new(next()?, next()?, next()?))
}

fn parse_ascii(text: &str) -> Result<TriMesh, LoadError> {
    let mut tokens = text.split_whitespace();
    if tokens.next() != Some("solid") {
        return Err(LoadError::Stl("neither binary nor ASCII STL".into()));
    }

    let mut facets = Facets::default();
    let mut normal = Vec3::ZERO;
    let mut corners = Vec::with_capacity(3);
    let mut skipped = 0;
    while let Some(tag) = tokens.next() {
        match tag {
            "normal" => normal = next_vec3(&mut tokens)?,
            "vertex" => corners.push(next_vec3(&mut tokens)?),
            "endfacet" => {
                if let [a, b, c] = corners[..] {
                    facets.push(normal, [a, b, c]);
                } else {
                    skipped += 1;
                }
                corners.clear();
                normal = Vec3::ZERO;
            }
            _ => {}
        }
    }
    if skipped > 0 {
        warn!("skipped {skipped} STL facets without exactly three vertices");
    }
    facets.into_mesh()
}

/// Parse STL data held in memory.
pub fn parse_stl(bytes: &[u8]) -> Result<TriMesh, LoadError> {
    if let Some(count) = binary_facet_count(bytes) {
        return parse_binary(bytes, count);
    }
    let text = std::str::from_utf8(bytes)
        .map_err(|_| LoadError::Stl("size does not match facet count".into()))?;
    parse_ascii(text)
}

pub fn load_stl<P: AsRef<Path>>(path: P) -> Result<TriMesh, LoadError> {
    let path = path.as_ref();
    let mesh = parse_stl(&std::fs::read(path)?)?;
    debug!("loaded {}: {} triangles", path.display(), mesh.triangle_count());
    Ok(mesh)
}

/// Write `mesh` as binary STL with normals computed from the winding.
pub fn write_stl<W: Write>(mesh: &TriMesh, mut writer: W) -> Result<(), LoadError> {
    writer.write_all(&[b' '; HEADER_LEN])?;
    writer.write_all(&(mesh.triangle_count() as u32).to_le_bytes())?;
    let v = mesh.vertices();
    for t in mesh.indices().chunks_exact(3) {
        let (a, b, c) = (v[t[0]], v[t[1]], v[t[2]]);
        let n = (b - a).cross(c - a).normalize();
        for p in [n, a, b, c] {
            for value in [p.x, p.y, p.z] {
                writer.write_all(&value.to_le_bytes())?;
            }
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }
    Ok(())
}

pub fn save_stl<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> Result<(), LoadError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_stl(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}
