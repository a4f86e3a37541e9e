//! Error types.

use thiserror::Error;

/// Failures of the renderer façade. Rasterization itself never fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("no scene bound to the renderer")]
    NoScene,
    #[error("invalid frame size {width}x{height}")]
    InvalidSize { width: usize, height: usize },
}

/// A triangle mesh whose index arrays are inconsistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("index count {0} is not a multiple of 3")]
    IndexCount(usize),
    #[error("{name} index count {found} does not match position index count {expected}")]
    AttributeIndexCount {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{name} index {index} out of range for {len} elements")]
    IndexOutOfRange {
        name: &'static str,
        index: usize,
        len: usize,
    },
}

/// Failures while reading or writing meshes, images and point lists.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OBJ load error: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("malformed STL: {0}")]
    Stl(String),
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("malformed X3D: {0}")]
    X3d(String),
    #[error("malformed mesh: {0}")]
    Mesh(#[from] MeshError),
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
}
