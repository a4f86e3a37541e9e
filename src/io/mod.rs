//! File formats: meshes in (OBJ, STL, X3D), images and point lists out.

mod obj;
mod ppm;
mod stl;
mod x3d;
mod xyz;

use std::path::Path;

pub use crate::error::LoadError;
pub use obj::load_obj;
pub use ppm::{load_ppm, save_ppm, write_ppm};
pub use stl::{load_stl, parse_stl, save_stl, write_stl};
pub use x3d::{load_x3d, parse_x3d};
pub use xyz::{save_xyz, write_xyz};

use crate::scene::SceneNode;

/// `-` and `--` name standard output.
pub(crate) fn is_stdout(path: &Path) -> bool {
    path == Path::new("-") || path == Path::new("--")
}

/// Load a model, choosing the format from the file extension.
///
/// STL files yield a group with a single mesh child, OBJ files one child per
/// material, X3D files their own transform hierarchy.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<SceneNode, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("stl") => Ok(SceneNode::group().with_child(SceneNode::mesh(load_stl(path)?))),
        Some("obj") => load_obj(path),
        Some("x3d") => load_x3d(path),
        _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    #[test]
    fn dispatch_on_extension() {
        let dir = std::env::temp_dir().join(format!("softraster-io-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cube.STL");
        save_stl(&primitives::cube(1.0).unwrap(), &path).unwrap();

        let node = load_mesh(&path).unwrap();
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].as_mesh().unwrap().triangle_count(), 12);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn x3d_hierarchy_is_loaded() {
        let dir = std::env::temp_dir().join(format!("softraster-x3d-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scene.x3d");
        std::fs::write(
            &path,
            r#"<X3D><Scene>
  <Transform translation="0 0 5">
    <Transform scale="2 2 2">
      <Shape><IndexedFaceSet coordIndex="0 1 2 3 -1">
        <Coordinate point="0 0 0, 1 0 0, 1 1 0, 0 1 0"/>
      </IndexedFaceSet></Shape>
    </Transform>
  </Transform>
</Scene></X3D>"#,
        )
        .unwrap();

        let node = load_mesh(&path).unwrap();
        let quad = node.children[0].children[0].children[0].as_mesh().unwrap();
        assert_eq!(quad.triangle_count(), 2);
        let b = node.bbox(&crate::math::Mat4::identity());
        assert_eq!(b.min, crate::math::Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(b.max, crate::math::Vec3::new(2.0, 2.0, 5.0));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            load_mesh("scene.wrl"),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn stdout_targets() {
        assert!(is_stdout(Path::new("-")));
        assert!(is_stdout(Path::new("--")));
        assert!(!is_stdout(Path::new("out.ppm")));
    }
}
