//! Plain-text point lists (`x y z` per line) from range images.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use super::LoadError;
use crate::grid::PointBuffer;
use crate::math::Mat4;

/// Points closer to the camera plane than this are treated as "no hit".
const MIN_DEPTH: f32 = 1e-5;

/// Write every hit of the range image, transformed by `transform`.
///
/// Returns the number of points written.
pub fn write_xyz<W: Write>(
    points: &PointBuffer,
    mut writer: W,
    transform: &Mat4,
) -> Result<usize, LoadError> {
    let mut count = 0;
    for &p in points.as_slice() {
        if p.z < -MIN_DEPTH {
            let p = transform.transform_point(p);
            writeln!(writer, "{:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
            count += 1;
        }
    }
    Ok(count)
}

/// Save the range image as an XYZ point list.
pub fn save_xyz<P: AsRef<Path>>(
    points: &PointBuffer,
    path: P,
    transform: &Mat4,
) -> Result<(), LoadError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    let count = write_xyz(points, &mut writer, transform)?;
    writer.flush()?;
    debug!("wrote {count} points to {}", path.display());
    Ok(())
}
