//! Binary PPM (P6) images.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder, ImageFormat};

use super::{is_stdout, LoadError};
use crate::colors;
use crate::grid::Image;
use crate::texture::image_from_rgb8;

/// Encode `image` as 8-bit binary PPM, clamping channels to `[0, 1]`.
pub fn write_ppm<W: Write>(image: &Image, writer: W) -> Result<(), LoadError> {
    let bytes: Vec<u8> = image
        .as_slice()
        .iter()
        .flat_map(|&c| colors::to_rgb8(c))
        .collect();
    PnmEncoder::new(writer)
        .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
        .write_image(
            &bytes,
            image.cols() as u32,
            image.rows() as u32,
            ExtendedColorType::Rgb8,
        )?;
    Ok(())
}

/// Save `image` as a PPM file; `-` or `--` writes to stdout.
pub fn save_ppm<P: AsRef<Path>>(image: &Image, path: P) -> Result<(), LoadError> {
    let path = path.as_ref();
    if is_stdout(path) {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        write_ppm(image, &mut lock)?;
        lock.flush()?;
        return Ok(());
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_ppm(image, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Read a PPM file into a float image.
pub fn load_ppm<P: AsRef<Path>>(path: P) -> Result<Image, LoadError> {
    let reader = BufReader::new(File::open(path)?);
    let decoded = image::load(reader, ImageFormat::Pnm)?;
    Ok(image_from_rgb8(&decoded.to_rgb8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn header_and_payload() {
        let mut image = Image::new(2, 3, colors::BLACK);
        image[(0, 0)] = Vec3::new(1.0, 0.0, 0.0);
        image[(1, 2)] = Vec3::new(2.0, -1.0, 0.5);

        let mut out = Vec::new();
        write_ppm(&image, &mut out).unwrap();

        let (header, pixels) = out.split_at(out.len() - 2 * 3 * 3);
        let header = String::from_utf8_lossy(header);
        let tokens: Vec<&str> = header.split_whitespace().collect();
        assert_eq!(tokens, ["P6", "3", "2", "255"]);
        assert_eq!(&pixels[..3], &[255, 0, 0]);
        // Out of range values are clamped.
        assert_eq!(&pixels[15..], &[255, 0, 127]);
    }

    #[test]
    fn file_round_trip() {
        let dir = std::env::temp_dir().join(format!("softraster-ppm-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("img.ppm");

        let mut image = Image::new(4, 5, colors::WHITE);
        image[(3, 4)] = Vec3::new(0.0, 1.0, 0.0);
        save_ppm(&image, &path).unwrap();

        let loaded = load_ppm(&path).unwrap();
        assert_eq!((loaded.rows(), loaded.cols()), (4, 5));
        assert_eq!(loaded[(3, 4)], Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(loaded[(0, 0)], colors::WHITE);
        std::fs::remove_dir_all(&dir).ok();
    }
}
