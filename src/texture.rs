use std::path::Path;

use image::RgbImage;

use crate::colors::{self, Color};
use crate::grid::Image;

/// Convert a decoded 8-bit image into a float [`Image`].
pub(crate) fn image_from_rgb8(img: &RgbImage) -> Image {
    let (width, height) = img.dimensions();
    let data = img.pixels().map(|p| colors::from_rgb8(p.0)).collect();
    // from_vec only fails on a length mismatch, which RgbImage rules out.
    Image::from_vec(height as usize, width as usize, data).unwrap_or_default()
}

/// A 2D texture for texture mapping, stored as float RGB.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Texture {
    image: Image,
}

impl Texture {
    pub fn new(image: Image) -> Self {
        Self { image }
    }

    /// Load a texture from an image file (PNG, JPG, PPM, ...).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        Ok(Self::new(image_from_rgb8(&image::open(path)?.to_rgb8())))
    }

    /// A texture without texels; materials treat it as "no texture".
    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn width(&self) -> usize {
        self.image.cols()
    }

    pub fn height(&self) -> usize {
        self.image.rows()
    }

    /// Sample the texture at UV coordinates using nearest-neighbor filtering.
    ///
    /// `u` selects the column and `v` the row, with row 0 at `v = 0`. Loaders
    /// flip V when the file format puts the origin at the bottom.
    ///
    /// # Wrapping
    /// Uses repeat/wrap mode via rem_euclid for UVs outside [0,1)
    ///
    /// Returns `None` for an empty texture.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> Option<Color> {
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
        let col = ((u * self.width() as f32) as usize).min(self.width().saturating_sub(1));
        let row = ((v * self.height() as f32) as usize).min(self.height().saturating_sub(1));

        self.image.get(row, col).copied()
    }
}
