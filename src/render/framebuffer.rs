//! Frame buffers owned by the renderer.
//!
//! Four per-pixel buffers of the same size are kept side by side:
//! color, depth, camera-space position (the range image) and normal.
//!
//! # Depth Buffer
//!
//! Smaller values are closer. For perspective projections the stored value is
//! the distance along the view axis (`-z` in camera space); for orthographic
//! projections it is NDC z in `[-1, 1]`. Cleared pixels hold
//! [`FrameBuffer::CLEAR_DEPTH`], which is larger than any valid depth.

use crate::colors::{self, Color};
use crate::error::RenderError;
use crate::grid::{DepthBuffer, Image, PointBuffer};
use crate::math::Vec3;

pub struct FrameBuffer {
    color: Image,
    depth: DepthBuffer,
    points: PointBuffer,
    normals: PointBuffer,
    width: usize,
    height: usize,
}

impl FrameBuffer {
    pub const CLEAR_DEPTH: f32 = f32::INFINITY;

    /// Allocate cleared buffers. Both dimensions must be non-zero.
    pub fn new(width: usize, height: usize, background: Color) -> Result<Self, RenderError> {
        let mut fb = Self {
            color: Image::default(),
            depth: DepthBuffer::default(),
            points: PointBuffer::default(),
            normals: PointBuffer::default(),
            width: 0,
            height: 0,
        };
        fb.resize(width, height, background)?;
        Ok(fb)
    }

    /// Reallocate all buffers at a new size and clear them.
    ///
    /// On error the buffers keep their previous size and contents.
    pub fn resize(
        &mut self,
        width: usize,
        height: usize,
        background: Color,
    ) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize { width, height });
        }
        self.color.resize(height, width, background);
        self.depth.resize(height, width, Self::CLEAR_DEPTH);
        self.points.resize(height, width, Vec3::ZERO);
        self.normals.resize(height, width, colors::NEUTRAL_NORMAL);
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Reset every pixel: background color, far depth, zero position, +Z normal.
    pub fn clear(&mut self, background: Color) {
        self.color.fill(background);
        self.depth.fill(Self::CLEAR_DEPTH);
        self.points.fill(Vec3::ZERO);
        self.normals.fill(colors::NEUTRAL_NORMAL);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Depth test and write in one step.
    ///
    /// Returns `true` and stores `depth` if it is strictly closer than the
    /// stored value; the caller must then write the fragment.
    #[inline]
    pub fn test_and_set_depth(&mut self, row: usize, col: usize, depth: f32) -> bool {
        let stored = &mut self.depth[(row, col)];
        if depth < *stored {
            *stored = depth;
            true
        } else {
            false
        }
    }

    /// Store a fragment that passed the depth test.
    #[inline]
    pub fn write_fragment(
        &mut self,
        row: usize,
        col: usize,
        color: Color,
        position: Vec3,
        normal: Vec3,
    ) {
        self.color[(row, col)] = color;
        self.points[(row, col)] = position;
        self.normals[(row, col)] = normal;
    }

    /// Mark pixels whose depth lies beyond `far_depth` as "no intersection"
    /// in the range image.
    pub fn reset_far_points(&mut self, far_depth: f32) {
        for (point, &depth) in self
            .points
            .as_mut_slice()
            .iter_mut()
            .zip(self.depth.as_slice())
        {
            if depth > far_depth {
                *point = Vec3::ZERO;
            }
        }
    }

    pub fn color(&self) -> &Image {
        &self.color
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn points(&self) -> &PointBuffer {
        &self.points
    }

    pub fn normals(&self) -> &PointBuffer {
        &self.normals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(
            FrameBuffer::new(0, 10, colors::BLACK).err(),
            Some(RenderError::InvalidSize {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn failed_resize_keeps_buffers() {
        let mut fb = FrameBuffer::new(4, 3, colors::BLACK).unwrap();
        assert!(fb.resize(4, 0, colors::BLACK).is_err());
        assert_eq!((fb.width(), fb.height()), (4, 3));
        assert_eq!(fb.color().as_slice().len(), 12);
    }

    #[test]
    fn depth_test_is_strict() {
        let mut fb = FrameBuffer::new(2, 2, colors::BLACK).unwrap();
        assert!(fb.test_and_set_depth(1, 1, 5.0));
        assert!(!fb.test_and_set_depth(1, 1, 5.0));
        assert!(fb.test_and_set_depth(1, 1, 4.0));
        assert_eq!(fb.depth()[(1, 1)], 4.0);
    }

    #[test]
    fn clear_resets_all_buffers() {
        let mut fb = FrameBuffer::new(2, 1, colors::BLACK).unwrap();
        fb.test_and_set_depth(0, 0, 1.0);
        fb.write_fragment(0, 0, colors::WHITE, Vec3::ONE, Vec3::X);
        fb.clear(colors::WHITE);
        assert_eq!(fb.color()[(0, 0)], colors::WHITE);
        assert_eq!(fb.depth()[(0, 0)], FrameBuffer::CLEAR_DEPTH);
        assert_eq!(fb.points()[(0, 0)], Vec3::ZERO);
        assert_eq!(fb.normals()[(0, 0)], colors::NEUTRAL_NORMAL);
    }

    #[test]
    fn far_points_are_reset() {
        let mut fb = FrameBuffer::new(2, 1, colors::BLACK).unwrap();
        fb.test_and_set_depth(0, 0, 5.0);
        fb.write_fragment(0, 0, colors::WHITE, Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        fb.test_and_set_depth(0, 1, 50.0);
        fb.write_fragment(0, 1, colors::WHITE, Vec3::new(0.0, 0.0, -50.0), Vec3::Z);
        fb.reset_far_points(10.0);
        assert_eq!(fb.points()[(0, 0)], Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(fb.points()[(0, 1)], Vec3::ZERO);
    }
}
