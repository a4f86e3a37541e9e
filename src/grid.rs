//! Row-major 2D buffers shared by textures and frame buffers.

use std::ops::{Index, IndexMut};

use crate::colors::Color;
use crate::math::Vec3;

/// A `rows x cols` grid stored row-major, row 0 at the top.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

/// RGB image with float channels in `[0, 1]`.
pub type Image = Grid<Color>;

/// Per-pixel depth values.
pub type DepthBuffer = Grid<f32>;

/// Per-pixel camera-space positions (range image) or normals.
pub type PointBuffer = Grid<Vec3>;

impl<T: Clone> Grid<T> {
    pub fn new(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Reallocate to a new size, discarding the old contents.
    pub fn resize(&mut self, rows: usize, cols: usize, value: T) {
        self.data.clear();
        self.data.resize(rows * cols, value);
        self.data.shrink_to_fit();
        self.rows = rows;
        self.cols = cols;
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Grid<T> {
    /// Wrap row-major data. Returns `None` if the length does not match.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { data, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterate over rows, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[T]> {
        // chunks(0) panics; an empty grid simply yields nothing.
        self.data.chunks(self.cols.max(1))
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        debug_assert!(row < self.rows && col < self.cols);
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        debug_assert!(row < self.rows && col < self.cols);
        &mut self.data[row * self.cols + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_is_row_major() {
        let g = Grid::from_vec(2, 3, vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(g[(1, 0)], 3);
        assert_eq!(g[(0, 2)], 2);
        assert_eq!(g.get(2, 0), None);
        assert_eq!(g.rows_iter().count(), 2);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        assert!(Grid::from_vec(2, 2, vec![1, 2, 3]).is_none());
    }

    #[test]
    fn resize_discards_contents() {
        let mut g = Grid::new(2, 2, 7u8);
        g.resize(3, 1, 0);
        assert_eq!((g.rows(), g.cols()), (3, 1));
        assert_eq!(g.as_slice(), &[0, 0, 0]);
    }

    #[test]
    fn empty_grid_iterates_nothing() {
        let g: Grid<u8> = Grid::default();
        assert!(g.is_empty());
        assert_eq!(g.rows_iter().count(), 0);
    }
}
