use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// A fixed-size 2D grid.
///
/// Cells are stored in a flat vector in row-major order, so the cell at
/// `(col, row)` lives at index `row * width + col`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn filled(width: usize, height: usize, value: T) -> Self
    where
        T: Clone,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        Grid {
            width,
            height,
            cells: vec![value; size],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts a coordinate to a flat vector index, or `None` if out of bounds.
    #[inline]
    pub fn index_of(&self, at: Coordinate) -> Option<usize> {
        if self.contains(at) {
            Some(at.row * self.width + at.col)
        } else {
            None
        }
    }

    /// Checks if the coordinate lies within `[0, width) x [0, height)`.
    #[inline]
    pub fn contains(&self, at: Coordinate) -> bool {
        at.col < self.width && at.row < self.height
    }

    /// Checks if the coordinate is on the outermost ring of the grid.
    #[inline]
    pub fn is_border(&self, at: Coordinate) -> bool {
        self.contains(at)
            && (at.col == 0 || at.row == 0 || at.col + 1 == self.width || at.row + 1 == self.height)
    }

    pub fn get(&self, at: Coordinate) -> Option<&T> {
        let index = self.index_of(at)?;
        self.cells.get(index)
    }

    /// Returns an iterator over the cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// Returns an iterator that yields `(Coordinate, &T)` for each cell.
    pub fn enumerate(&self) -> impl Iterator<Item = (Coordinate, &T)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            (
                Coordinate {
                    col: index % width,
                    row: index / width,
                },
                cell,
            )
        })
    }
}

impl<T> Index<Coordinate> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, at: Coordinate) -> &Self::Output {
        match self.index_of(at) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                at.col, at.row, self.width, self.height
            ),
        }
    }
}

impl<T> IndexMut<Coordinate> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, at: Coordinate) -> &mut Self::Output {
        let (width, height) = (self.width, self.height);
        match self.index_of(at) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                at.col, at.row, width, height
            ),
        }
    }
}
