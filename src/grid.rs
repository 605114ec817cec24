use alloc::vec::Vec;

use crate::coord::Coord2;
use crate::error::{BasinError, BasinResult};
use crate::grid_trait::SpatialGrid;
use crate::neighborhood::Dir4;

/// 2D rectangular grid backed by a flat row-major Vec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    cells: Vec<T>,
    width: u32,
    height: u32,
}

impl<T: Clone> Grid<T> {
    pub fn new_filled(width: u32, height: u32, fill: T) -> Self {
        let len = width as usize * height as usize;
        Self {
            cells: alloc::vec![fill; len],
            width,
            height,
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(i32, i32) -> T) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.push(f(x, y));
            }
        }
        Self {
            cells,
            width,
            height,
        }
    }

    pub fn from_vec(width: u32, height: u32, cells: Vec<T>) -> BasinResult<Self> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(BasinError::GridSizeMismatch {
                expected,
                got: cells.len(),
            });
        }
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    pub fn iter_coords(&self) -> impl Iterator<Item = (Coord2, &T)> {
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (Coord2::from_index(index, self.width), cell))
    }

    #[inline]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    #[inline]
    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }
}

impl<T: Clone> SpatialGrid for Grid<T> {
    type Cell = T;
    type Coord = Coord2;

    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    fn in_bounds(&self, coord: Self::Coord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && coord.x < self.width as i32
            && coord.y < self.height as i32
    }

    fn get(&self, coord: Self::Coord) -> Option<&Self::Cell> {
        self.coord_to_index(coord).and_then(|i| self.cells.get(i))
    }

    #[inline]
    fn index_to_coord(&self, index: usize) -> Self::Coord {
        Coord2::from_index(index, self.width)
    }

    fn coord_to_index(&self, coord: Self::Coord) -> Option<usize> {
        if !self.in_bounds(coord) {
            return None;
        }
        Some(coord.y as usize * self.width as usize + coord.x as usize)
    }

    fn neighbors(&self, coord: Self::Coord) -> Vec<Self::Coord> {
        let mut out = Vec::with_capacity(4);
        for dir in Dir4::ALL {
            let next = coord + dir.offset();
            if self.in_bounds(next) {
                out.push(next);
            }
        }
        out
    }
}
