use alloc::vec::Vec;

use crate::coord::Coord2;
use crate::error::{BasinError, BasinResult};
use crate::grid::Grid;
use crate::grid_trait::SpatialGrid;

pub type Elevation = i64;

/// Square S×S field of elevations. Read-only once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElevationGrid {
    grid: Grid<Elevation>,
}

impl ElevationGrid {
    /// Builds a grid from row-major elevations.
    pub fn from_vec(size: u32, cells: Vec<Elevation>) -> BasinResult<Self> {
        if size == 0 {
            return Err(BasinError::EmptyGrid);
        }
        Ok(Self {
            grid: Grid::from_vec(size, size, cells)?,
        })
    }

    pub fn from_rows<R: AsRef<[Elevation]>>(rows: &[R]) -> BasinResult<Self> {
        if rows.is_empty() {
            return Err(BasinError::EmptyGrid);
        }
        let size = u32::try_from(rows.len()).map_err(|_| BasinError::GridSizeMismatch {
            expected: u32::MAX as usize,
            got: rows.len(),
        })?;
        let mut cells = Vec::with_capacity(rows.len() * rows.len());
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != rows.len() {
                return Err(BasinError::NotSquare {
                    row,
                    expected: rows.len(),
                    got: values.len(),
                });
            }
            cells.extend_from_slice(values);
        }
        Self::from_vec(size, cells)
    }

    /// `f` receives `(row, col)`.
    pub fn from_fn(size: u32, mut f: impl FnMut(u32, u32) -> Elevation) -> BasinResult<Self> {
        if size == 0 {
            return Err(BasinError::EmptyGrid);
        }
        Ok(Self {
            grid: Grid::from_fn(size, size, |x, y| f(y as u32, x as u32)),
        })
    }

    /// Side length S.
    #[inline]
    pub const fn size(&self) -> u32 {
        self.grid.width()
    }

    /// Cell count S².
    #[inline]
    pub fn len(&self) -> usize {
        self.grid.cells().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn cells(&self) -> &[Elevation] {
        self.grid.cells()
    }

    pub fn elevation(&self, row: u32, col: u32) -> BasinResult<Elevation> {
        self.elevation_at(Coord2::from_row_col(row, col))
    }

    pub fn elevation_at(&self, coord: Coord2) -> BasinResult<Elevation> {
        let idx = self.index_of(coord)?;
        Ok(self.grid.cells()[idx])
    }

    /// Up to four in-bounds neighbors: up, down, left, right.
    pub fn neighbors(&self, row: u32, col: u32) -> BasinResult<Vec<Coord2>> {
        self.neighbors_of(Coord2::from_row_col(row, col))
    }

    pub fn neighbors_of(&self, coord: Coord2) -> BasinResult<Vec<Coord2>> {
        self.index_of(coord)?;
        Ok(self.grid.neighbors(coord))
    }

    pub fn index_of(&self, coord: Coord2) -> BasinResult<usize> {
        self.grid
            .coord_to_index(coord)
            .ok_or(BasinError::OutOfBounds {
                coord,
                size: self.size(),
            })
    }
}
