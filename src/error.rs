use crate::coord::Coord2;

pub type BasinResult<T> = Result<T, BasinError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BasinError {
    #[error("coordinate {coord:?} is outside the {size}x{size} grid")]
    OutOfBounds { coord: Coord2, size: u32 },

    #[error("grid must have at least one cell")]
    EmptyGrid,

    #[error("grid size mismatch: expected {expected} cells, got {got}")]
    GridSizeMismatch { expected: usize, got: usize },

    #[error("row {row} has {got} cells, expected {expected}")]
    NotSquare { row: usize, expected: usize, got: usize },

    /// The lowest neighbor of a non-sink cell is not unique, or is level with the cell.
    #[error("ambiguous flow at {coord:?}: elevation {elevation}, lowest neighbor {lowest} is not unique")]
    AmbiguousFlow {
        coord: Coord2,
        elevation: i64,
        lowest: i64,
    },

    #[error("flow path through {coord:?} never reaches a sink")]
    CycleDetected { coord: Coord2 },

    #[error("basins cover {covered} of {total} cells")]
    IncompleteCoverage { covered: usize, total: usize },
}
