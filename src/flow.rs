use alloc::vec::Vec;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{DrainageConfig, TiePolicy};
use crate::coord::Coord2;
use crate::elevation::{Elevation, ElevationGrid};
use crate::error::{BasinError, BasinResult};
use crate::neighborhood::Dir4;
use crate::observer::{DrainageObserver, NoOpDrainageObserver};

/// Where a cell's water goes. `Sink` cells keep it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FlowDirection {
    #[default]
    Sink,
    Up,
    Down,
    Left,
    Right,
}

impl FlowDirection {
    #[inline]
    pub const fn dir(self) -> Option<Dir4> {
        match self {
            FlowDirection::Sink => None,
            FlowDirection::Up => Some(Dir4::Up),
            FlowDirection::Down => Some(Dir4::Down),
            FlowDirection::Left => Some(Dir4::Left),
            FlowDirection::Right => Some(Dir4::Right),
        }
    }

    #[inline]
    pub const fn is_sink(self) -> bool {
        matches!(self, FlowDirection::Sink)
    }
}

impl From<Dir4> for FlowDirection {
    fn from(dir: Dir4) -> Self {
        match dir {
            Dir4::Up => FlowDirection::Up,
            Dir4::Down => FlowDirection::Down,
            Dir4::Left => FlowDirection::Left,
            Dir4::Right => FlowDirection::Right,
        }
    }
}

/// Outcome of the single min-scan over a cell and its neighbors.
#[derive(Copy, Clone, Debug)]
struct CellScan {
    lowest: Elevation,
    /// First neighbor in `Dir4::FLOW_ORDER` holding `lowest`, if it is below
    /// the cell.
    first: Option<Dir4>,
    /// Further neighbors at `lowest`, as `1 << Dir4::index()` bits.
    tied: u8,
    /// No neighbor is lower, but one is level with the cell.
    level: bool,
}

fn scan_cell(grid: &ElevationGrid, idx: usize) -> CellScan {
    let cells = grid.cells();
    let size = grid.size() as i32;
    let coord = Coord2::from_index(idx, grid.size());

    // The cell itself is the first candidate; only a strictly lower
    // neighbor can displace it.
    let mut scan = CellScan {
        lowest: cells[idx],
        first: None,
        tied: 0,
        level: false,
    };
    for dir in Dir4::FLOW_ORDER {
        let n = coord + dir.offset();
        if n.x < 0 || n.y < 0 || n.x >= size || n.y >= size {
            continue;
        }
        let e = cells[n.y as usize * size as usize + n.x as usize];
        if e < scan.lowest {
            scan = CellScan {
                lowest: e,
                first: Some(dir),
                tied: 0,
                level: false,
            };
        } else if e == scan.lowest {
            match scan.first {
                Some(_) => scan.tied |= 1 << dir.index(),
                None => scan.level = true,
            }
        }
    }
    scan
}

/// Per-cell flow directions of an elevation grid, plus its sinks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowField {
    directions: Vec<FlowDirection>,
    sinks: Vec<usize>,
    size: u32,
}

/// Resolves flow directions with the default (strict) configuration.
pub fn resolve(grid: &ElevationGrid) -> BasinResult<FlowField> {
    FlowField::resolve_with(grid, &DrainageConfig::default(), &mut NoOpDrainageObserver)
}

impl FlowField {
    pub fn resolve_with(
        grid: &ElevationGrid,
        config: &DrainageConfig,
        observer: &mut impl DrainageObserver,
    ) -> BasinResult<Self> {
        let scans = scan_all(grid, config);
        let size = grid.size();
        let mut directions = Vec::with_capacity(scans.len());
        let mut sinks = Vec::new();
        let mut pending = Vec::new();

        for (idx, scan) in scans.into_iter().enumerate() {
            let here = grid.cells()[idx];
            let coord = Coord2::from_index(idx, size);
            if scan.level || scan.tied != 0 {
                match config.tie_policy {
                    TiePolicy::Reject if scan.level => {
                        return Err(BasinError::AmbiguousFlow {
                            coord,
                            elevation: here,
                            lowest: scan.lowest,
                        });
                    }
                    // Checked once every cell has a direction.
                    TiePolicy::Reject => pending.push((idx, scan)),
                    TiePolicy::FirstInOrder => {
                        log::warn!(
                            "breaking flow tie at {:?} (elevation {}, lowest {})",
                            coord,
                            here,
                            scan.lowest
                        );
                        observer.on_tie_broken(coord, here);
                    }
                }
            }
            match scan.first {
                Some(dir) => directions.push(FlowDirection::from(dir)),
                None => {
                    directions.push(FlowDirection::Sink);
                    sinks.push(idx);
                    observer.on_sink_found(coord, here);
                }
            }
        }

        let field = Self {
            directions,
            sinks,
            size,
        };
        if !pending.is_empty() {
            let drains_to = field.sink_indices()?;
            for (idx, scan) in pending {
                field.check_tie(idx, scan, grid.cells()[idx], &drains_to)?;
            }
        }

        log::debug!(
            "resolved flow for {}x{} grid: {} sinks",
            size,
            size,
            field.sinks.len()
        );
        Ok(field)
    }

    /// A tie between lowest neighbors is harmless when they all drain into
    /// the same sink: the partition is the same whichever one is taken.
    fn check_tie(
        &self,
        idx: usize,
        scan: CellScan,
        elevation: Elevation,
        drains_to: &[usize],
    ) -> BasinResult<()> {
        let coord = Coord2::from_index(idx, self.size);
        let ambiguous = BasinError::AmbiguousFlow {
            coord,
            elevation,
            lowest: scan.lowest,
        };
        let sink_past = |dir: Dir4| {
            (coord + dir.offset())
                .to_index(self.size)
                .and_then(|n| drains_to.get(n).copied())
        };
        let Some(expected) = scan.first.and_then(sink_past) else {
            return Err(ambiguous);
        };
        for dir in Dir4::ALL {
            if scan.tied & (1 << dir.index()) == 0 {
                continue;
            }
            if sink_past(dir) != Some(expected) {
                return Err(ambiguous);
            }
        }
        log::debug!(
            "tie at {:?} drains to a single sink {:?}",
            coord,
            Coord2::from_index(expected, self.size)
        );
        Ok(())
    }

    /// Index of the sink every cell drains into. Each cell is walked once:
    /// a path stops at the first cell whose sink is already known.
    pub fn sink_indices(&self) -> BasinResult<Vec<usize>> {
        const UNKNOWN: usize = usize::MAX;
        let len = self.len();
        let mut drains_to = alloc::vec![UNKNOWN; len];
        let mut path = Vec::new();

        for start in 0..len {
            let mut idx = start;
            while drains_to[idx] == UNKNOWN {
                path.push(idx);
                if path.len() > len {
                    return Err(BasinError::CycleDetected {
                        coord: Coord2::from_index(start, self.size),
                    });
                }
                match self.target_index(idx) {
                    Some(next) => idx = next,
                    None => drains_to[idx] = idx,
                }
            }
            let sink = drains_to[idx];
            for &cell in &path {
                drains_to[cell] = sink;
            }
            path.clear();
        }
        Ok(drains_to)
    }

    /// Builds a field from a precomputed row-major direction table.
    /// Directions that leave the grid are rejected.
    pub fn from_directions(size: u32, directions: Vec<FlowDirection>) -> BasinResult<Self> {
        if size == 0 {
            return Err(BasinError::EmptyGrid);
        }
        let expected = size as usize * size as usize;
        if directions.len() != expected {
            return Err(BasinError::GridSizeMismatch {
                expected,
                got: directions.len(),
            });
        }
        let mut sinks = Vec::new();
        for (idx, direction) in directions.iter().enumerate() {
            match direction.dir() {
                None => sinks.push(idx),
                Some(dir) => {
                    let next = Coord2::from_index(idx, size) + dir.offset();
                    if !in_square(next, size) {
                        return Err(BasinError::OutOfBounds { coord: next, size });
                    }
                }
            }
        }
        Ok(Self {
            directions,
            sinks,
            size,
        })
    }

    #[inline]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    #[inline]
    pub fn directions(&self) -> &[FlowDirection] {
        &self.directions
    }

    /// Flattened indices of the sink cells, in row-major order.
    #[inline]
    pub fn sinks(&self) -> &[usize] {
        &self.sinks
    }

    pub fn sink_coords(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.sinks
            .iter()
            .map(move |&idx| Coord2::from_index(idx, self.size))
    }

    pub fn direction_at(&self, coord: Coord2) -> BasinResult<FlowDirection> {
        let idx = self.index_of(coord)?;
        Ok(self.directions[idx])
    }

    pub fn is_sink(&self, coord: Coord2) -> BasinResult<bool> {
        Ok(self.direction_at(coord)?.is_sink())
    }

    /// Index of the cell `idx` drains into, `None` for sinks.
    #[inline]
    pub fn target_index(&self, idx: usize) -> Option<usize> {
        let dir = self.directions.get(idx)?.dir()?;
        let next = Coord2::from_index(idx, self.size) + dir.offset();
        next.to_index(self.size)
    }

    pub fn target_of(&self, coord: Coord2) -> BasinResult<Option<Coord2>> {
        let idx = self.index_of(coord)?;
        Ok(self
            .target_index(idx)
            .map(|next| Coord2::from_index(next, self.size)))
    }

    /// Downhill path from `start` to its sink, both ends included.
    pub fn trace_path(&self, start: Coord2) -> BasinResult<Vec<Coord2>> {
        let mut idx = self.index_of(start)?;
        let mut path = Vec::new();
        path.push(start);

        // A path longer than the cell count has revisited a cell.
        for _ in 0..self.len() {
            match self.target_index(idx) {
                Some(next) => {
                    idx = next;
                    path.push(Coord2::from_index(idx, self.size));
                }
                None => return Ok(path),
            }
        }
        Err(BasinError::CycleDetected { coord: start })
    }

    pub fn sink_of(&self, coord: Coord2) -> BasinResult<Coord2> {
        let path = self.trace_path(coord)?;
        Ok(path.last().copied().unwrap_or(coord))
    }

    fn index_of(&self, coord: Coord2) -> BasinResult<usize> {
        if !in_square(coord, self.size) {
            return Err(BasinError::OutOfBounds {
                coord,
                size: self.size,
            });
        }
        Ok(coord.y as usize * self.size as usize + coord.x as usize)
    }
}

#[inline]
fn in_square(coord: Coord2, size: u32) -> bool {
    coord.x >= 0 && coord.y >= 0 && coord.x < size as i32 && coord.y < size as i32
}

#[cfg(feature = "parallel")]
fn scan_all(grid: &ElevationGrid, config: &DrainageConfig) -> Vec<CellScan> {
    if config.use_parallel() {
        (0..grid.len())
            .into_par_iter()
            .map(|idx| scan_cell(grid, idx))
            .collect()
    } else {
        (0..grid.len()).map(|idx| scan_cell(grid, idx)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn scan_all(grid: &ElevationGrid, _config: &DrainageConfig) -> Vec<CellScan> {
    (0..grid.len()).map(|idx| scan_cell(grid, idx)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[i64]]) -> ElevationGrid {
        ElevationGrid::from_rows(rows).unwrap()
    }

    #[test]
    fn single_cell_is_sink() {
        let g = ElevationGrid::from_vec(1, alloc::vec![7]).unwrap();
        let f = resolve(&g).unwrap();
        assert_eq!(f.directions(), &[FlowDirection::Sink]);
        assert_eq!(f.sinks(), &[0]);
    }

    #[test]
    fn flows_to_lowest_neighbor() {
        let g = grid(&[&[5, 1, 6], &[3, 4, 8], &[9, 2, 7]]);
        let f = resolve(&g).unwrap();
        // centre 4: up 1, down 2, left 3, right 8
        assert_eq!(f.direction_at(Coord2::new(1, 1)), Ok(FlowDirection::Up));
        assert_eq!(f.direction_at(Coord2::new(0, 0)), Ok(FlowDirection::Right));
        assert_eq!(f.direction_at(Coord2::new(2, 2)), Ok(FlowDirection::Left));
        assert_eq!(
            f.sink_coords().collect::<Vec<_>>(),
            alloc::vec![Coord2::new(1, 0), Coord2::new(0, 1), Coord2::new(1, 2)]
        );
    }

    #[test]
    fn edge_cells_ignore_missing_neighbors() {
        // Corner 0 is lower than both existing neighbors.
        let g = grid(&[&[0, 5], &[6, 9]]);
        let f = resolve(&g).unwrap();
        assert_eq!(f.sinks(), &[0]);
        assert_eq!(f.target_of(Coord2::new(1, 1)), Ok(Some(Coord2::new(1, 0))));
    }

    #[test]
    fn tied_lowest_neighbors_are_rejected() {
        // (0,0) drains equally to two different sinks.
        let g = grid(&[&[9, 1, 8], &[1, 5, 7], &[6, 4, 3]]);
        let err = resolve(&g).unwrap_err();
        assert_eq!(
            err,
            BasinError::AmbiguousFlow {
                coord: Coord2::new(0, 0),
                elevation: 9,
                lowest: 1
            }
        );
    }

    #[test]
    fn tie_into_one_sink_is_accepted() {
        let g = grid(&[&[0, 1], &[1, 2]]);
        let f = resolve(&g).unwrap();
        assert_eq!(f.sinks(), &[0]);
        assert_eq!(f.direction_at(Coord2::new(1, 1)), Ok(FlowDirection::Up));
    }

    #[test]
    fn level_with_neighbor_is_rejected() {
        let g = grid(&[&[3, 3], &[8, 9]]);
        assert!(matches!(
            resolve(&g),
            Err(BasinError::AmbiguousFlow { lowest: 3, .. })
        ));
    }

    #[test]
    fn first_in_order_breaks_ties() {
        struct Ties(usize);
        impl DrainageObserver for Ties {
            fn on_tie_broken(&mut self, _coord: Coord2, _elevation: Elevation) {
                self.0 += 1;
            }
        }

        let g = grid(&[&[3, 3], &[1, 9]]);
        let cfg = DrainageConfig::default().with_tie_policy(TiePolicy::FirstInOrder);
        let mut ties = Ties(0);
        let f = FlowField::resolve_with(&g, &cfg, &mut ties).unwrap();
        // (0,0): down 1 wins outright; (1,0): level with left 3, down 9 -> sink
        assert_eq!(f.direction_at(Coord2::new(0, 0)), Ok(FlowDirection::Down));
        assert_eq!(f.direction_at(Coord2::new(1, 0)), Ok(FlowDirection::Sink));
        assert_eq!(ties.0, 1);
    }

    #[test]
    fn first_in_order_prefers_up_right_down_left() {
        // (1,1) ties right/down at 1, (2,2) ties up/left at 1.
        let g = grid(&[&[9, 8, 9], &[7, 5, 1], &[6, 1, 9]]);
        let cfg = DrainageConfig::default().with_tie_policy(TiePolicy::FirstInOrder);
        let f = FlowField::resolve_with(&g, &cfg, &mut NoOpDrainageObserver).unwrap();
        assert_eq!(f.direction_at(Coord2::new(1, 1)), Ok(FlowDirection::Right));
        assert_eq!(f.direction_at(Coord2::new(2, 2)), Ok(FlowDirection::Up));
        assert_eq!(
            f.sink_coords().collect::<Vec<_>>(),
            alloc::vec![Coord2::new(2, 1), Coord2::new(1, 2)]
        );
    }

    #[test]
    fn sink_indices_match_traced_paths() {
        let g = grid(&[&[5, 1, 6], &[3, 4, 8], &[9, 2, 7]]);
        let f = resolve(&g).unwrap();
        let drains_to = f.sink_indices().unwrap();
        for (idx, &sink) in drains_to.iter().enumerate() {
            let coord = Coord2::from_index(idx, 3);
            assert_eq!(f.sink_of(coord), Ok(Coord2::from_index(sink, 3)));
        }
    }

    #[test]
    fn sink_indices_detect_cycle() {
        use FlowDirection::*;
        let f = FlowField::from_directions(2, alloc::vec![Right, Down, Up, Left]).unwrap();
        assert_eq!(
            f.sink_indices(),
            Err(BasinError::CycleDetected {
                coord: Coord2::ZERO
            })
        );
    }

    #[test]
    fn many_harmless_ties_resolve() {
        // Every interior cell ties up/left, all draining to the corner.
        let g = ElevationGrid::from_fn(64, |row, col| i64::from(row + col)).unwrap();
        let f = resolve(&g).unwrap();
        assert_eq!(f.sinks(), &[0]);
        assert!(f.sink_indices().unwrap().iter().all(|&s| s == 0));
    }

    #[test]
    fn trace_path_reaches_sink() {
        let g = grid(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 9]]);
        let f = resolve(&g).unwrap();
        let path = f.trace_path(Coord2::new(2, 2)).unwrap();
        assert_eq!(path.first().copied(), Some(Coord2::new(2, 2)));
        assert_eq!(path.last().copied(), Some(Coord2::ZERO));
        assert_eq!(path.len(), 5);
        assert_eq!(f.sink_of(Coord2::new(2, 0)), Ok(Coord2::ZERO));
    }

    #[test]
    fn trace_path_detects_cycle() {
        use FlowDirection::*;
        let f = FlowField::from_directions(2, alloc::vec![Right, Down, Up, Left]).unwrap();
        assert!(f.sinks().is_empty());
        assert_eq!(
            f.trace_path(Coord2::ZERO),
            Err(BasinError::CycleDetected {
                coord: Coord2::ZERO
            })
        );
    }

    #[test]
    fn from_directions_rejects_off_grid_flow() {
        use FlowDirection::*;
        assert_eq!(
            FlowField::from_directions(2, alloc::vec![Up, Sink, Sink, Sink]),
            Err(BasinError::OutOfBounds {
                coord: Coord2::new(0, -1),
                size: 2
            })
        );
        assert!(FlowField::from_directions(2, alloc::vec![Sink]).is_err());
    }

    #[test]
    fn out_of_bounds_queries_fail() {
        let g = grid(&[&[1, 2], &[3, 4]]);
        let f = resolve(&g).unwrap();
        assert!(f.direction_at(Coord2::new(2, 0)).is_err());
        assert!(f.trace_path(Coord2::new(0, -1)).is_err());
    }
}
