use alloc::vec::Vec;

use crate::basin::{aggregate_with, label_basins, Basin};
use crate::config::DrainageConfig;
use crate::elevation::ElevationGrid;
use crate::error::BasinResult;
use crate::flow::FlowField;
use crate::grid::Grid;
use crate::observer::{DrainageObserver, NoOpDrainageObserver};

/// Sorts basin sizes largest first.
pub fn sort_descending(mut sizes: Vec<usize>) -> Vec<usize> {
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes
}

/// Basin sizes of `grid`, largest first.
pub fn basin_sizes(grid: &ElevationGrid) -> BasinResult<Vec<usize>> {
    Ok(DrainagePartition::compute(grid, &DrainageConfig::default())?.sorted_sizes())
}

/// Flow field and basins of one elevation grid.
#[derive(Clone, Debug)]
pub struct DrainagePartition {
    flow: FlowField,
    basins: Vec<Basin>,
}

impl DrainagePartition {
    pub fn compute(grid: &ElevationGrid, config: &DrainageConfig) -> BasinResult<Self> {
        Self::compute_with_observer(grid, config, &mut NoOpDrainageObserver)
    }

    pub fn compute_with_observer(
        grid: &ElevationGrid,
        config: &DrainageConfig,
        observer: &mut impl DrainageObserver,
    ) -> BasinResult<Self> {
        log::debug!(
            "partitioning {}x{} grid (parallel: {})",
            grid.size(),
            grid.size(),
            config.use_parallel()
        );
        let flow = FlowField::resolve_with(grid, config, observer)?;
        let basins = aggregate_with(&flow, config, observer)?;
        Ok(Self { flow, basins })
    }

    #[inline]
    pub fn flow(&self) -> &FlowField {
        &self.flow
    }

    /// One entry per sink, in row-major sink order.
    #[inline]
    pub fn basins(&self) -> &[Basin] {
        &self.basins
    }

    #[inline]
    pub fn basin_count(&self) -> usize {
        self.basins.len()
    }

    pub fn sorted_sizes(&self) -> Vec<usize> {
        sort_descending(self.basins.iter().map(|b| b.size).collect())
    }

    pub fn labels(&self) -> BasinResult<Grid<u32>> {
        label_basins(&self.flow)
    }
}
