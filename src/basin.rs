use alloc::collections::VecDeque;
use alloc::vec::Vec;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{DrainageConfig, Traversal};
use crate::coord::Coord2;
use crate::error::{BasinError, BasinResult};
use crate::flow::FlowField;
use crate::grid::Grid;
use crate::grid_trait::SpatialGrid;
use crate::observer::{DrainageObserver, NoOpDrainageObserver};

const UNLABELLED: u32 = u32::MAX;

/// A sink and the number of cells draining into it, the sink included.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Basin {
    pub sink: Coord2,
    pub size: usize,
}

/// Reverse flow adjacency. The cells draining directly into `i` are
/// `sources[offsets[i]..offsets[i + 1]]`.
#[derive(Clone, Debug)]
pub struct UpstreamIndex {
    offsets: Vec<usize>,
    sources: Vec<usize>,
}

impl UpstreamIndex {
    pub fn build(field: &FlowField) -> Self {
        let len = field.len();
        let mut offsets = alloc::vec![0usize; len + 1];
        for idx in 0..len {
            if let Some(target) = field.target_index(idx) {
                offsets[target + 1] += 1;
            }
        }
        for i in 0..len {
            offsets[i + 1] += offsets[i];
        }

        let mut cursor = offsets.clone();
        let mut sources = alloc::vec![0usize; offsets[len]];
        for idx in 0..len {
            if let Some(target) = field.target_index(idx) {
                sources[cursor[target]] = idx;
                cursor[target] += 1;
            }
        }

        Self { offsets, sources }
    }

    #[inline]
    pub fn upstream(&self, idx: usize) -> &[usize] {
        match (self.offsets.get(idx), self.offsets.get(idx + 1)) {
            (Some(&start), Some(&end)) => &self.sources[start..end],
            _ => &[],
        }
    }
}

/// Basin size per sink, in sink order, with the default configuration.
pub fn aggregate(field: &FlowField) -> BasinResult<Vec<usize>> {
    let basins = aggregate_with(field, &DrainageConfig::default(), &mut NoOpDrainageObserver)?;
    Ok(basins.into_iter().map(|b| b.size).collect())
}

pub fn aggregate_with(
    field: &FlowField,
    config: &DrainageConfig,
    observer: &mut impl DrainageObserver,
) -> BasinResult<Vec<Basin>> {
    let upstream = UpstreamIndex::build(field);
    let sizes = measure_all(&upstream, field.sinks(), config);

    let mut basins = Vec::with_capacity(sizes.len());
    for (sink, size) in field.sink_coords().zip(sizes) {
        log::trace!("basin at {:?}: {} cells", sink, size);
        observer.on_basin_measured(sink, size);
        basins.push(Basin { sink, size });
    }

    if config.verify {
        let covered: usize = basins.iter().map(|b| b.size).sum();
        if covered != field.len() {
            return Err(BasinError::IncompleteCoverage {
                covered,
                total: field.len(),
            });
        }
    }

    log::debug!("measured {} basins over {} cells", basins.len(), field.len());
    Ok(basins)
}

/// Counts every cell whose flow path ends at `sink`.
fn measure(upstream: &UpstreamIndex, sink: usize, traversal: Traversal) -> usize {
    let mut count = 0usize;
    match traversal {
        Traversal::DepthFirst => {
            let mut stack = alloc::vec![sink];
            while let Some(idx) = stack.pop() {
                count += 1;
                stack.extend_from_slice(upstream.upstream(idx));
            }
        }
        Traversal::BreadthFirst => {
            let mut queue = VecDeque::new();
            queue.push_back(sink);
            while let Some(idx) = queue.pop_front() {
                count += 1;
                queue.extend(upstream.upstream(idx).iter().copied());
            }
        }
    }
    count
}

#[cfg(feature = "parallel")]
fn measure_all(upstream: &UpstreamIndex, sinks: &[usize], config: &DrainageConfig) -> Vec<usize> {
    if config.use_parallel() {
        sinks
            .par_iter()
            .map(|&sink| measure(upstream, sink, config.traversal))
            .collect()
    } else {
        sinks
            .iter()
            .map(|&sink| measure(upstream, sink, config.traversal))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn measure_all(upstream: &UpstreamIndex, sinks: &[usize], config: &DrainageConfig) -> Vec<usize> {
    sinks
        .iter()
        .map(|&sink| measure(upstream, sink, config.traversal))
        .collect()
}

/// Labels every cell with the position of its sink in `field.sinks()`.
pub fn label_basins(field: &FlowField) -> BasinResult<Grid<u32>> {
    let size = field.size();
    let upstream = UpstreamIndex::build(field);
    let mut labels = Grid::new_filled(size, size, UNLABELLED);

    for (label, &sink) in field.sinks().iter().enumerate() {
        let label = label as u32;
        let mut stack = alloc::vec![sink];
        while let Some(idx) = stack.pop() {
            if labels.cells()[idx] != UNLABELLED {
                return Err(BasinError::CycleDetected {
                    coord: labels.index_to_coord(idx),
                });
            }
            labels.cells_mut()[idx] = label;
            stack.extend_from_slice(upstream.upstream(idx));
        }
    }

    if let Some(idx) = labels.cells().iter().position(|&l| l == UNLABELLED) {
        return Err(BasinError::CycleDetected {
            coord: labels.index_to_coord(idx),
        });
    }
    Ok(labels)
}
