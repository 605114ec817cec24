#![no_std]

extern crate alloc;

pub mod basin;
pub mod config;
pub mod coord;
pub mod elevation;
pub mod error;
pub mod flow;
pub mod grid;
pub mod grid_trait;
pub mod neighborhood;
pub mod observer;
pub mod partition;

pub use basin::{aggregate, aggregate_with, label_basins, Basin, UpstreamIndex};
pub use config::{DrainageConfig, TiePolicy, Traversal};
pub use coord::Coord2;
pub use elevation::{Elevation, ElevationGrid};
pub use error::{BasinError, BasinResult};
pub use flow::{resolve, FlowDirection, FlowField};
pub use grid::Grid;
pub use grid_trait::SpatialGrid;
pub use neighborhood::Dir4;
pub use observer::{DrainageObserver, NoOpDrainageObserver};
pub use partition::{basin_sizes, sort_descending, DrainagePartition};
