use crate::coord::Coord2;
use crate::elevation::Elevation;

pub trait DrainageObserver {
    fn on_sink_found(&mut self, _sink: Coord2, _elevation: Elevation) {}
    fn on_tie_broken(&mut self, _coord: Coord2, _elevation: Elevation) {}
    fn on_basin_measured(&mut self, _sink: Coord2, _size: usize) {}
}

pub struct NoOpDrainageObserver;
impl DrainageObserver for NoOpDrainageObserver {}
