use crate::coord::Coord2;

/// 4-directional movement (Von Neumann neighborhood). `Up` is row - 1.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Dir4 {
    Up,
    Down,
    Left,
    Right,
}

impl Dir4 {
    /// Neighbor scan order: up, down, left, right.
    pub const ALL: [Dir4; 4] = [Dir4::Up, Dir4::Down, Dir4::Left, Dir4::Right];

    /// Downhill preference when lowest neighbors tie: clockwise from up.
    pub const FLOW_ORDER: [Dir4; 4] = [Dir4::Up, Dir4::Right, Dir4::Down, Dir4::Left];

    #[inline]
    pub const fn offset(self) -> Coord2 {
        match self {
            Dir4::Up => Coord2::new(0, -1),
            Dir4::Down => Coord2::new(0, 1),
            Dir4::Left => Coord2::new(-1, 0),
            Dir4::Right => Coord2::new(1, 0),
        }
    }

    /// Position in `Dir4::ALL`.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Dir4::Up => 0,
            Dir4::Down => 1,
            Dir4::Left => 2,
            Dir4::Right => 3,
        }
    }
}
