//! Types shared by the cman server and client: the fixed-layout wire
//! protocol, the collectible-point bitmap, and the world map both sides
//! load from the same legend-encoded file.

pub mod map;
pub mod points;
pub mod protocol;

pub use map::{MapError, Tile, WorldMap};
pub use points::PointsBitmap;
pub use protocol::{
    ClientMessage, Direction, EndSummary, ErrorCode, ProtocolError, Role, ServerMessage,
    StateUpdate,
};

pub const DEFAULT_PORT: u16 = 1337;
pub const BUFFER_SIZE: usize = 1024;
pub const MAP_PATH: &str = "map.txt";

/// Lives the Cman starts each round with.
pub const MAX_ATTEMPTS: u8 = 3;

/// Grid position, row first. The derived ordering is row-major, which is the
/// order the points bitmap is laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// The neighbouring coordinate in `direction`, or `None` when it would
    /// leave the byte-addressable range.
    pub fn step(self, direction: Direction) -> Option<Coord> {
        let (row, col) = match direction {
            Direction::Up => (self.row.checked_sub(1)?, self.col),
            Direction::Left => (self.row, self.col.checked_sub(1)?),
            Direction::Down => (self.row.checked_add(1)?, self.col),
            Direction::Right => (self.row, self.col.checked_add(1)?),
        };
        Some(Coord { row, col })
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
