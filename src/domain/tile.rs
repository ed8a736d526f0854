/// Tile contents.
/// A tile is a plain value; the engine replaces tiles rather than editing
/// them, so every flag here describes the tile at one grid snapshot.

pub const MIN_VALUE: u8 = 1;
pub const MAX_VALUE: u8 = 9;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tile {
    pub value: u8,
    pub selected: bool,
    pub in_path: bool,
    /// Dropped or refilled by the last collapse; cleared after the arrival
    /// animation.
    pub arrived: bool,
}

impl Tile {
    pub const fn new(value: u8) -> Self {
        Tile { value, selected: false, in_path: false, arrived: false }
    }

    /// A tile that just fell into place.
    pub fn arriving(self) -> Self {
        Tile { arrived: true, ..self }
    }

    pub fn settled(self) -> Self {
        Tile { arrived: false, ..self }
    }

    pub fn with_selection(self, on_path: bool) -> Self {
        Tile { selected: on_path, in_path: on_path, ..self }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::new(MIN_VALUE)
    }
}
