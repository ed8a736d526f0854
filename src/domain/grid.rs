/// The 9×9 board and its pure transformations.
///
/// Every operation here returns a new `Grid`; the receiver is never
/// modified. The renderer may keep drawing the previous snapshot while
/// the next one is built.
///
/// ## Collapse
///
/// ```text
///   before          removed (x)       after
///   3 . .           3 . .             r . .    r = refilled (arrived)
///   5 . .           x . .             3 . .    3 moved down (arrived)
///   7 . .           7 . .             7 . .    7 stayed (not flagged)
/// ```

use std::ops::Index;

use super::position::{Position, GRID_SIZE};
use super::rng::ValueSource;
use super::tile::Tile;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    cells: [[Tile; GRID_SIZE]; GRID_SIZE],
}

impl Grid {
    /// Fresh board: every value drawn from `values`, row-major, no flags.
    pub fn generate(values: &mut dyn ValueSource) -> Self {
        let mut cells = [[Tile::default(); GRID_SIZE]; GRID_SIZE];
        for row in cells.iter_mut() {
            for cell in row.iter_mut() {
                *cell = Tile::new(values.next_value());
            }
        }
        Grid { cells }
    }

    /// Build from a value diagram (row 0 first).
    pub fn from_values(values: [[u8; GRID_SIZE]; GRID_SIZE]) -> Self {
        Grid { cells: values.map(|row| row.map(Tile::new)) }
    }

    #[inline]
    pub fn tile(&self, pos: Position) -> Tile {
        self.cells[pos.row][pos.col]
    }

    #[inline]
    pub fn value(&self, pos: Position) -> u8 {
        self.cells[pos.row][pos.col].value
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile; GRID_SIZE]> {
        self.cells.iter()
    }

    pub fn has_arrivals(&self) -> bool {
        self.cells.iter().flatten().any(|t| t.arrived)
    }

    /// Remove `removed`, let each column fall, and refill from the top.
    ///
    /// Columns are independent. Survivors keep their top-to-bottom order
    /// and pack against the bottom row. New values are drawn column by
    /// column, left to right, top row first.
    pub fn collapse(&self, removed: &[Position], values: &mut dyn ValueSource) -> Grid {
        let mut cells = self.cells;

        for col in 0..GRID_SIZE {
            let survivors: Vec<(usize, Tile)> = (0..GRID_SIZE)
                .filter(|&row| !removed.contains(&Position::new(row, col)))
                .map(|row| (row, self.cells[row][col]))
                .collect();
            let gap = GRID_SIZE - survivors.len();

            for row in 0..gap {
                cells[row][col] = Tile::new(values.next_value()).arriving();
            }
            for (i, (from_row, tile)) in survivors.into_iter().enumerate() {
                let row = gap + i;
                cells[row][col] = if from_row != row { tile.arriving() } else { tile.settled() };
            }
        }

        Grid { cells }
    }

    /// Same board with every arrival flag cleared.
    pub fn clear_animations(&self) -> Grid {
        Grid { cells: self.cells.map(|row| row.map(Tile::settled)) }
    }

    /// Same board with selection flags set exactly on `path`.
    pub fn with_path_flags(&self, path: &[Position]) -> Grid {
        let mut cells = self.cells;
        for pos in Position::all() {
            cells[pos.row][pos.col] = self.tile(pos).with_selection(path.contains(&pos));
        }
        Grid { cells }
    }
}

impl Index<Position> for Grid {
    type Output = Tile;

    fn index(&self, pos: Position) -> &Tile {
        &self.cells[pos.row][pos.col]
    }
}
