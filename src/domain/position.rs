/// Grid coordinates and the adjacency rule.
///
/// Positions are 0-indexed `(row, col)` pairs. Row 0 is the top of the
/// board; gravity pulls tiles toward row `GRID_SIZE - 1`.

/// Board edge length. The board is always square.
pub const GRID_SIZE: usize = 9;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Every position on the board, row-major.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Position { row, col }))
    }

    /// Step by `(dr, dc)`, staying on the board. Off-board moves return None.
    pub fn offset(self, dr: i32, dc: i32) -> Option<Position> {
        let row = self.row as i32 + dr;
        let col = self.col as i32 + dc;
        let range = 0..GRID_SIZE as i32;
        if range.contains(&row) && range.contains(&col) {
            Some(Position::new(row as usize, col as usize))
        } else {
            None
        }
    }
}

/// King-move neighbourhood: at most one step along each axis, never the
/// same cell.
pub fn adjacent(a: Position, b: Position) -> bool {
    a.row.abs_diff(b.row) <= 1 && a.col.abs_diff(b.col) <= 1 && a != b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_and_orthogonal_neighbours() {
        let c = Position::new(4, 4);
        for (dr, dc) in [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)] {
            let n = c.offset(dr, dc).unwrap();
            assert!(adjacent(c, n), "{n:?} should neighbour {c:?}");
        }
    }

    #[test]
    fn two_steps_away_is_not_adjacent() {
        let c = Position::new(4, 4);
        assert!(!adjacent(c, Position::new(6, 4)));
        assert!(!adjacent(c, Position::new(4, 2)));
        assert!(!adjacent(c, Position::new(2, 6)));
        assert!(!adjacent(Position::new(0, 0), Position::new(5, 5)));
    }

    #[test]
    fn adjacency_is_symmetric_and_irreflexive() {
        for a in Position::all() {
            assert!(!adjacent(a, a));
            for b in Position::all() {
                assert_eq!(adjacent(a, b), adjacent(b, a));
            }
        }
    }

    #[test]
    fn offset_stays_on_board() {
        assert_eq!(Position::new(0, 0).offset(-1, 0), None);
        assert_eq!(Position::new(8, 8).offset(0, 1), None);
        assert_eq!(Position::new(3, 3).offset(1, -1), Some(Position::new(4, 2)));
    }

    #[test]
    fn all_covers_the_board() {
        assert_eq!(Position::all().count(), GRID_SIZE * GRID_SIZE);
    }
}
