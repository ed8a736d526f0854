/// GameState: the engine's complete snapshot of one game.
///
/// Grid, path and the cached validation always agree: every constructor
/// and `with_path` recompute flags and validity together, so no caller
/// can observe a path whose cached mode belongs to an older path.

use crate::domain::grid::Grid;
use crate::domain::position::Position;
use crate::domain::rng::ValueSource;
use crate::domain::rules::{self, Mode, Validation};

/// Selection phase derived from the path length.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SelectionPhase {
    Empty,
    Building,
    Sequencing,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GameState {
    pub grid: Grid,
    pub path: Vec<Position>,
    pub score: u32,
    pub valid: bool,
    pub mode: Option<Mode>,
    pub consecutive_clears: u32,
    /// Bumped on every wholesale grid replacement.
    pub grid_generation: u64,
}

impl GameState {
    pub fn new(values: &mut dyn ValueSource) -> Self {
        Self::from_grid(Grid::generate(values))
    }

    pub fn from_grid(grid: Grid) -> Self {
        GameState {
            grid,
            path: Vec::new(),
            score: 0,
            valid: false,
            mode: None,
            consecutive_clears: 0,
            grid_generation: 0,
        }
    }

    pub fn phase(&self) -> SelectionPhase {
        match self.path.len() {
            0 => SelectionPhase::Empty,
            1 => SelectionPhase::Building,
            _ => SelectionPhase::Sequencing,
        }
    }

    pub fn last(&self) -> Option<Position> {
        self.path.last().copied()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.path.contains(&pos)
    }

    /// Same game with `path` as the selection; flags and validity refreshed.
    pub fn with_path(&self, path: Vec<Position>) -> GameState {
        let grid = self.grid.with_path_flags(&path);
        let Validation { valid, mode } = rules::validate(&path, &grid);
        GameState { grid, path, valid, mode, ..self.clone() }
    }

    /// Same game on a new board with the selection emptied.
    pub fn with_grid(&self, grid: Grid) -> GameState {
        GameState {
            grid: grid.with_path_flags(&[]),
            path: Vec::new(),
            valid: false,
            mode: None,
            grid_generation: self.grid_generation + 1,
            ..self.clone()
        }
    }
}
