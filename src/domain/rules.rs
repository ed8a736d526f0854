/// Chain rules: validity, mode detection and scoring.
///
/// Pure functions over a path and a grid snapshot. These decide "what is
/// legal" without changing anything.
///
/// ## Validity Truth Table
///
/// ┌──────────────────────────────┬─────────┬────────────┐
/// │ Condition                     │ Valid?  │ Mode       │
/// ├──────────────────────────────┼─────────┼────────────┤
/// │ fewer than 2 tiles            │ NO      │ none       │
/// │ every step +1, all adjacent   │ YES     │ ascending  │
/// │ every step −1, all adjacent   │ YES     │ descending │
/// │ every step ±1, a gap in chain │ NO      │ asc / desc │
/// │ any other step                │ NO      │ none       │
/// └──────────────────────────────┴─────────┴────────────┘
///
/// A single step can't be both +1 and −1, so the mode is never ambiguous.

use super::grid::Grid;
use super::position::{adjacent, Position};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Ascending,
    Descending,
}

impl Mode {
    /// Direction of a single step, if it is ±1.
    pub fn of_step(from: u8, to: u8) -> Option<Mode> {
        if to == from.wrapping_add(1) {
            Some(Mode::Ascending)
        } else if to == from.wrapping_sub(1) {
            Some(Mode::Descending)
        } else {
            None
        }
    }

    /// Does `to` continue this mode after `from`?
    pub fn continues(self, from: u8, to: u8) -> bool {
        Mode::of_step(from, to) == Some(self)
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Ascending => "↗ Ascending",
            Mode::Descending => "↘ Descending",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Validation {
    pub valid: bool,
    pub mode: Option<Mode>,
}

impl Validation {
    pub const NONE: Validation = Validation { valid: false, mode: None };
}

/// Validate the whole path from scratch.
pub fn validate(path: &[Position], grid: &Grid) -> Validation {
    if path.len() < 2 {
        return Validation::NONE;
    }

    let values: Vec<u8> = path.iter().map(|&p| grid.value(p)).collect();
    let steps_are = |mode: Mode| values.windows(2).all(|w| mode.continues(w[0], w[1]));

    let ascending = steps_are(Mode::Ascending);
    let descending = steps_are(Mode::Descending);
    let chained = path.windows(2).all(|w| adjacent(w[0], w[1]));

    let mode = if ascending {
        Some(Mode::Ascending)
    } else if descending {
        Some(Mode::Descending)
    } else {
        None
    };

    Validation { valid: chained && mode.is_some(), mode }
}

/// Sum of the values on the path. Only meaningful for a validated path.
pub fn score(path: &[Position], grid: &Grid) -> u32 {
    path.iter().map(|&p| u32::from(grid.value(p))).sum()
}
