/// Inputs accepted by the step function and events it emits.
/// The presentation layer consumes events for messages and sound.

use crate::domain::grid::Grid;
use crate::domain::position::Position;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Input {
    /// Click / select key on a tile.
    Select(Position),
    /// Pointer entered a tile while a drag gesture is active.
    Hover(Position),
    /// Explicit submit action.
    Submit,
    /// Right-click: submit without a separate button.
    RightClick,
    Clear,
    NewGame,
    /// Delayed arrival-animation clear for the grid of `generation`.
    ClearAnimations { generation: u64 },
}

/// How a submission was requested.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SubmitSource {
    Button,
    RightClick,
    /// The player clicked a tile that breaks a valid chain.
    Auto,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rejection {
    /// Nothing selected.
    Empty,
    /// Selection too short or not a consecutive adjacent run.
    Invalid,
}

/// A queued auto-submission: the path and grid as they were when the
/// breaking click arrived.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PendingSubmission {
    pub path: Vec<Position>,
    pub grid: Grid,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    TileAdded { pos: Position, len: usize },
    PathRetracted { len: usize },
    AutoSubmitQueued,
    Submitted { points: u32, values: Vec<u8>, source: SubmitSource },
    Rejected { reason: Rejection, source: SubmitSource },
    PathCleared,
    NewGame,
    AnimationsCleared,
}
