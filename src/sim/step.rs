/// The transition function: `(GameState, Input) -> Step`.
///
/// Select rules, in priority order:
///   1. Position already in path  → retract to just before it
///   2. Valid chain, P continues  → extend
///   3. Valid chain, P breaks it  → queue auto-submit, drop P
///   4. Otherwise                 → append P, re-validate
///
/// Hover is stricter: adjacency, no revisits, and the value must follow
/// the chain (either direction for the second tile). Anything else is a
/// no-op.
///
/// Submission never happens inside rule 3. The returned `Step` carries the
/// unchanged state plus a `PendingSubmission`; the caller hands it to
/// `resolve` before processing any further input.

use tracing::debug;

use crate::domain::grid::Grid;
use crate::domain::position::{adjacent, Position};
use crate::domain::rng::ValueSource;
use crate::domain::rules::{self, Mode};
use super::event::{GameEvent, Input, PendingSubmission, Rejection, SubmitSource};
use super::state::{GameState, SelectionPhase};

/// Result of one transition.
#[derive(Debug)]
pub struct Step {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    pub pending: Option<PendingSubmission>,
}

impl Step {
    fn quiet(state: GameState) -> Self {
        Step { state, events: vec![], pending: None }
    }

    fn with_event(state: GameState, event: GameEvent) -> Self {
        Step { state, events: vec![event], pending: None }
    }
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(state: &GameState, input: Input, values: &mut dyn ValueSource) -> Step {
    match input {
        Input::Select(pos) => select(state, pos),
        Input::Hover(pos) => hover(state, pos),
        Input::Submit => submit(state, SubmitSource::Button, values),
        Input::RightClick => submit(state, SubmitSource::RightClick, values),
        Input::Clear => clear(state),
        Input::NewGame => new_game(state, values),
        Input::ClearAnimations { generation } => clear_animations(state, generation),
    }
}

/// Execute a queued auto-submission against its captured snapshot.
pub fn resolve(state: &GameState, pending: PendingSubmission, values: &mut dyn ValueSource) -> Step {
    let PendingSubmission { path, grid } = pending;
    let (next, event) = apply_submission(state, &path, &grid, SubmitSource::Auto, values);
    Step::with_event(next, event)
}

// ══════════════════════════════════════════════════════════════
// Selection
// ══════════════════════════════════════════════════════════════

fn select(state: &GameState, pos: Position) -> Step {
    if let Some(idx) = state.path.iter().position(|&p| p == pos) {
        let next = state.with_path(state.path[..idx].to_vec());
        let len = next.path.len();
        return Step::with_event(next, GameEvent::PathRetracted { len });
    }

    if state.phase() == SelectionPhase::Sequencing && state.valid {
        if continues_chain(state, pos) {
            return append(state, pos);
        }
        debug!(?pos, len = state.path.len(), "click breaks chain, queueing auto-submit");
        return Step {
            state: state.clone(),
            events: vec![GameEvent::AutoSubmitQueued],
            pending: Some(PendingSubmission {
                path: state.path.clone(),
                grid: state.grid.clone(),
            }),
        };
    }

    append(state, pos)
}

fn hover(state: &GameState, pos: Position) -> Step {
    let last = match state.last() {
        Some(p) => p,
        None => return Step::quiet(state.clone()),
    };
    if !adjacent(last, pos) || state.contains(pos) {
        return Step::quiet(state.clone());
    }

    let from = state.grid.value(last);
    let to = state.grid.value(pos);
    let follows = match state.phase() {
        SelectionPhase::Building => Mode::of_step(from, to).is_some(),
        _ => state.mode.is_some_and(|m| m.continues(from, to)),
    };

    if follows {
        append(state, pos)
    } else {
        Step::quiet(state.clone())
    }
}

/// Would `pos` extend the current chain in its established mode?
fn continues_chain(state: &GameState, pos: Position) -> bool {
    match (state.last(), state.mode) {
        (Some(last), Some(mode)) => {
            adjacent(last, pos) && mode.continues(state.grid.value(last), state.grid.value(pos))
        }
        _ => false,
    }
}

fn append(state: &GameState, pos: Position) -> Step {
    let mut path = state.path.clone();
    path.push(pos);
    let next = state.with_path(path);
    let len = next.path.len();
    Step::with_event(next, GameEvent::TileAdded { pos, len })
}

// ══════════════════════════════════════════════════════════════
// Submission
// ══════════════════════════════════════════════════════════════

fn submit(state: &GameState, source: SubmitSource, values: &mut dyn ValueSource) -> Step {
    if state.path.is_empty() {
        return Step::with_event(state.clone(), GameEvent::Rejected { reason: Rejection::Empty, source });
    }
    if !state.valid || state.path.len() < 2 {
        debug!(len = state.path.len(), "rejecting invalid submission");
        return Step::with_event(state.clone(), GameEvent::Rejected { reason: Rejection::Invalid, source });
    }

    let (next, event) = apply_submission(state, &state.path, &state.grid, source, values);
    Step::with_event(next, event)
}

/// Score `path` on `grid`, collapse, and fold the result into `state`.
fn apply_submission(
    state: &GameState,
    path: &[Position],
    grid: &Grid,
    source: SubmitSource,
    values: &mut dyn ValueSource,
) -> (GameState, GameEvent) {
    let points = rules::score(path, grid);
    let removed_values: Vec<u8> = path.iter().map(|&p| grid.value(p)).collect();
    let collapsed = grid.collapse(path, values);

    let mut next = state.with_grid(collapsed);
    next.score += points;
    next.consecutive_clears += 1;

    debug!(points, ?source, combo = next.consecutive_clears, "chain submitted");
    (next, GameEvent::Submitted { points, values: removed_values, source })
}

// ══════════════════════════════════════════════════════════════
// Clear / new game / animation
// ══════════════════════════════════════════════════════════════

fn clear(state: &GameState) -> Step {
    let mut next = state.with_path(Vec::new());
    next.consecutive_clears = 0;
    Step::with_event(next, GameEvent::PathCleared)
}

fn new_game(state: &GameState, values: &mut dyn ValueSource) -> Step {
    let mut next = state.with_grid(Grid::generate(values));
    next.score = 0;
    next.consecutive_clears = 0;
    Step::with_event(next, GameEvent::NewGame)
}

fn clear_animations(state: &GameState, generation: u64) -> Step {
    if generation != state.grid_generation {
        // Targets a grid that has since been replaced.
        return Step::quiet(state.clone());
    }
    let next = GameState { grid: state.grid.clear_animations(), ..state.clone() };
    Step::with_event(next, GameEvent::AnimationsCleared)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::GRID_SIZE;
    use crate::domain::rng::Scripted;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    /// Game on a digit diagram; unspecified cells hold 1.
    fn game_from(rows: &[&str]) -> GameState {
        let mut v = [[1u8; GRID_SIZE]; GRID_SIZE];
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                v[r][c] = ch.to_digit(10).unwrap() as u8;
            }
        }
        GameState::from_grid(Grid::from_values(v))
    }

    fn run(state: &GameState, inputs: &[Input]) -> GameState {
        let mut src = Scripted::new(&[9]);
        let mut s = state.clone();
        for &input in inputs {
            let st = step(&s, input, &mut src);
            s = match st.pending {
                Some(pending) => resolve(&st.state, pending, &mut src).state,
                None => st.state,
            };
        }
        s
    }

    fn select_all(state: &GameState, positions: &[Position]) -> GameState {
        let inputs: Vec<Input> = positions.iter().map(|&p| Input::Select(p)).collect();
        run(state, &inputs)
    }

    // ── Scenario: ascending chain, submit ──

    #[test]
    fn ascending_chain_submits_for_its_sum() {
        let g = game_from(&[
            "56",
            "117",
        ]);
        let s = select_all(&g, &[p(0, 0), p(0, 1), p(1, 2)]);
        assert!(s.valid);
        assert_eq!(s.mode, Some(Mode::Ascending));

        let mut src = Scripted::new(&[2]);
        let st = step(&s, Input::Submit, &mut src);
        assert_eq!(
            st.events,
            vec![GameEvent::Submitted { points: 18, values: vec![5, 6, 7], source: SubmitSource::Button }]
        );
        let after = st.state;
        assert_eq!(after.score, 18);
        assert_eq!(after.consecutive_clears, 1);
        assert!(after.path.is_empty());
        assert!(!after.valid);
        assert_eq!(after.mode, None);
        assert_eq!(after.grid_generation, 1);
        // Columns 0, 1 and 2 each lost one tile and were refilled at row 0.
        for col in 0..3 {
            assert_eq!(after.grid.value(p(0, col)), 2);
            assert!(after.grid.tile(p(0, col)).arrived);
        }
        assert_eq!(src.drawn(), 3);
    }

    // ── Scenario: non-adjacent ──

    #[test]
    fn non_adjacent_selection_is_invalid() {
        let g = game_from(&["5"]);
        let s = select_all(&g, &[p(0, 0), p(5, 5)]);
        assert_eq!(s.path.len(), 2);
        assert!(!s.valid);
    }

    // ── Scenario: equal values ──

    #[test]
    fn equal_values_are_invalid_without_mode() {
        let g = game_from(&["44"]);
        let s = select_all(&g, &[p(0, 0), p(0, 1)]);
        assert!(!s.valid);
        assert_eq!(s.mode, None);
    }

    // ── Scenario: hover breaking the mode ──

    #[test]
    fn hover_that_breaks_ascending_is_ignored() {
        let g = game_from(&["343"]);
        let s = run(&g, &[Input::Select(p(0, 0)), Input::Hover(p(0, 1))]);
        assert_eq!(s.mode, Some(Mode::Ascending));
        let st = step(&s, Input::Hover(p(0, 2)), &mut Scripted::new(&[1]));
        assert!(st.events.is_empty());
        assert_eq!(st.state.path.len(), 2);
    }

    #[test]
    fn hover_sets_direction_on_second_tile() {
        let g = game_from(&["54"]);
        let s = run(&g, &[Input::Select(p(0, 0)), Input::Hover(p(0, 1))]);
        assert_eq!(s.path, vec![p(0, 0), p(0, 1)]);
        assert_eq!(s.mode, Some(Mode::Descending));
    }

    #[test]
    fn hover_requires_adjacency_and_fresh_tile() {
        let g = game_from(&["565"]);
        let s = run(&g, &[Input::Select(p(0, 0)), Input::Hover(p(0, 2))]);
        assert_eq!(s.path.len(), 1);
        let s = run(&s, &[Input::Hover(p(0, 1)), Input::Hover(p(0, 0))]);
        assert_eq!(s.path, vec![p(0, 0), p(0, 1)]);
    }

    #[test]
    fn hover_on_empty_path_does_nothing() {
        let g = game_from(&["12"]);
        let s = run(&g, &[Input::Hover(p(0, 0))]);
        assert!(s.path.is_empty());
    }

    #[test]
    fn hover_cannot_extend_an_unestablished_mode() {
        let g = game_from(&["441"]);
        let s = select_all(&g, &[p(0, 0), p(0, 1)]);
        assert_eq!(s.mode, None);
        let s = run(&s, &[Input::Hover(p(0, 2))]);
        assert_eq!(s.path.len(), 2);
    }

    // ── Retraction ──

    #[test]
    fn reselecting_truncates_before_it() {
        let g = game_from(&["123"]);
        let abc = select_all(&g, &[p(0, 0), p(0, 1)]);
        // Third tile continues the chain, so it extends.
        let abc = select_all(&abc, &[p(0, 2)]);
        assert_eq!(abc.path.len(), 3);

        let to_empty = select_all(&abc, &[p(0, 0)]);
        assert!(to_empty.path.is_empty());
        assert_eq!(to_empty.phase(), SelectionPhase::Empty);

        let to_a = select_all(&abc, &[p(0, 1)]);
        assert_eq!(to_a.path, vec![p(0, 0)]);
        assert_eq!(to_a.phase(), SelectionPhase::Building);
        assert!(to_a.grid.tile(p(0, 0)).in_path);
        assert!(!to_a.grid.tile(p(0, 1)).in_path);
    }

    // ── Click rules ──

    #[test]
    fn click_extends_valid_chain() {
        let g = game_from(&[
            "98",
            "117",
        ]);
        let s = select_all(&g, &[p(0, 0), p(0, 1), p(1, 2)]);
        assert_eq!(s.path.len(), 3);
        assert_eq!(s.mode, Some(Mode::Descending));
        assert!(s.valid);
    }

    #[test]
    fn breaking_click_queues_auto_submit_and_drops_tile() {
        let g = game_from(&["236"]);
        let s = select_all(&g, &[p(0, 0), p(0, 1)]);
        assert!(s.valid);

        let mut src = Scripted::new(&[8]);
        let st = step(&s, Input::Select(p(0, 2)), &mut src);
        assert_eq!(st.state, s, "display state must not change");
        assert_eq!(st.events, vec![GameEvent::AutoSubmitQueued]);
        let pending = st.pending.expect("auto-submit queued");
        assert_eq!(pending.path, vec![p(0, 0), p(0, 1)]);

        let done = resolve(&st.state, pending, &mut src);
        assert_eq!(
            done.events,
            vec![GameEvent::Submitted { points: 5, values: vec![2, 3], source: SubmitSource::Auto }]
        );
        assert_eq!(done.state.score, 5);
        assert_eq!(done.state.consecutive_clears, 1);
        assert!(done.state.path.is_empty(), "clicked tile must not start a new path");
    }

    #[test]
    fn non_adjacent_click_on_valid_chain_also_auto_submits() {
        let g = game_from(&["23"]);
        let s = select_all(&g, &[p(0, 0), p(0, 1)]);
        let st = step(&s, Input::Select(p(6, 6)), &mut Scripted::new(&[1]));
        assert!(st.pending.is_some());
    }

    #[test]
    fn resolve_uses_the_captured_snapshot() {
        let g = game_from(&["236"]);
        let s = select_all(&g, &[p(0, 0), p(0, 1)]);
        let st = step(&s, Input::Select(p(0, 2)), &mut Scripted::new(&[1]));
        let pending = st.pending.unwrap();

        // State moved on (e.g. previous score added elsewhere) before the
        // queued submission ran.
        let mut later = st.state.clone();
        later.score = 100;
        later = later.with_path(vec![]);

        let done = resolve(&later, pending, &mut Scripted::new(&[1]));
        assert_eq!(done.state.score, 105);
    }

    #[test]
    fn invalid_chain_accepts_any_click() {
        let g = game_from(&["44"]);
        let s = select_all(&g, &[p(0, 0), p(0, 1), p(7, 7)]);
        assert_eq!(s.path.len(), 3);
        assert!(!s.valid);
    }

    // ── Submit / reject ──

    #[test]
    fn empty_submit_is_rejected_as_empty() {
        let g = game_from(&["1"]);
        for (input, source) in [(Input::Submit, SubmitSource::Button), (Input::RightClick, SubmitSource::RightClick)] {
            let st = step(&g, input, &mut Scripted::new(&[1]));
            assert_eq!(st.state, g);
            assert_eq!(st.events, vec![GameEvent::Rejected { reason: Rejection::Empty, source }]);
        }
    }

    #[test]
    fn invalid_submit_keeps_state_and_combo() {
        let g = game_from(&["1212"]);
        let mut s = select_all(&g, &[p(0, 0), p(0, 1)]);
        let s_done = run(&s, &[Input::RightClick]);
        assert_eq!(s_done.consecutive_clears, 1);

        s = select_all(&s_done, &[p(8, 8)]);
        let st = step(&s, Input::Submit, &mut Scripted::new(&[1]));
        assert_eq!(st.events, vec![GameEvent::Rejected { reason: Rejection::Invalid, source: SubmitSource::Button }]);
        assert_eq!(st.state, s);
        assert_eq!(st.state.consecutive_clears, 1);
    }

    #[test]
    fn combo_counts_consecutive_submissions() {
        let mut v = [[1u8; GRID_SIZE]; GRID_SIZE];
        v[8][1] = 2;
        let board = Grid::from_values(v);
        let mut src = Scripted::new(&[5]);
        let mut s = GameState::from_grid(board.clone());
        for _ in 0..3 {
            s.grid = board.clone();
            s = s.with_path(vec![p(8, 0), p(8, 1)]);
            s = step(&s, Input::Submit, &mut src).state;
        }
        assert_eq!(s.consecutive_clears, 3);
        assert_eq!(s.score, 9);
    }

    // ── Clear / new game ──

    #[test]
    fn clear_resets_path_and_combo_but_not_score() {
        let g = game_from(&["12"]);
        let s = run(&g, &[Input::Select(p(0, 0)), Input::Select(p(0, 1)), Input::Submit]);
        assert_eq!(s.consecutive_clears, 1);
        let s = run(&s, &[Input::Select(p(4, 4)), Input::Clear]);
        assert!(s.path.is_empty());
        assert_eq!(s.consecutive_clears, 0);
        assert_eq!(s.score, 3);
        assert!(s.grid.rows().flatten().all(|t| !t.in_path));
    }

    #[test]
    fn new_game_resets_everything() {
        let g = game_from(&["12"]);
        let s = run(&g, &[Input::Select(p(0, 0)), Input::Select(p(0, 1)), Input::Submit, Input::Select(p(3, 3))]);
        let mut src = Scripted::new(&[6]);
        let st = step(&s, Input::NewGame, &mut src);
        assert_eq!(st.events, vec![GameEvent::NewGame]);
        let n = st.state;
        assert_eq!(n.score, 0);
        assert_eq!(n.consecutive_clears, 0);
        assert!(n.path.is_empty());
        assert!(n.grid.rows().flatten().all(|t| t.value == 6 && !t.arrived));
        assert_eq!(src.drawn(), GRID_SIZE * GRID_SIZE);
    }

    // ── Animation clear ──

    #[test]
    fn animation_clear_applies_to_current_generation_only() {
        let g = game_from(&["12"]);
        let s = run(&g, &[Input::Select(p(0, 0)), Input::Select(p(0, 1)), Input::Submit]);
        assert!(s.grid.has_arrivals());

        let stale = step(&s, Input::ClearAnimations { generation: s.grid_generation - 1 }, &mut Scripted::new(&[1]));
        assert!(stale.events.is_empty());
        assert!(stale.state.grid.has_arrivals());

        let fresh = step(&s, Input::ClearAnimations { generation: s.grid_generation }, &mut Scripted::new(&[1]));
        assert_eq!(fresh.events, vec![GameEvent::AnimationsCleared]);
        assert!(!fresh.state.grid.has_arrivals());
        assert_eq!(fresh.state.grid_generation, s.grid_generation);
    }
}
