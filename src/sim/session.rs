/// Session: one interactive game plus everything the terminal front end
/// needs around it.
///
/// ## Ownership
///
///   - `game`  : the engine state, replaced wholesale by every transition.
///   - `values`: the injected random source; only the session draws from it.
///   - cursor / drag / message / animation timers: presentation state,
///     never read by the engine.
///
/// ## Turn order
///
/// `dispatch` runs one input to completion. If the step queues an
/// auto-submission, it is resolved right there, against the snapshot the
/// step captured, before `dispatch` returns. No later input can slip in
/// between.
///
/// ## Animation clear
///
/// A grid replacement that introduces arrivals schedules a clear keyed to
/// that grid's generation. A newer replacement overwrites the schedule, and
/// the engine ignores a clear whose generation no longer matches.

use tracing::{debug, instrument};

use crate::domain::position::{Position, GRID_SIZE};
use crate::domain::rng::ValueSource;
use super::event::{GameEvent, Input, Rejection, SubmitSource};
use super::state::GameState;
use super::step;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message {
    pub text: String,
    pub detail: Option<String>,
    pub kind: MessageKind,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct ScheduledClear {
    generation: u64,
    ticks_left: u32,
}

/// Tick counts for the timed parts of the presentation.
#[derive(Clone, Copy, Debug)]
pub struct Timing {
    pub anim_clear_ticks: u32,
    pub message_ticks: u32,
}

pub struct Session {
    pub game: GameState,
    values: Box<dyn ValueSource>,
    timing: Timing,

    // ── Pointer / cursor ──
    pub cursor: Position,
    pub dragging: bool,
    last_hover: Option<Position>,

    // ── Feedback ──
    pub message: Option<Message>,
    message_timer: u32,
    scheduled_clear: Option<ScheduledClear>,

    pub anim_tick: u32,
}

impl Session {
    pub fn new(mut values: Box<dyn ValueSource>, timing: Timing) -> Self {
        let game = GameState::new(values.as_mut());
        Session {
            game,
            values,
            timing,
            cursor: Position::new(GRID_SIZE / 2, GRID_SIZE / 2),
            dragging: false,
            last_hover: None,
            message: None,
            message_timer: 0,
            scheduled_clear: None,
            anim_tick: 0,
        }
    }

    /// Run one input, plus any auto-submission it queues.
    #[instrument(level = "debug", skip(self))]
    pub fn dispatch(&mut self, input: Input) -> Vec<GameEvent> {
        let generation = self.game.grid_generation;

        let first = step::step(&self.game, input, self.values.as_mut());
        let mut events = first.events;
        self.game = first.state;

        if let Some(pending) = first.pending {
            let second = step::resolve(&self.game, pending, self.values.as_mut());
            events.extend(second.events);
            self.game = second.state;
        }

        if self.game.grid_generation != generation {
            self.scheduled_clear = self.game.grid.has_arrivals().then_some(ScheduledClear {
                generation: self.game.grid_generation,
                ticks_left: self.timing.anim_clear_ticks,
            });
        }

        self.note_events(&events);
        events
    }

    /// Advance timers by one tick.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        self.anim_tick = self.anim_tick.wrapping_add(1);

        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }

        let due = match self.scheduled_clear.as_mut() {
            Some(clear) if clear.ticks_left > 1 => {
                clear.ticks_left -= 1;
                None
            }
            Some(clear) => Some(clear.generation),
            None => None,
        };
        match due {
            Some(generation) => {
                self.scheduled_clear = None;
                self.dispatch(Input::ClearAnimations { generation })
            }
            None => vec![],
        }
    }

    // ── Cursor / keyboard / pad ──

    /// Move the cursor; while dragging, the new tile is hovered.
    pub fn move_cursor(&mut self, dr: i32, dc: i32) -> Vec<GameEvent> {
        match self.cursor.offset(dr, dc) {
            Some(next) => {
                self.cursor = next;
                if self.dragging {
                    self.dispatch(Input::Hover(next))
                } else {
                    vec![]
                }
            }
            None => vec![],
        }
    }

    pub fn select_at_cursor(&mut self) -> Vec<GameEvent> {
        self.dispatch(Input::Select(self.cursor))
    }

    /// Keyboard / pad stand-in for holding the mouse button.
    pub fn toggle_drag(&mut self) {
        self.dragging = !self.dragging;
        self.last_hover = None;
    }

    // ── Mouse ──

    pub fn pointer_down(&mut self, pos: Position) -> Vec<GameEvent> {
        self.cursor = pos;
        self.dragging = true;
        self.last_hover = Some(pos);
        self.dispatch(Input::Select(pos))
    }

    pub fn pointer_drag(&mut self, pos: Position) -> Vec<GameEvent> {
        self.cursor = pos;
        if !self.dragging || self.last_hover == Some(pos) {
            return vec![];
        }
        self.last_hover = Some(pos);
        self.dispatch(Input::Hover(pos))
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
        self.last_hover = None;
    }

    // ── Feedback ──

    fn set_message(&mut self, text: &str, detail: Option<String>, kind: MessageKind) {
        self.message = Some(Message { text: text.to_string(), detail, kind });
        self.message_timer = self.timing.message_ticks;
    }

    fn note_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::Submitted { points, values, source } => {
                    let sum = values.iter().map(u8::to_string).collect::<Vec<_>>().join(" + ");
                    let detail = match source {
                        SubmitSource::RightClick => format!("Right-click submit! {sum} = {points}"),
                        _ => format!("{sum} = {points}"),
                    };
                    self.set_message(&format!("+{points} points!"), Some(detail), MessageKind::Success);
                }
                GameEvent::Rejected { reason: Rejection::Invalid, source } => {
                    let text = match source {
                        SubmitSource::RightClick => "Invalid sequence! Need 2+ tiles in order.",
                        _ => "Invalid sequence!",
                    };
                    self.set_message(text, None, MessageKind::Error);
                }
                GameEvent::NewGame => {
                    debug!("new game");
                    self.set_message("New game started!", None, MessageKind::Success);
                }
                _ => {}
            }
        }
    }
}
