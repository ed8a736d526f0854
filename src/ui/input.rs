/// Terminal input collector.
///
/// Drains every pending crossterm event once per frame and sorts them into:
///   - key presses (Press and Repeat both count, so a held arrow key keeps
///     stepping the cursor)
///   - mouse events, in arrival order (click → drag → release must stay
///     ordered for chain building)
///
/// Resize events are dropped; the renderer polls the terminal size itself.
///
/// Mouse reporting must be enabled by the renderer (`EnableMouseCapture`).

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};

pub struct InputState {
    /// Keys pressed (or auto-repeated) since the last drain.
    presses: Vec<KeyEvent>,

    /// Raw mouse events collected during drain.
    pub mouse: Vec<MouseEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            mouse: Vec::with_capacity(16),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame, before handling input.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.mouse.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    self.presses.push(key);
                }
                Ok(Event::Mouse(m)) => self.mouse.push(m),
                _ => {}
            }
        }
    }

    /// Keys pressed this frame, in order.
    pub fn presses(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.presses.iter().map(|k| k.code)
    }

    /// Was any of these keys pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        self.presses.iter().any(|k| codes.contains(&k.code))
    }

    /// Check if any key event this frame is Ctrl+C.
    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
