/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Move cursor (one tile per push)
///   A                     →  Select tile
///   Y / L1                →  Toggle drag
///   B / R1                →  Submit
///   X                     →  Clear selection
///   Start                 →  New game
///   Select                →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::info;

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East  => Some(Btn::B),
            Button::West  => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger   => Some(Btn::L1),
            Button::RightTrigger  => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start  => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    select: Vec<Btn>,
    drag: Vec<Btn>,
    submit: Vec<Btn>,
    clear: Vec<Btn>,
    new_game: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            select:   vec![Btn::A],
            drag:     vec![Btn::Y, Btn::L1],
            submit:   vec![Btn::B, Btn::R1],
            clear:    vec![Btn::X],
            new_game: vec![Btn::Start],
            quit:     vec![Btn::Select],
        }
    }
}

fn parse_list(names: &[String]) -> Vec<Btn> {
    names.iter().filter_map(|s| Btn::from_name(s)).collect()
}

impl ActionMap {
    /// Config lists override defaults; an empty or unparseable list keeps
    /// the default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        let mut map = ActionMap::default();
        let slots: [(&mut Vec<Btn>, &[String]); 6] = [
            (&mut map.select, &cfg.select),
            (&mut map.drag, &cfg.drag),
            (&mut map.submit, &cfg.submit),
            (&mut map.clear, &cfg.clear),
            (&mut map.new_game, &cfg.new_game),
            (&mut map.quit, &cfg.quit),
        ];
        for (slot, names) in slots {
            let parsed = parse_list(names);
            if !parsed.is_empty() {
                *slot = parsed;
            }
        }
        map
    }
}

/// One cursor step requested this frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CursorStep {
    pub dr: i32,
    pub dc: i32,
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons pressed since the last update (edge-triggered).
    pressed: Vec<Btn>,

    /// Cursor steps from d-pad presses and stick pushes this frame.
    steps: Vec<CursorStep>,

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick: (i32, i32),

    action_map: ActionMap,

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(_) => (None, false),
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            pressed: Vec::with_capacity(4),
            steps: Vec::with_capacity(4),
            stick: (0, 0),
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    pub fn update(&mut self) {
        self.pressed.clear();
        self.steps.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.mark_connected();
                    self.press(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.mark_connected();
                    self.update_axis(axis, value);
                }
                EventType::Connected => self.mark_connected(),
                EventType::Disconnected => {
                    if self.connected {
                        info!("gamepad disconnected");
                    }
                    self.connected = false;
                    self.stick = (0, 0);
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn mark_connected(&mut self) {
        if !self.connected {
            info!("gamepad connected");
            self.connected = true;
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, btn: Button) {
        let step = match btn {
            Button::DPadUp    => Some(CursorStep { dr: -1, dc: 0 }),
            Button::DPadDown  => Some(CursorStep { dr: 1, dc: 0 }),
            Button::DPadLeft  => Some(CursorStep { dr: 0, dc: -1 }),
            Button::DPadRight => Some(CursorStep { dr: 0, dc: 1 }),
            _ => None,
        };
        if let Some(step) = step {
            self.steps.push(step);
        } else if let Some(b) = Btn::from_gilrs(btn) {
            self.pressed.push(b);
        }
    }

    /// Stick pushes past the deadzone count as one step per push.
    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        let dir = if value > STICK_DEADZONE {
            1
        } else if value < -STICK_DEADZONE {
            -1
        } else {
            0
        };
        match axis {
            Axis::LeftStickX => {
                if dir != 0 && dir != self.stick.0 {
                    self.steps.push(CursorStep { dr: 0, dc: dir });
                }
                self.stick.0 = dir;
            }
            // Stick Y is positive upward; rows grow downward.
            Axis::LeftStickY => {
                if dir != 0 && dir != self.stick.1 {
                    self.steps.push(CursorStep { dr: -dir, dc: 0 });
                }
                self.stick.1 = dir;
            }
            _ => {}
        }
    }

    // ── Action queries (config-driven) ──

    fn any_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|b| self.pressed.contains(b))
    }

    pub fn cursor_steps(&self) -> &[CursorStep] {
        &self.steps
    }

    pub fn select_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.select)
    }
    pub fn drag_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.drag)
    }
    pub fn submit_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.submit)
    }
    pub fn clear_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.clear)
    }
    pub fn new_game_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.new_game)
    }
    pub fn quit_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.quit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_are_case_insensitive_with_aliases() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name("South"), Some(Btn::A));
        assert_eq!(Btn::from_name("rb"), Some(Btn::R1));
        assert_eq!(Btn::from_name("back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn config_overrides_only_valid_lists() {
        let cfg = GamepadConfig {
            select: vec!["X".into()],
            submit: vec!["nonsense".into()],
            clear: vec![],
            ..GamepadConfig::default()
        };
        let map = ActionMap::from_config(&cfg);
        assert_eq!(map.select, vec![Btn::X]);
        assert_eq!(map.submit, vec![Btn::B, Btn::R1]);
        assert_eq!(map.clear, vec![Btn::X]);
    }

    #[test]
    fn actions_follow_mapping() {
        let mut pad = GamepadState::new();
        pad.pressed.push(Btn::B);
        assert!(pad.submit_pressed());
        assert!(!pad.select_pressed());
        pad.load_button_config(&GamepadConfig {
            submit: vec!["A".into()],
            ..GamepadConfig::default()
        });
        assert!(!pad.submit_pressed());
    }
}
