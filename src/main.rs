/// Entry point and game loop.

mod config;
mod domain;
mod logger;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, MouseButton, MouseEventKind};
use tracing::{info, warn};

use config::GameConfig;
use domain::rng::SessionRng;
use sim::event::{GameEvent, Input, Rejection};
use sim::session::Session;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{self, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let (config, config_err) = GameConfig::load();

    logger::init_logger(&config.log_file, &config.log_level);
    if let Some(e) = &config_err {
        warn!("{e}; using defaults");
        eprintln!("Warning: {e}; using defaults");
    }

    let rng = match config.game.seed {
        Some(seed) => SessionRng::new(seed),
        None => SessionRng::from_random(),
    };
    info!(seed = rng.seed(), "starting session");

    let mut session = Session::new(Box::new(rng), config.game.timing());
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = if config.sound.enabled {
        SoundEngine::new(config.sound.volume)
    } else {
        None
    };

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        warn!("game loop ended with error: {e}");
        eprintln!("Game error: {e}");
    }

    info!(score = session.game.score, "session over");
    println!();
    println!("Thanks for playing NumChain!");
    println!("Final Score: {}", session.game.score);
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.game.tick_rate_ms.max(1));

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }

        let mut events = handle_keys(session, &kb);
        events.extend(handle_mouse(session, &kb));
        events.extend(handle_gamepad(session, &gp));
        process_sound_events(sound, &events);

        if last_tick.elapsed() >= tick_rate {
            let events = session.tick();
            process_sound_events(sound, &events);
            last_tick = Instant::now();
        }

        renderer.render(session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::TileAdded { len, .. } => sfx.play_tile(*len),
            GameEvent::Submitted { .. } => sfx.play_coins(),
            GameEvent::Rejected { reason: Rejection::Invalid, .. } => sfx.play_reject(),
            GameEvent::Rejected { reason: Rejection::Empty, .. } => sfx.play_empty(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_SELECT: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_DRAG: &[KeyCode] = &[KeyCode::Tab, KeyCode::Char('v'), KeyCode::Char('V')];
const KEYS_SUBMIT: &[KeyCode] = &[KeyCode::Enter];
const KEYS_RIGHT_CLICK: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_CLEAR: &[KeyCode] = &[KeyCode::Backspace, KeyCode::Char('c'), KeyCode::Char('C')];
const KEYS_NEW_GAME: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N')];

/// Cursor delta for a movement key, if it is one.
fn key_step(code: KeyCode) -> Option<(i32, i32)> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some((-1, 0)),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some((1, 0)),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some((0, -1)),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some((0, 1)),
        _ => None,
    }
}

/// Keys run in arrival order so "move, move, select" within one frame
/// lands on the right tile.
fn handle_keys(session: &mut Session, kb: &InputState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for code in kb.presses() {
        if let Some((dr, dc)) = key_step(code) {
            events.extend(session.move_cursor(dr, dc));
        } else if KEYS_SELECT.contains(&code) {
            events.extend(session.select_at_cursor());
        } else if KEYS_DRAG.contains(&code) {
            session.toggle_drag();
        } else if KEYS_SUBMIT.contains(&code) {
            events.extend(session.dispatch(Input::Submit));
        } else if KEYS_RIGHT_CLICK.contains(&code) {
            events.extend(session.dispatch(Input::RightClick));
        } else if KEYS_CLEAR.contains(&code) {
            events.extend(session.dispatch(Input::Clear));
        } else if KEYS_NEW_GAME.contains(&code) {
            events.extend(session.dispatch(Input::NewGame));
        }
    }
    events
}

fn handle_mouse(session: &mut Session, kb: &InputState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for m in &kb.mouse {
        let hit = renderer::cell_at(m.column, m.row);
        match (m.kind, hit) {
            (MouseEventKind::Down(MouseButton::Left), Some(pos)) => {
                events.extend(session.pointer_down(pos));
            }
            (MouseEventKind::Drag(MouseButton::Left), Some(pos)) => {
                events.extend(session.pointer_drag(pos));
            }
            (MouseEventKind::Up(MouseButton::Left), _) => session.pointer_up(),
            (MouseEventKind::Down(MouseButton::Right), _) => {
                events.extend(session.dispatch(Input::RightClick));
            }
            _ => {}
        }
    }
    events
}

fn handle_gamepad(session: &mut Session, gp: &GamepadState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for step in gp.cursor_steps() {
        events.extend(session.move_cursor(step.dr, step.dc));
    }
    if gp.drag_pressed() {
        session.toggle_drag();
    }
    if gp.select_pressed() {
        events.extend(session.select_at_cursor());
    }
    if gp.submit_pressed() {
        events.extend(session.dispatch(Input::Submit));
    }
    if gp.clear_pressed() {
        events.extend(session.dispatch(Input::Clear));
    }
    if gp.new_game_pressed() {
        events.extend(session.dispatch(Input::NewGame));
    }
    events
}
