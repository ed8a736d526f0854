/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or
/// `~/.config/numchain`. Falls back to defaults if the file is missing,
/// unreadable or malformed; every key is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::sim::session::Timing;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub game: GameSettings,
    pub sound: SoundConfig,
    pub gamepad: GamepadConfig,
    pub log_file: PathBuf,
    pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Fixed board seed; a random one is drawn (and logged) when absent.
    pub seed: Option<u64>,
    pub tick_rate_ms: u64,
    pub animation_clear_ms: u64,
    pub message_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub enabled: bool,
    pub volume: f32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GamepadConfig {
    pub select: Vec<String>,
    pub drag: Vec<String>,
    pub submit: Vec<String>,
    pub clear: Vec<String>,
    pub new_game: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is not valid config: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

// ── TOML Schema ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    game: GameSettings,
    #[serde(default)]
    sound: SoundConfig,
    #[serde(default)]
    gamepad: GamepadConfig,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct TomlGeneral {
    log_file: String,
    log_level: String,
}

// ── Defaults ──

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            seed: None,
            tick_rate_ms: 50,
            animation_clear_ms: 600,
            message_ms: 4000,
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        SoundConfig { enabled: true, volume: 1.0 }
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            select: names(&["A"]),
            drag: names(&["Y", "L1"]),
            submit: names(&["B", "R1"]),
            clear: names(&["X"]),
            new_game: names(&["Start"]),
            quit: names(&["Select"]),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            log_file: "numchain.log".into(),
            log_level: "info".into(),
        }
    }
}

// ── Derived values ──

impl GameSettings {
    /// Convert a duration to whole ticks, at least one.
    pub fn ticks(&self, ms: u64) -> u32 {
        let rate = self.tick_rate_ms.max(1);
        (ms.div_ceil(rate)).clamp(1, u32::MAX as u64) as u32
    }

    pub fn timing(&self) -> Timing {
        Timing {
            anim_clear_ticks: self.ticks(self.animation_clear_ms),
            message_ticks: self.ticks(self.message_ms),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from the first `config.toml` found.
    /// Problems are reported as warnings and defaults are used instead.
    pub fn load() -> (Self, Option<ConfigError>) {
        let dirs = candidate_dirs();
        let (toml_cfg, err) = match find_config(&dirs) {
            Some(path) => match read_config(&path) {
                Ok(cfg) => (cfg, None),
                Err(e) => (TomlConfig::default(), Some(e)),
            },
            None => (TomlConfig::default(), None),
        };
        (GameConfig::from_toml(toml_cfg, &dirs), err)
    }

    fn from_toml(cfg: TomlConfig, dirs: &[PathBuf]) -> Self {
        let log_file = PathBuf::from(&cfg.general.log_file);
        let log_file = if log_file.is_absolute() {
            log_file
        } else {
            // Log next to the config directory we searched first.
            dirs.first().map(|d| d.join(&log_file)).unwrap_or(log_file)
        };

        GameConfig {
            game: cfg.game,
            sound: cfg.sound,
            gamepad: cfg.gamepad,
            log_file,
            log_level: cfg.general.log_level,
        }
    }
}

fn parse_config(text: &str, path: &Path) -> Result<TomlConfig, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

fn read_config(path: &Path) -> Result<TomlConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    parse_config(&text, path)
}

fn find_config(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter().map(|d| d.join("config.toml")).find(|p| p.exists())
}

/// Candidate directories to search: exe dir + CWD + XDG config (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(home).join(".config/numchain");
        if xdg.is_dir() && !dirs.contains(&xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}
