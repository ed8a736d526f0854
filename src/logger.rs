/// File logger.
///
/// The terminal is in raw mode on the alternate screen while the game
/// runs, so log lines go to a file instead of stdout/stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use tracing::Level;

/// Install the global subscriber. Returns false if the file can't be opened
/// or a subscriber is already installed; the game runs without logs then.
pub fn init_logger(path: &Path, level: &str) -> bool {
    let level = Level::from_str(level).unwrap_or(Level::INFO);

    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", path.display());
            return false;
        }
    };

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok()
}
