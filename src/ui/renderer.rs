/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout (fixed origin, so mouse hit-testing needs no frame state):
///
/// ```text
///   row 0      HUD: title, score, combo, mode
///   row 2      path indicator
///   row 3..    9×9 board, one tile = 5 cols × 1 row, 1 col / 1 row gap
///   below      message bar, help bar
///   right      controls panel
/// ```

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::position::{Position, GRID_SIZE};
use crate::domain::tile::Tile;
use crate::sim::session::{MessageKind, Session};
use crate::sim::state::GameState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every cell, so cleared areas and cell
    /// backgrounds match exactly.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any real
    /// cell, so every position gets diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Layout ──

const HUD_ROW: u16 = 0;
const INDICATOR_ROW: u16 = 2;
const BOARD_ROW: u16 = 3;
const BOARD_COL: u16 = 2;
const TILE_W: u16 = 5;
const CELL_W: u16 = TILE_W + 1;
const CELL_H: u16 = 2;
const BOARD_W: u16 = CELL_W * GRID_SIZE as u16;
const BOARD_H: u16 = CELL_H * GRID_SIZE as u16;
const PANEL_COL: u16 = BOARD_COL + BOARD_W + 3;

/// Map a terminal cell to the board position under it. Gaps between tiles
/// belong to the tile up and to the left, so a drag never falls through.
pub fn cell_at(x: u16, y: u16) -> Option<Position> {
    if x < BOARD_COL || y < BOARD_ROW {
        return None;
    }
    let (dx, dy) = (x - BOARD_COL, y - BOARD_ROW);
    if dx >= BOARD_W || dy >= BOARD_H {
        return None;
    }
    Some(Position::new((dy / CELL_H) as usize, (dx / CELL_W) as usize))
}

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const TILE_BG: Color = Color::Rgb { r: 44, g: 48, b: 74 };
const PATH_PENDING_BG: Color = Color::Rgb { r: 70, g: 70, b: 115 };
const PATH_VALID_BG: Color = Color::Rgb { r: 28, g: 110, b: 62 };
const PATH_INVALID_BG: Color = Color::Rgb { r: 130, g: 38, b: 44 };
const ARRIVED_BG: Color = Color::Rgb { r: 96, g: 84, b: 30 };
const ACCENT: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GOOD: Color = Color::Rgb { r: 80, g: 230, b: 120 };
const BAD: Color = Color::Rgb { r: 255, g: 90, b: 90 };
const DIM: Color = Color::DarkGrey;

/// One hue per digit.
fn value_color(value: u8) -> Color {
    let (r, g, b) = match value {
        1 => (242, 90, 90),
        2 => (250, 164, 81),
        3 => (242, 242, 90),
        4 => (54, 226, 54),
        5 => (66, 240, 240),
        6 => (110, 156, 248),
        7 => (191, 137, 245),
        8 => (244, 114, 201),
        9 => (246, 130, 85),
        _ => (220, 220, 220),
    };
    Color::Rgb { r, g, b }
}

// ── Text helpers ──

/// Badge above the board while something is selected.
fn path_indicator(game: &GameState) -> Option<String> {
    match game.path.len() {
        0 => None,
        n if n < 2 => Some(format!("{n}/2 minimum")),
        _ if game.valid => Some("Valid sequence!".into()),
        _ => Some("Invalid sequence".into()),
    }
}

/// Panel status line under the selection count.
fn status_line(game: &GameState) -> Option<&'static str> {
    match game.path.len() {
        0 => None,
        1 => Some("Minimum 2 tiles"),
        _ if game.valid => Some("Ready to submit!"),
        _ => Some("Invalid sequence"),
    }
}

/// 1234567 → "1,234,567".
fn group_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.sync_size(true);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Track terminal size; on change (or when forced) invalidate the back
    /// buffer so the next frame repaints everything.
    fn sync_size(&mut self, force: bool) -> bool {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let changed = tw as usize != self.term_w || th as usize != self.term_h;
        if changed || force {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
        }
        changed
    }

    pub fn render(&mut self, s: &Session) -> io::Result<()> {
        if self.sync_size(false) {
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose_hud(s);
        self.compose_indicator(&s.game);
        self.compose_board(s);
        self.compose_panel(&s.game);
        self.compose_message(s);
        self.compose_help();

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        // Where the terminal cursor sits after the last Print, if known.
        let mut at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, s: &Session) {
        let g = &s.game;
        let combo = if g.consecutive_clears > 0 {
            format!("{}x Combo!", g.consecutive_clears)
        } else {
            String::new()
        };
        let mode = g.mode.map(|m| m.label()).unwrap_or("");
        let hud = format!(
            " NUMCHAIN   Score:{:<9}  {:<12}  {}",
            group_thousands(g.score), combo, mode,
        );
        let row = HUD_ROW as usize;
        self.front.fill_row(row, HUD_BG);
        self.front.put_str(0, row, &hud, Color::White, HUD_BG);
    }

    fn compose_indicator(&mut self, g: &GameState) {
        let text = match path_indicator(g) {
            Some(t) => format!(" {t} "),
            None => return,
        };
        let (fg, bg) = if g.valid {
            (Color::White, PATH_VALID_BG)
        } else if g.path.len() >= 2 {
            (Color::White, PATH_INVALID_BG)
        } else {
            (Color::Grey, PATH_PENDING_BG)
        };
        let x = BOARD_COL as usize + (BOARD_W as usize).saturating_sub(text.chars().count()) / 2;
        self.front.put_str(x, INDICATOR_ROW as usize, &text, fg, bg);
    }

    fn compose_board(&mut self, s: &Session) {
        let g = &s.game;
        let path_bg = if g.valid {
            PATH_VALID_BG
        } else if g.path.len() >= 2 {
            PATH_INVALID_BG
        } else {
            PATH_PENDING_BG
        };

        for (r, row) in g.grid.rows().enumerate() {
            for (c, tile) in row.iter().enumerate() {
                let pos = Position::new(r, c);
                let bg = if tile.in_path {
                    path_bg
                } else if tile.arrived {
                    ARRIVED_BG
                } else {
                    TILE_BG
                };
                let cursor = s.cursor == pos && (s.dragging || (s.anim_tick / 8) % 2 == 0);
                self.compose_tile(pos, tile, bg, cursor, s.dragging);
            }
        }
    }

    fn compose_tile(&mut self, pos: Position, tile: &Tile, bg: Color, cursor: bool, dragging: bool) {
        let x = (BOARD_COL + pos.col as u16 * CELL_W) as usize;
        let y = (BOARD_ROW + pos.row as u16 * CELL_H) as usize;
        let digit = char::from(b'0' + tile.value);
        let fg = value_color(tile.value);

        for i in 0..TILE_W as usize {
            self.front.set(x + i, y, Cell::new(' ', fg, bg));
        }
        self.front.set(x + 2, y, Cell::new(digit, fg, bg));

        if cursor {
            let mark = if dragging { Color::White } else { ACCENT };
            let (l, r) = if dragging { ('«', '»') } else { ('[', ']') };
            self.front.set(x, y, Cell::new(l, mark, bg));
            self.front.set(x + TILE_W as usize - 1, y, Cell::new(r, mark, bg));
        }
    }

    fn compose_panel(&mut self, g: &GameState) {
        let x = PANEL_COL as usize;
        let mut y = BOARD_ROW as usize;

        self.front.put_str(x, y, &group_thousands(g.score), ACCENT, Color::Reset);
        self.front.put_str(x, y + 1, "Score", DIM, Color::Reset);
        y += 3;

        if g.consecutive_clears > 0 {
            let combo = format!("{}x Combo!", g.consecutive_clears);
            self.front.put_str(x, y, &combo, Color::Rgb { r: 255, g: 140, b: 60 }, Color::Reset);
        }
        y += 1;
        if let Some(mode) = g.mode {
            self.front.put_str(x, y, &format!(" {} ", mode.label()), Color::White, PATH_VALID_BG);
        }
        y += 2;

        let selected = format!("Selected: {}", g.path.len());
        self.front.put_str(x, y, &selected, Color::White, Color::Reset);
        y += 1;
        if let Some(status) = status_line(g) {
            let fg = match g.path.len() {
                1 => DIM,
                _ if g.valid => GOOD,
                _ => BAD,
            };
            self.front.put_str(x, y, status, fg, Color::Reset);
        }
        y += 2;

        let can_submit = g.valid && g.path.len() >= 2;
        let submit_fg = if can_submit { GOOD } else { DIM };
        self.front.put_str(x, y, "Enter  Submit Sequence", submit_fg, Color::Reset);
        let clear_fg = if g.path.is_empty() { DIM } else { Color::White };
        self.front.put_str(x, y + 1, "C      Clear", clear_fg, Color::Reset);
        self.front.put_str(x, y + 2, "N      New Game", Color::White, Color::Reset);
        y += 4;

        let rules = [
            "• Select numbers in ascending (1→2→3)",
            "  or descending (9→8→7) order",
            "• Move in any direction including diagonal",
            "• Minimum 2 numbers required",
            "• Longer sequences = higher scores!",
        ];
        for (i, line) in rules.iter().enumerate() {
            self.front.put_str(x, y + i, line, DIM, Color::Reset);
        }
    }

    fn compose_message(&mut self, s: &Session) {
        let msg = match &s.message {
            Some(m) => m,
            None => return,
        };
        let row = (BOARD_ROW + BOARD_H) as usize;
        let bg = match msg.kind {
            MessageKind::Success => Color::Rgb { r: 40, g: 150, b: 80 },
            MessageKind::Error => Color::Rgb { r: 170, g: 50, b: 50 },
        };
        let text = match &msg.detail {
            Some(detail) => format!(" ◈ {}   {} ", msg.text, detail),
            None => format!(" ◈ {} ", msg.text),
        };
        self.front.fill_row(row, bg);
        self.front.put_str(0, row, &text, Color::White, bg);
    }

    fn compose_help(&mut self) {
        let row = (BOARD_ROW + BOARD_H + 2) as usize;
        let lines = [
            " Mouse: click select · drag extend · right-click submit",
            " Keys: ←→↑↓/WASD move · Space select · Tab drag · R submit · Q quit",
        ];
        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(0, row + i, line, DIM, Color::Reset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Grid;

    fn game_with_path(values: &[(usize, usize, u8)], path: &[Position]) -> GameState {
        let mut v = [[1u8; GRID_SIZE]; GRID_SIZE];
        for &(r, c, val) in values {
            v[r][c] = val;
        }
        GameState::from_grid(Grid::from_values(v)).with_path(path.to_vec())
    }

    #[test]
    fn hit_test_maps_tiles_and_gaps() {
        assert_eq!(cell_at(BOARD_COL, BOARD_ROW), Some(Position::new(0, 0)));
        // Gap column right of tile (0,0) still belongs to it.
        assert_eq!(cell_at(BOARD_COL + TILE_W, BOARD_ROW), Some(Position::new(0, 0)));
        assert_eq!(cell_at(BOARD_COL + CELL_W, BOARD_ROW + CELL_H), Some(Position::new(1, 1)));
        assert_eq!(
            cell_at(BOARD_COL + BOARD_W - 1, BOARD_ROW + BOARD_H - 1),
            Some(Position::new(8, 8))
        );
    }

    #[test]
    fn hit_test_outside_board() {
        assert_eq!(cell_at(0, 0), None);
        assert_eq!(cell_at(BOARD_COL + BOARD_W, BOARD_ROW), None);
        assert_eq!(cell_at(BOARD_COL, BOARD_ROW + BOARD_H), None);
        assert_eq!(cell_at(PANEL_COL, BOARD_ROW + 1), None);
    }

    #[test]
    fn indicator_text_tracks_path() {
        let a = Position::new(0, 0);
        let b = Position::new(0, 1);
        assert_eq!(path_indicator(&game_with_path(&[], &[])), None);
        assert_eq!(path_indicator(&game_with_path(&[], &[a])).as_deref(), Some("1/2 minimum"));
        let valid = game_with_path(&[(0, 0, 3), (0, 1, 4)], &[a, b]);
        assert_eq!(path_indicator(&valid).as_deref(), Some("Valid sequence!"));
        assert_eq!(status_line(&valid), Some("Ready to submit!"));
        let invalid = game_with_path(&[], &[a, b]);
        assert_eq!(path_indicator(&invalid).as_deref(), Some("Invalid sequence"));
        assert_eq!(status_line(&invalid), Some("Invalid sequence"));
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn every_digit_has_its_own_color() {
        let colors: Vec<Color> = (1..=9).map(value_color).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
