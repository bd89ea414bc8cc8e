//! Terminal render sink.
//!
//! Cells are diffed against the previous frame so only changed tiles are
//! redrawn; the status lines under the grid and the history panel beside it
//! are redrawn only when their text changes.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::game::{Frame, Game, Phase};
use crate::grid::{Pos, TileKind};
use crate::timing::BestTimeStore;

pub const CELL_W: usize = 2;
const PANEL_GAP: usize = 3;
const PANEL_W: usize = 32;
const PANEL_ROWS: usize = 22;
const STATUS_ROWS: usize = 4;
const STATUS_W: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    Player,
    Wall,
    Exit,
    Trap,
    Freeze,
    Magic,
    Empty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub glyph: Glyph,
    pub color: Color,
}

const BLANK: Cell = Cell {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

pub struct Renderer {
    last: Vec<Cell>,
    last_size: usize,
    last_hud: String,
    last_status: Vec<String>,
    last_panel: Vec<String>,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            last: Vec::new(),
            last_size: 0,
            last_hud: String::new(),
            last_status: Vec::new(),
            last_panel: Vec::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

/// Picks what to draw at `pos`. The player sits on top of any tile.
pub fn cell_for(frame: &Frame, kinds: &[Option<TileKind>], pos: Pos) -> Cell {
    if pos == frame.player {
        return Cell {
            glyph: Glyph::Player,
            color: Color::Green,
        };
    }
    match kinds[pos.y * frame.grid_size + pos.x] {
        Some(TileKind::Wall) => Cell {
            glyph: Glyph::Wall,
            color: Color::DarkGrey,
        },
        Some(TileKind::Exit) => Cell {
            glyph: Glyph::Exit,
            color: Color::Red,
        },
        Some(TileKind::Trap) => Cell {
            glyph: Glyph::Trap,
            color: if frame.trap_visible {
                Color::Yellow
            } else {
                Color::White
            },
        },
        Some(TileKind::Freeze) => Cell {
            glyph: Glyph::Freeze,
            color: Color::Blue,
        },
        Some(TileKind::Magic) => Cell {
            glyph: Glyph::Magic,
            color: Color::Magenta,
        },
        None => Cell {
            glyph: Glyph::Empty,
            color: Color::DarkGreen,
        },
    }
}

fn tile_kinds(frame: &Frame) -> Vec<Option<TileKind>> {
    let mut kinds = vec![None; frame.grid_size * frame.grid_size];
    for tile in &frame.tiles {
        kinds[tile.pos.y * frame.grid_size + tile.pos.x] = Some(tile.kind);
    }
    kinds
}

/// Lines shown under the grid (or alone before the first level).
pub fn status_lines<S: BestTimeStore>(game: &Game<S>, answer: &str) -> Vec<String> {
    let message = game.message().unwrap_or_default().to_string();
    match game.phase() {
        Phase::AwaitingStart => {
            let mut lines = vec!["Are you ready to start the game? (y/n)".to_string()];
            if let Some(best) = game.best_total() {
                lines.push(format!("Best Time: {best:.2} seconds"));
            }
            lines
        }
        Phase::Declined => vec![message, "(press any key to exit)".to_string()],
        Phase::Playing | Phase::Frozen => vec![message],
        Phase::MagicChallenge { sentence } => vec![
            "You've stepped on the Magic Tile!".to_string(),
            "Type this paragraph to finish the game:".to_string(),
            format!("'{sentence}'"),
            format!("> {answer}"),
        ],
        Phase::CampaignComplete { .. } => vec![message, "Play again? (y/n)".to_string()],
    }
}

/// Pads or truncates `text` to exactly `width` terminal columns.
pub fn fit(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.extend(std::iter::repeat(' ').take(width - used));
    out
}

pub fn render<S: BestTimeStore>(
    out: &mut impl Write,
    game: &Game<S>,
    answer: &str,
    renderer: &mut Renderer,
) -> io::Result<()> {
    let status = status_lines(game, answer);
    let Some(frame) = game.frame() else {
        return render_prompt(out, renderer, status);
    };

    let grid_w = frame.grid_size * CELL_W;
    let needed_w = (grid_w + PANEL_GAP + PANEL_W) as u16;
    let needed_h = (1 + (frame.grid_size + 1 + STATUS_ROWS).max(PANEL_ROWS)) as u16;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        out.queue(MoveTo(0, 0))?;
        out.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        out.queue(Print(msg))?;
        out.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x
        || origin_y != renderer.origin_y
        || frame.grid_size != renderer.last_size
    {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }
    if renderer.needs_full {
        out.queue(Clear(ClearType::All))?;
        renderer.last_size = frame.grid_size;
        renderer.last = vec![BLANK; frame.grid_size * frame.grid_size];
    }

    let hud = format!("Level {}  (arrows or hjkl to move, q to quit)", frame.level);
    if renderer.needs_full || hud != renderer.last_hud {
        out.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        out.queue(SetForegroundColor(Color::White))?;
        out.queue(Print(fit(&hud, needed_w as usize)))?;
        out.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    let kinds = tile_kinds(&frame);
    for y in 0..frame.grid_size {
        for x in 0..frame.grid_size {
            let cell = cell_for(&frame, &kinds, Pos { x, y });
            let idx = y * frame.grid_size + x;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(out, renderer, x, y, cell)?;
            }
        }
    }

    if renderer.needs_full || status != renderer.last_status {
        let top = renderer.origin_y + frame.grid_size as u16 + 1;
        for row in 0..STATUS_ROWS {
            let line = status.get(row).map(String::as_str).unwrap_or("");
            out.queue(MoveTo(renderer.origin_x, top + row as u16))?;
            out.queue(Print(fit(line, STATUS_W.min(needed_w as usize))))?;
        }
        renderer.last_status = status;
    }

    let panel = game.history();
    if renderer.needs_full || panel != renderer.last_panel {
        let left = renderer.origin_x + (grid_w + PANEL_GAP) as u16;
        for row in 0..PANEL_ROWS {
            let line = panel.get(row).map(String::as_str).unwrap_or("");
            out.queue(MoveTo(left, renderer.origin_y + row as u16))?;
            out.queue(SetForegroundColor(Color::Cyan))?;
            out.queue(Print(fit(line, PANEL_W)))?;
            out.queue(ResetColor)?;
        }
        renderer.last_panel = panel;
    }

    renderer.needs_full = false;
    out.flush()?;
    Ok(())
}

fn render_prompt(out: &mut impl Write, renderer: &mut Renderer, status: Vec<String>) -> io::Result<()> {
    if !renderer.needs_full && renderer.last_size == 0 && status == renderer.last_status {
        return Ok(());
    }
    out.queue(MoveTo(0, 0))?;
    out.queue(Clear(ClearType::All))?;
    for (row, line) in status.iter().enumerate() {
        out.queue(MoveTo(0, row as u16))?;
        out.queue(Print(line))?;
    }
    out.flush()?;
    renderer.last_status = status;
    renderer.last_size = 0;
    renderer.needs_full = false;
    Ok(())
}

fn draw_cell(out: &mut impl Write, renderer: &Renderer, x: usize, y: usize, cell: Cell) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Empty => "· ",
        Glyph::Player | Glyph::Wall | Glyph::Exit | Glyph::Trap | Glyph::Freeze | Glyph::Magic => {
            "██"
        }
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    out.queue(MoveTo(x_pos, y_pos))?;
    out.queue(SetForegroundColor(cell.color))?;
    out.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            out.queue(Print(' '))?;
        }
    }
    out.queue(ResetColor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rules;
    use crate::grid::Tile;
    use crate::timing::MemoryStore;
    use std::time::Instant;

    fn frame(trap_visible: bool) -> Frame {
        Frame {
            level: 1,
            grid_size: 3,
            tiles: vec![
                Tile {
                    pos: Pos::new(1, 0),
                    kind: TileKind::Wall,
                },
                Tile {
                    pos: Pos::new(0, 1),
                    kind: TileKind::Trap,
                },
                Tile {
                    pos: Pos::new(1, 1),
                    kind: TileKind::Freeze,
                },
                Tile {
                    pos: Pos::new(2, 2),
                    kind: TileKind::Exit,
                },
            ],
            player: Pos::new(0, 0),
            trap_visible,
        }
    }

    #[test]
    fn tiles_map_to_their_colours() {
        let frame = frame(true);
        let kinds = tile_kinds(&frame);
        let at = |x, y| cell_for(&frame, &kinds, Pos::new(x, y));
        assert_eq!(at(0, 0).glyph, Glyph::Player);
        assert_eq!(at(0, 0).color, Color::Green);
        assert_eq!(at(1, 0).color, Color::DarkGrey);
        assert_eq!(at(0, 1).color, Color::Yellow);
        assert_eq!(at(1, 1).color, Color::Blue);
        assert_eq!(at(2, 2).color, Color::Red);
        assert_eq!(at(2, 0).glyph, Glyph::Empty);
    }

    #[test]
    fn hidden_trap_turns_white() {
        let frame = frame(false);
        let kinds = tile_kinds(&frame);
        assert_eq!(cell_for(&frame, &kinds, Pos::new(0, 1)).color, Color::White);
    }

    #[test]
    fn player_draws_over_tiles() {
        let mut frame = frame(true);
        frame.player = Pos::new(1, 1);
        let kinds = tile_kinds(&frame);
        assert_eq!(cell_for(&frame, &kinds, Pos::new(1, 1)).glyph, Glyph::Player);
    }

    #[test]
    fn fit_pads_and_truncates_by_display_width() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abcd");
        assert_eq!(fit("██x", 2), "██");
        assert_eq!(fit("", 0), "");
    }

    #[test]
    fn status_follows_the_phase() {
        let mut game: Game = Game::with_seed(Rules::default(), MemoryStore::with_best(12.5), 3);
        assert_eq!(
            status_lines(&game, ""),
            vec![
                "Are you ready to start the game? (y/n)".to_string(),
                "Best Time: 12.50 seconds".to_string(),
            ]
        );

        let mut events = Vec::new();
        game.confirm_start(false, Instant::now(), &mut events).unwrap();
        assert_eq!(
            status_lines(&game, ""),
            vec![
                "Come back when you're ready!".to_string(),
                "(press any key to exit)".to_string(),
            ]
        );
    }
}
