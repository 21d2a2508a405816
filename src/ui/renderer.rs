/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into the `front` buffer (array of Cell)
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::actor::{ActorKind, GoodieKind, Species, WallKind};
use crate::sim::world::{Screen, World};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// inter-row gap pixels on VTE-based terminals match the cell color
    /// exactly and no horizontal lines show through.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 18, b: 28 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer. Different from
    /// any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell {
            ch,
            fg,
            bg: Self::norm_bg(bg),
        }
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
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    /// Write a string at (x, y) with given colors.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Each game cell spans 2 terminal columns so the maze reads roughly
/// square on common fonts.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &World, screen: Screen, level_name: &str) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(
                self.writer,
                SetBackgroundColor(Cell::BASE_BG),
                Clear(ClearType::All)
            )?;
        }

        // Screen change → clear for a clean transition
        if self.last_screen != Some(screen) {
            self.back.cells.fill(Cell::INVALID);
            queue!(
                self.writer,
                SetBackgroundColor(Cell::BASE_BG),
                Clear(ClearType::All)
            )?;
            self.last_screen = Some(screen);
        }

        self.front.clear();
        match screen {
            Screen::Title => self.compose_title(world),
            Screen::Playing | Screen::Cleared => self.compose_game(world, level_name, false),
            Screen::Dying => self.compose_game(world, level_name, true),
            Screen::GameOver => self.compose_game_over(world),
            Screen::Won => self.compose_won(world),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame. Not ResetColor:
        // the terminal's native default may differ from BASE_BG and
        // cause line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
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
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &World, level_name: &str, dying: bool) {
        let buf_w = self.front.width;

        // ── HUD row ──
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, HUD_BG));
        }
        let hud = format!(
            " Score:{:<7}  Arena.{:<2}  ♥×{}  Bonus:{:<5} ",
            w.score,
            w.level + 1,
            w.lives,
            w.bonus,
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Maze ──
        for gy in 0..w.height {
            let row = MAP_ROW + gy;
            if row >= self.front.height {
                break;
            }
            for gx in 0..w.width {
                let col = gx * CELL_W;
                if col + 1 >= buf_w {
                    break;
                }
                self.compose_cell(w, gx, gy, col, row, dying);
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + w.height + 1;
        if msg_row < self.front.height {
            let msg = format!(" ◈ {} ", level_name);
            self.front.put_str(0, msg_row, &msg, Color::Rgb { r: 255, g: 220, b: 50 }, Color::Reset);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + w.height + 3;
        if help_row < self.front.height {
            let help = " Arrows:Move  Space:Charge  ESC:Quit";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    /// Write the visual for game cell (gx, gy). Highest-priority
    /// occupant wins: player, bug, cloud, charge, goodie, open hatch,
    /// wall. A hidden hatch draws as empty.
    fn compose_cell(&mut self, w: &World, gx: usize, gy: usize, col: usize, row: usize, dying: bool) {
        if w.player.x == gx && w.player.y == gy && (w.player.alive || dying) {
            let (c0, fg) = if dying {
                ('✗', Color::Rgb { r: 255, g: 80, b: 80 })
            } else if w.player.phase_ticks > 0 {
                ('☺', Color::Rgb { r: 120, g: 255, b: 255 })
            } else {
                ('☺', Color::Rgb { r: 255, g: 230, b: 80 })
            };
            self.put_pair(col, row, c0, ' ', fg, Color::Reset);
            return;
        }

        let mut best: Option<(u8, Cell, Cell)> = None;
        for a in w.actors.iter().filter(|a| a.alive && a.x == gx && a.y == gy) {
            let (prio, c0, c1, fg, bg) = match a.kind {
                ActorKind::Bug(b) => match b.species {
                    Species::Scuttler => (5, '◉', ' ', Color::Rgb { r: 255, g: 90, b: 90 }, Color::Reset),
                    Species::Sniffer => (5, '◈', ' ', Color::Rgb { r: 255, g: 120, b: 255 }, Color::Reset),
                },
                ActorKind::Cloud { .. } => {
                    (4, '▒', '▒', Color::Rgb { r: 255, g: 255, b: 160 }, Color::Rgb { r: 90, g: 90, b: 30 })
                }
                ActorKind::Charge { fuse } => {
                    // flash in the final second of the fuse
                    let fg = if fuse <= 10 && (fuse / 2) % 2 == 0 {
                        Color::Rgb { r: 255, g: 60, b: 60 }
                    } else {
                        Color::Rgb { r: 255, g: 160, b: 60 }
                    };
                    (3, '●', ' ', fg, Color::Reset)
                }
                ActorKind::Goodie { kind, .. } => {
                    let c = match kind {
                        GoodieKind::ExtraLife => '♥',
                        GoodieKind::PhaseSuit => '◊',
                        GoodieKind::ChargePack => '+',
                    };
                    (2, c, ' ', Color::Rgb { r: 120, g: 255, b: 120 }, Color::Reset)
                }
                ActorKind::Hatch { open: true } => {
                    (1, '[', ']', Color::Rgb { r: 80, g: 255, b: 80 }, Color::Rgb { r: 0, g: 60, b: 0 })
                }
                ActorKind::Hatch { open: false } => continue,
                ActorKind::Wall(WallKind::Solid) => {
                    (0, '█', '█', Color::Rgb { r: 110, g: 110, b: 130 }, Color::Rgb { r: 60, g: 60, b: 75 })
                }
                ActorKind::Wall(WallKind::Cracked) => {
                    (0, '░', '░', Color::Rgb { r: 190, g: 130, b: 70 }, Color::Rgb { r: 95, g: 60, b: 30 })
                }
            };
            if best.map_or(true, |(p, _, _)| prio > p) {
                best = Some((prio, Cell::new(c0, fg, bg), Cell::new(c1, fg, bg)));
            }
        }

        match best {
            Some((_, a, b)) => {
                self.front.set(col, row, a);
                self.front.set(col + 1, row, b);
            }
            None => {
                self.front.set(col, row, Cell::BLANK);
                self.front.set(col + 1, row, Cell::BLANK);
            }
        }
    }

    fn put_pair(&mut self, col: usize, row: usize, c0: char, c1: char, fg: Color, bg: Color) {
        self.front.set(col, row, Cell::new(c0, fg, bg));
        self.front.set(col + 1, row, Cell::new(c1, fg, bg));
    }

    // ── Static screens ──

    fn compose_title(&mut self, w: &World) {
        let cx = self.front.width / 2;
        let cy = self.front.height / 2;
        let gold = Color::Rgb { r: 255, g: 220, b: 50 };

        self.put_centered(cx, cy.saturating_sub(4), "G R I D   B L A S T", gold);
        self.put_centered(
            cx,
            cy.saturating_sub(2),
            "Corner the bugs, blast the walls, find the hatch.",
            Color::White,
        );
        self.put_centered(cx, cy, "Arrows: move    Space: drop charge    ESC: quit", Color::DarkGrey);
        if w.score > 0 {
            let line = format!("Last score: {}", w.score);
            self.put_centered(cx, cy + 2, &line, Color::DarkGrey);
        }
        self.put_centered(cx, cy + 4, "▸▸▸ PRESS ENTER ◂◂◂", Color::Rgb { r: 80, g: 255, b: 80 });
    }

    fn compose_game_over(&mut self, w: &World) {
        let cx = self.front.width / 2;
        let cy = self.front.height / 2;

        self.put_centered(cx, cy.saturating_sub(2), "G A M E   O V E R", Color::Rgb { r: 255, g: 80, b: 80 });
        let line = format!("Final score: {}", w.score);
        self.put_centered(cx, cy, &line, Color::White);
        self.put_centered(cx, cy + 2, "ENTER: title    ESC: quit", Color::DarkGrey);
    }

    fn compose_won(&mut self, w: &World) {
        let cx = self.front.width / 2;
        let cy = self.front.height / 2;
        let gold = Color::Rgb { r: 255, g: 220, b: 50 };

        self.put_centered(cx, cy.saturating_sub(2), "★  ALL ARENAS CLEARED  ★", gold);
        let line = format!("Final score: {}", w.score);
        self.put_centered(cx, cy, &line, Color::White);
        self.put_centered(cx, cy + 2, "ENTER: title    ESC: quit", Color::DarkGrey);
    }

    fn put_centered(&mut self, cx: usize, row: usize, s: &str, fg: Color) {
        let x = cx.saturating_sub(s.chars().count() / 2);
        self.front.put_str(x, row, s, fg, Color::Reset);
    }
}
