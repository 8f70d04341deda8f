/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell) from the Scene
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each game cell is two terminal columns wide. Levels larger than the
/// terminal scroll with a dead-zone camera that follows the player.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Actor;
use crate::domain::tile::Tile;
use crate::sim::world::Phase;

use super::scene::Scene;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: [u8; 16],  // up to 16 bytes (supports ZWJ emoji sequences)
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for every "empty" terminal cell.
    ///
    /// Clear and every cell use the same RGB, so the gap pixels between
    /// rows on VTE terminals match the cells and no lines show.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 16],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
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

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::from_char(c, fg, bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        // ch always holds whole chars written by encode_utf8.
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or("")
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

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            cx += 1;
        }
    }

    /// Fill a whole row with one background color.
    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ── Camera ──

/// A viewport into the level.
///
/// `(x, y)` is the level coordinate of the top-left visible cell; it goes
/// negative when the level is smaller than the view and gets centered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Camera {
    x: i32,
    y: i32,
    view_w: usize,
    view_h: usize,
}

impl Camera {
    /// Follow a target with a dead zone: only scroll when it nears the
    /// edge of the viewport (20% margin on each side).
    fn follow(&mut self, target: (usize, usize), world_w: usize, world_h: usize) {
        if self.view_w == 0 || self.view_h == 0 { return; }
        self.x = follow_axis(self.x, target.0 as i32, self.view_w, world_w);
        self.y = follow_axis(self.y, target.1 as i32, self.view_h, world_h);
    }

    /// Snap directly to center on a target (no dead zone).
    fn center_on(&mut self, target: (usize, usize), world_w: usize, world_h: usize) {
        if self.view_w == 0 || self.view_h == 0 { return; }
        self.x = center_axis(target.0 as i32, self.view_w, world_w);
        self.y = center_axis(target.1 as i32, self.view_h, world_h);
    }

    /// Level cell shown at viewport cell `(vx, vy)`, if inside the level.
    fn view_to_world(&self, vx: usize, vy: usize, world_w: usize, world_h: usize) -> Option<(usize, usize)> {
        let wx = self.x + vx as i32;
        let wy = self.y + vy as i32;
        if wx < 0 || wy < 0 || wx >= world_w as i32 || wy >= world_h as i32 {
            return None;
        }
        Some((wx as usize, wy as usize))
    }
}

fn follow_axis(pos: i32, target: i32, view: usize, world: usize) -> i32 {
    let view = view as i32;
    let world = world as i32;
    if world <= view {
        return -((view - world) / 2);
    }
    let margin = view / 5;
    let mut pos = pos;
    if target < pos + margin {
        pos = target - margin;
    } else if target > pos + view - margin - 1 {
        pos = target - view + margin + 1;
    }
    pos.clamp(0, world - view)
}

fn center_axis(target: i32, view: usize, world: usize) -> i32 {
    let view = view as i32;
    let world = world as i32;
    if world <= view {
        return -((view - world) / 2);
    }
    (target - view / 2).clamp(0, world - view)
}

// ── Tile visuals ──

enum Visual {
    Pair(char, char, Color, Color),
    Wide(char),
}

fn tile_visual(tile: Tile) -> Visual {
    match tile {
        Tile::Empty        => Visual::Pair(' ', ' ', Color::Reset, Color::Reset),
        Tile::Brick        => Visual::Pair('░', '░', Color::Rgb{r:180,g:120,b:60}, Color::Rgb{r:100,g:65,b:30}),
        Tile::Ladder       => Visual::Pair('╠', '╣', Color::Rgb{r:100,g:200,b:255}, Color::Reset),
        Tile::HiddenLadder => Visual::Pair('╠', '╣', Color::Rgb{r:0,g:180,b:180}, Color::Rgb{r:0,g:40,b:40}),
        Tile::Rope         => Visual::Pair('━', '━', Color::Rgb{r:180,g:100,b:200}, Color::Reset),
        Tile::Gold         => Visual::Wide('💰'),
    }
}

fn sprite_glyph(actor: Actor) -> char {
    match actor {
        Actor::Player => '🧍',
        Actor::Baddie(_) => '🤺',
    }
}

// ── Renderer ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

/// HUD + gap above the map, gap + help below it.
const RESERVED_ROWS: usize = MAP_ROW + 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

/// Counters shown in the HUD row, plus the phase for the end message.
#[derive(Clone, Copy, Debug)]
pub struct Hud {
    pub gold_left: usize,
    pub baddies: usize,
    pub frame: u64,
    pub phase: Phase,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    camera: Camera,
    /// Snap the camera on the next frame instead of scrolling.
    recenter: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            camera: Camera::default(),
            recenter: true,
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

    pub fn render(&mut self, scene: &Scene, hud: &Hud) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.recenter = true;
        }

        self.update_camera(scene);
        self.compose(scene, hud);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    /// Size the viewport from the terminal and move it after the player.
    fn update_camera(&mut self, scene: &Scene) {
        let (w, h) = (scene.width(), scene.height());
        let max_view_h = self.front.height.saturating_sub(RESERVED_ROWS).max(1);
        self.camera.view_w = (self.front.width / CELL_W).min(w);
        self.camera.view_h = max_view_h.min(h);

        let target = scene.sprite_pos(Actor::Player).unwrap_or((w / 2, h / 2));
        if std::mem::take(&mut self.recenter) {
            self.camera.center_on(target, w, h);
        } else {
            self.camera.follow(target, w, h);
        }
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors, not ResetColor: the terminal default may
        // differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                // Skip continuation cells (right half of wide emoji)
                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                // For wide cells, also check if the continuation changed
                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
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

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    // Wide char printed: cursor advanced 2 columns
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, scene: &Scene, hud: &Hud) {
        self.front.clear();
        let buf_w = self.front.width;
        let cam = self.camera.clone();

        // ── HUD row ──
        let status = if hud.gold_left == 0 { "CLIMB OUT!" } else { "" };
        let hud_text = format!(
            " {}  Gold:{:<3} Baddies:{:<2} Frame:{:<7} {} ",
            scene.name, hud.gold_left, hud.baddies, hud.frame, status,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud_text, Color::White, HUD_BG);

        // ── Map (camera viewport) ──
        for vy in 0..cam.view_h {
            let row = MAP_ROW + vy;
            if row >= self.front.height { break; }
            for vx in 0..cam.view_w {
                let col = vx * CELL_W;
                if col + 1 >= buf_w { break; }
                match cam.view_to_world(vx, vy, scene.width(), scene.height()) {
                    Some((x, y)) => self.compose_cell(scene, x, y, col, row),
                    None => self.compose_void(col, row),
                }
            }
        }

        // ── Help bar ──
        let help_row = MAP_ROW + cam.view_h + 1;
        if help_row < self.front.height {
            let help = " ←↑→↓/WASD:Move  Z:DigL  X:DigR  Q/Esc:Quit  │  Pad: B/Y/L1:L  A/X/R1:R";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }

        match hud.phase {
            Phase::Playing => {}
            Phase::Won => self.compose_end_message("★  YOU WON!  ★", Color::Rgb{r:255,g:220,b:50}),
            Phase::Lost => self.compose_end_message("✕  YOU LOST  ✕", Color::Rgb{r:255,g:60,b:60}),
        }
    }

    /// Render an out-of-bounds cell (game background).
    fn compose_void(&mut self, col: usize, row: usize) {
        self.front.set(col, row, Cell::BLANK);
        self.front.set(col + 1, row, Cell::BLANK);
    }

    /// Write the visual for level cell (x, y) at terminal (col, row).
    fn compose_cell(&mut self, scene: &Scene, x: usize, y: usize, col: usize, row: usize) {
        let visual = match scene.sprite_at(x, y) {
            Some(actor) => Visual::Wide(sprite_glyph(actor)),
            None => tile_visual(scene.visible_tile(x, y)),
        };
        match visual {
            Visual::Wide(ch) => {
                self.front.set(col, row, Cell::from_char_wide(ch, Color::Reset, Color::Reset));
                self.front.set(col + 1, row, Cell::WIDE_CONT);
            }
            Visual::Pair(c0, c1, fg, bg) => {
                self.front.set(col, row, Cell::from_char(c0, fg, bg));
                self.front.set(col + 1, row, Cell::from_char(c1, fg, bg));
            }
        }
    }

    /// Boxed message centered over the map.
    fn compose_end_message(&mut self, title: &str, color: Color) {
        let inner = 30;
        let title_w = title.chars().count();
        let pad_l = (inner - title_w) / 2;
        let pad_r = inner - title_w - pad_l;
        let lines = [
            format!("╔{}╗", "═".repeat(inner)),
            format!("║{}{}{}║", " ".repeat(pad_l), title, " ".repeat(pad_r)),
            format!("║{:^inner$}║", "press any key"),
            format!("╚{}╝", "═".repeat(inner)),
        ];

        let box_w = inner + 2;
        let map_cols = self.camera.view_w * CELL_W;
        let x = map_cols.max(box_w).saturating_sub(box_w) / 2;
        let y = MAP_ROW + self.camera.view_h.saturating_sub(lines.len()) / 2;
        let bg = Color::Rgb { r: 40, g: 40, b: 40 };
        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(x, y + i, line, color, bg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::Level;

    fn scene(rows: &[&str]) -> Scene {
        Scene::from_level(&Level::parse(&rows.join("\n")).expect("test level must parse"))
    }

    fn hud(phase: Phase) -> Hud {
        Hud { gold_left: 1, baddies: 1, frame: 0, phase }
    }

    fn composed(scene: &Scene, hud: &Hud, w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(w, h);
        r.update_camera(scene);
        r.compose(scene, hud);
        r
    }

    fn row_text(r: &Renderer, y: usize) -> String {
        (0..r.front.width).map(|x| r.front.get(x, y).as_str().to_string()).collect()
    }

    // ── Camera ──

    #[test]
    fn small_level_is_centered() {
        let mut cam = Camera { view_w: 20, view_h: 10, ..Camera::default() };
        cam.follow((1, 1), 10, 6);
        assert_eq!((cam.x, cam.y), (-5, -2));
        assert_eq!(cam.view_to_world(5, 2, 10, 6), Some((0, 0)));
        assert_eq!(cam.view_to_world(4, 2, 10, 6), None);
    }

    #[test]
    fn camera_scrolls_only_past_dead_zone() {
        let mut cam = Camera { view_w: 10, view_h: 10, ..Camera::default() };
        cam.center_on((0, 0), 40, 10);
        assert_eq!(cam.x, 0);
        cam.follow((7, 0), 40, 10);
        assert_eq!(cam.x, 0);
        cam.follow((8, 0), 40, 10);
        assert_eq!(cam.x, 1);
        cam.follow((39, 0), 40, 10);
        assert_eq!(cam.x, 30);
    }

    #[test]
    fn center_clamps_to_level() {
        let mut cam = Camera { view_w: 10, view_h: 4, ..Camera::default() };
        cam.center_on((38, 1), 40, 20);
        assert_eq!((cam.x, cam.y), (30, 0));
    }

    // ── Compose ──

    #[test]
    fn map_cells_are_two_columns_wide() {
        let s = scene(&[
            "H#-",
            "P$ ",
            "###",
        ]);
        let r = composed(&s, &hud(Phase::Playing), 6, 10);
        let top = MAP_ROW;
        assert_eq!(r.front.get(0, top).as_str(), "╠");
        assert_eq!(r.front.get(1, top).as_str(), "╣");
        assert_eq!(r.front.get(2, top).as_str(), "░");
        assert_eq!(r.front.get(4, top).as_str(), "━");

        let player = r.front.get(0, top + 1);
        assert!(player.wide);
        assert_eq!(player.as_str(), "🧍");
        assert!(r.front.get(1, top + 1).cont);
        assert_eq!(r.front.get(2, top + 1).as_str(), "💰");
    }

    #[test]
    fn hidden_ladder_drawn_once_revealed() {
        let mut s = scene(&[
            "~  ",
            "P  ",
            "###",
        ]);
        let r = composed(&s, &hud(Phase::Playing), 6, 10);
        assert_eq!(r.front.get(0, MAP_ROW).as_str(), " ");

        s.reveal_hidden_overlay(0, 0);
        let r = composed(&s, &hud(Phase::Playing), 6, 10);
        assert_eq!(r.front.get(0, MAP_ROW).as_str(), "╠");
    }

    #[test]
    fn hud_shows_counters() {
        let s = scene(&[
            "# Test Level",
            "P  ",
            "###",
        ]);
        let h = Hud { gold_left: 0, baddies: 2, frame: 42, phase: Phase::Playing };
        let r = composed(&s, &h, 80, 10);
        let text = row_text(&r, HUD_ROW);
        assert!(text.contains("Test Level"), "{text}");
        assert!(text.contains("Baddies:2"), "{text}");
        assert!(text.contains("Frame:42"), "{text}");
        assert!(text.contains("CLIMB OUT!"), "{text}");
    }

    #[test]
    fn end_message_drawn_only_when_finished() {
        let s = scene(&[
            "                    ",
            "P                   ",
            "####################",
        ]);
        let all = |r: &Renderer| (0..r.front.height).map(|y| row_text(r, y)).collect::<String>();

        let r = composed(&s, &hud(Phase::Playing), 80, 12);
        assert!(!all(&r).contains("YOU"));

        let r = composed(&s, &hud(Phase::Won), 80, 12);
        assert!(all(&r).contains("YOU WON!"));
        assert!(all(&r).contains("press any key"));

        let r = composed(&s, &hud(Phase::Lost), 80, 12);
        assert!(all(&r).contains("YOU LOST"));
    }
}
