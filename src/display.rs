/// Terminal canvas: all terminal output lives here.
///
/// The playfield is rasterised onto a grid of character cells, one cell per
/// terminal column/row.  Draw calls only touch the in-memory grid;
/// `present` queues the finished frame onto a writer in one pass.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Print},
    terminal, QueueableCommand,
};
use tower_defence::geometry::{is_point_in_ellipse, is_point_in_polygon, is_point_in_rect, Color, Ellipse, Rect, Vec2};
use tower_defence::render::Canvas;

// ── Glyphs ────────────────────────────────────────────────────────────────────

const G_EMPTY: char = ' ';
const G_FILL: char = '█';
const G_STROKE: char = '·';
const G_POINT: char = '•';

/// Fills darker than this blank the cells instead of painting blocks.
const DARK_LUMA: f32 = 0.15;

const C_DIMMED: style::Color = style::Color::DarkGrey;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Cell {
    glyph: char,
    fg: style::Color,
}

const BLANK: Cell = Cell {
    glyph: G_EMPTY,
    fg: style::Color::Reset,
};

fn term_color(c: Color) -> style::Color {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    style::Color::Rgb {
        r: channel(c.r),
        g: channel(c.g),
        b: channel(c.b),
    }
}

fn luma(c: Color) -> f32 {
    0.2126 * c.r + 0.7152 * c.g + 0.0722 * c.b
}

// ── Canvas ────────────────────────────────────────────────────────────────────

pub struct TerminalCanvas {
    cols: u16,
    rows: u16,
    world: Rect,
    cells: Vec<Cell>,
}

impl TerminalCanvas {
    /// A `cols`×`rows` grid showing `world`.
    pub fn new(cols: u16, rows: u16, world: Rect) -> Self {
        let mut canvas = Self {
            cols: 0,
            rows: 0,
            world,
            cells: Vec::new(),
        };
        canvas.resize(cols, rows);
        canvas
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols.max(1);
        self.rows = rows.max(1);
        self.cells = vec![BLANK; self.cols as usize * self.rows as usize];
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    fn cell_width(&self) -> f32 {
        self.world.width / self.cols as f32
    }

    fn cell_height(&self) -> f32 {
        self.world.height / self.rows as f32
    }

    /// Column/row containing `p`, if it is on screen.  Row 0 is the top.
    pub fn world_to_cell(&self, p: Vec2) -> Option<(u16, u16)> {
        let col = ((p.x - self.world.left) / self.cell_width()).floor();
        let row = ((self.world.top() - p.y) / self.cell_height()).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            return None;
        }
        Some((col as u16, row as u16))
    }

    /// Centre of a cell in playfield units.
    pub fn cell_to_world(&self, col: u16, row: u16) -> Vec2 {
        Vec2::new(
            self.world.left + (col as f32 + 0.5) * self.cell_width(),
            self.world.top() - (row as f32 + 0.5) * self.cell_height(),
        )
    }

    fn put(&mut self, col: u16, row: u16, glyph: char, fg: style::Color) {
        if col < self.cols && row < self.rows {
            let i = row as usize * self.cols as usize + col as usize;
            self.cells[i] = Cell { glyph, fg };
        }
    }

    fn plot(&mut self, p: Vec2, glyph: char, fg: style::Color) {
        if let Some((col, row)) = self.world_to_cell(p) {
            self.put(col, row, glyph, fg);
        }
    }

    /// Paint every cell whose centre satisfies `inside`.  Translucent colours
    /// dim what is already there; very dark opaque colours erase it.
    fn fill_where(&mut self, color: Color, anchor: Vec2, inside: impl Fn(Vec2) -> bool) {
        let mut painted = false;
        for row in 0..self.rows {
            for col in 0..self.cols {
                if !inside(self.cell_to_world(col, row)) {
                    continue;
                }
                painted = true;
                let i = row as usize * self.cols as usize + col as usize;
                if color.a < 1.0 {
                    if self.cells[i].glyph != G_EMPTY {
                        self.cells[i].fg = C_DIMMED;
                    }
                } else if luma(color) < DARK_LUMA {
                    self.cells[i] = BLANK;
                } else {
                    self.cells[i] = Cell {
                        glyph: G_FILL,
                        fg: term_color(color),
                    };
                }
            }
        }
        // Shapes smaller than a cell still show up.
        if !painted && color.a >= 1.0 && luma(color) >= DARK_LUMA {
            self.plot(anchor, G_FILL, term_color(color));
        }
    }

    /// Queue the frame onto `out` and flush.
    pub fn present<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let mut current: Option<style::Color> = None;
        for row in 0..self.rows {
            out.queue(cursor::MoveTo(0, row))?;
            let start = row as usize * self.cols as usize;
            let mut run = String::new();
            for cell in &self.cells[start..start + self.cols as usize] {
                if current != Some(cell.fg) {
                    if !run.is_empty() {
                        out.queue(Print(std::mem::take(&mut run)))?;
                    }
                    out.queue(style::SetForegroundColor(cell.fg))?;
                    current = Some(cell.fg);
                }
                run.push(cell.glyph);
            }
            out.queue(Print(run))?;
        }
        out.queue(style::ResetColor)?;
        out.queue(cursor::MoveTo(0, self.rows.saturating_sub(1)))?;
        out.flush()
    }

    /// Blank the real terminal, used after a resize.
    pub fn wipe<W: Write>(out: &mut W) -> std::io::Result<()> {
        out.queue(terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }
}

impl Canvas for TerminalCanvas {
    fn fill_rect(&mut self, rect: &Rect, color: Color) {
        self.fill_where(color, rect.center(), |p| is_point_in_rect(p, rect));
    }

    fn stroke_rect(&mut self, rect: &Rect, color: Color) {
        let [a, b, c, d] = rect.corners();
        self.line(a, b, color);
        self.line(b, c, color);
        self.line(c, d, color);
        self.line(d, a, color);
    }

    fn fill_ellipse(&mut self, ellipse: &Ellipse, color: Color) {
        self.fill_where(color, ellipse.center, |p| is_point_in_ellipse(p, ellipse));
    }

    fn stroke_ellipse(&mut self, ellipse: &Ellipse, color: Color) {
        if color.a < 0.25 {
            return;
        }
        let step = self.cell_width().min(self.cell_height()).max(f32::EPSILON);
        let perimeter = std::f32::consts::TAU * ellipse.radius_x.max(ellipse.radius_y);
        let samples = ((perimeter / step).ceil() as usize).clamp(8, 4096);
        let fg = term_color(color);
        for i in 0..samples {
            let angle = std::f32::consts::TAU * i as f32 / samples as f32;
            let p = Vec2::new(
                ellipse.center.x + ellipse.radius_x * angle.cos(),
                ellipse.center.y + ellipse.radius_y * angle.sin(),
            );
            self.plot(p, G_STROKE, fg);
        }
    }

    fn fill_polygon(&mut self, vertices: &[Vec2], color: Color) {
        if vertices.is_empty() {
            return;
        }
        let sum = vertices.iter().fold(Vec2::ZERO, |acc, &v| acc + v);
        let centroid = sum * (1.0 / vertices.len() as f32);
        self.fill_where(color, centroid, |p| is_point_in_polygon(p, vertices));
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Color) {
        let step = self.cell_width().min(self.cell_height()).max(f32::EPSILON);
        let samples = (((to - from).length() / step).ceil() as usize).clamp(1, 4096);
        let fg = term_color(color);
        for i in 0..=samples {
            let t = i as f32 / samples as f32;
            self.plot(from + (to - from) * t, G_STROKE, fg);
        }
    }

    fn point(&mut self, at: Vec2, color: Color) {
        self.plot(at, G_POINT, term_color(color));
    }

    fn text(&mut self, at: Vec2, text: &str, color: Color) {
        let Some((col, row)) = self.world_to_cell(at) else {
            return;
        };
        let fg = term_color(color);
        for (i, ch) in text.chars().enumerate() {
            self.put(col.saturating_add(i as u16), row, ch, fg);
        }
    }
}
