//! Compact SVG-style path accumulation.
//!
//! Path buffers are append-only during one encoding pass. Moves are
//! delta-encoded when the relative command is shorter than the absolute one;
//! axis-aligned lines collapse to `h`/`v`. Integer coordinates print without
//! a fractional part, so encoders that round first get minimal output.

use std::fmt::Write;

/// Write a coordinate, trimming the fractional part of integral values.
pub fn write_coord(out: &mut String, v: f64) {
    if v == v.trunc() && v.abs() < 1e15 {
        let _ = write!(out, "{}", v as i64);
    } else {
        let _ = write!(out, "{:.2}", v);
    }
}

/// An append-only path buffer with current-point tracking.
#[derive(Debug, Clone, Default)]
pub struct SvgPath {
    d: String,
    /// Start of the current subpath (target of the last move).
    sx: f64,
    sy: f64,
    /// Current pen position.
    x: f64,
    y: f64,
}

impl SvgPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.d.is_empty()
    }

    pub fn len(&self) -> usize {
        self.d.len()
    }

    pub fn as_str(&self) -> &str {
        &self.d
    }

    pub fn into_string(self) -> String {
        self.d
    }

    /// Absolute move.
    pub fn move_abs(&mut self, x: f64, y: f64) {
        self.d.push('M');
        write_coord(&mut self.d, x);
        self.d.push(',');
        write_coord(&mut self.d, y);
        self.set_start(x, y);
    }

    /// Move encoded as whichever of the absolute or relative command is
    /// shorter; ties go to the absolute form.
    pub fn move_shortest(&mut self, x: f64, y: f64) {
        let mut abs = String::new();
        abs.push('M');
        write_coord(&mut abs, x);
        abs.push(',');
        write_coord(&mut abs, y);

        let mut rel = String::new();
        rel.push('m');
        write_coord(&mut rel, x - self.x);
        rel.push(',');
        write_coord(&mut rel, y - self.y);

        self.d.push_str(if rel.len() < abs.len() { &rel } else { &abs });
        self.set_start(x, y);
    }

    /// Relative move.
    pub fn move_delta(&mut self, dx: f64, dy: f64) {
        self.d.push('m');
        write_coord(&mut self.d, dx);
        self.d.push(',');
        write_coord(&mut self.d, dy);
        self.set_start(self.x + dx, self.y + dy);
    }

    /// Relative line, collapsed to `h`/`v` when axis-aligned; a zero delta
    /// emits nothing.
    pub fn line_delta(&mut self, dx: f64, dy: f64) {
        if dx != 0.0 && dy != 0.0 {
            self.d.push('l');
            write_coord(&mut self.d, dx);
            self.d.push(',');
            write_coord(&mut self.d, dy);
        } else if dx != 0.0 {
            self.d.push('h');
            write_coord(&mut self.d, dx);
        } else if dy != 0.0 {
            self.d.push('v');
            write_coord(&mut self.d, dy);
        } else {
            return;
        }
        self.x += dx;
        self.y += dy;
    }

    /// Closed rectangle outline from the current point: `h dx v dy h -dx z`.
    /// The pen returns to the subpath start.
    pub fn rect_outline(&mut self, dx: f64, dy: f64) {
        self.d.push('h');
        write_coord(&mut self.d, dx);
        self.d.push('v');
        write_coord(&mut self.d, dy);
        self.d.push('h');
        write_coord(&mut self.d, -dx);
        self.d.push('z');
        self.x = self.sx;
        self.y = self.sy;
    }

    /// Closed rectangle drawn downwards first: `v dy h dx v -dy z`.
    pub fn rect_outline_v(&mut self, dx: f64, dy: f64) {
        self.d.push('v');
        write_coord(&mut self.d, dy);
        self.d.push('h');
        write_coord(&mut self.d, dx);
        self.d.push('v');
        write_coord(&mut self.d, -dy);
        self.d.push('z');
        self.x = self.sx;
        self.y = self.sy;
    }

    /// Append another buffer's commands. The other buffer must begin with an
    /// absolute move so concatenation cannot change its geometry.
    pub fn append_path(&mut self, other: &SvgPath) {
        self.d.push_str(&other.d);
        self.sx = other.sx;
        self.sy = other.sy;
        self.x = other.x;
        self.y = other.y;
    }

    pub fn close(&mut self) {
        self.d.push('z');
        self.x = self.sx;
        self.y = self.sy;
    }

    fn set_start(&mut self, x: f64, y: f64) {
        self.sx = x;
        self.sy = y;
        self.x = x;
        self.y = y;
    }
}
