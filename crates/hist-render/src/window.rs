//! Draw-window preparation shared by all encoders.
//!
//! Derives the visible bin-index rectangle, sub-sampling strides and the
//! bin-edge-to-device-pixel coordinate arrays once per frame, so that the
//! encoders never repeat axis-to-pixel mapping.

use serde::Serialize;

use hist_core::{GridAccessor, RenderError, RenderResult, ZoomSelect};

/// Axis coordinate to device pixel conversion, owned by the hosting frame.
pub trait FrameMapper {
    fn x_to_px(&self, x: f64) -> f64;
    fn y_to_px(&self, y: f64) -> f64;
}

/// Plain linear mapping of an axis range onto a pixel rectangle, with the
/// y axis flipped (pixel y grows downwards).
#[derive(Debug, Clone, Copy)]
pub struct LinearFrame {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub width: f64,
    pub height: f64,
}

impl LinearFrame {
    /// Frame covering the full grid axes.
    pub fn for_grid(grid: &impl GridAccessor, width: f64, height: f64) -> Self {
        let xa = grid.x_axis();
        let ya = grid.y_axis();
        Self {
            x_range: (xa.min, xa.max),
            y_range: (ya.min, ya.max),
            width,
            height,
        }
    }
}

impl FrameMapper for LinearFrame {
    fn x_to_px(&self, x: f64) -> f64 {
        let (lo, hi) = self.x_range;
        (x - lo) / (hi - lo) * self.width
    }

    fn y_to_px(&self, y: f64) -> f64 {
        let (lo, hi) = self.y_range;
        self.height - (y - lo) / (hi - lo) * self.height
    }
}

/// Rendering hints for [`DrawWindow::prepare`].
#[derive(Debug, Clone, Copy)]
pub struct WindowHints {
    /// Round pixel coordinates to integers.
    pub rounding: bool,
    /// Widen the index rectangle by this many bins on each side (clamped to
    /// the grid), so that geometry continues smoothly past a zoomed edge.
    pub extra: usize,
    /// Track the maximum per-pixel content density over the window.
    pub pixel_density: bool,
    /// Also keep unmapped axis coordinates for projected drawing.
    pub original: bool,
}

impl Default for WindowHints {
    fn default() -> Self {
        Self {
            rounding: true,
            extra: 0,
            pixel_density: false,
            original: false,
        }
    }
}

/// The per-frame draw window handle consumed by every encoder.
///
/// `i1..i2` / `j1..j2` are 0-based half-open cell-index ranges; `grx[i]` /
/// `gry[j]` are the device-pixel coordinates of bin edge `i` / `j`
/// (`0..=nx`, `0..=ny`). Strides above 1 merge several logical bins into one
/// visual cell. Read-only during encoding.
#[derive(Debug, Clone, Serialize)]
pub struct DrawWindow {
    pub i1: usize,
    pub i2: usize,
    pub j1: usize,
    pub j2: usize,
    pub stepi: usize,
    pub stepj: usize,
    pub grx: Vec<f64>,
    pub gry: Vec<f64>,
    /// Unmapped axis coordinates of bin edges; empty unless requested.
    pub origx: Vec<f64>,
    /// Unmapped axis coordinates of bin edges; empty unless requested.
    pub origy: Vec<f64>,
    /// Total content over the window, used to seed deterministic jitter.
    pub sumz: f64,
    /// Maximum content per pixel area over the window; zero unless the
    /// pixel-density hint was set.
    pub max_density: f64,
}

impl DrawWindow {
    /// Build the draw window for one frame.
    ///
    /// The zoom selection must lie within the grid; encoders trust these
    /// bounds and do not re-check them.
    pub fn prepare(
        grid: &impl GridAccessor,
        frame: &impl FrameMapper,
        zoom: &ZoomSelect,
        hints: &WindowHints,
    ) -> RenderResult<Self> {
        let (nx, ny) = (grid.nx(), grid.ny());
        if zoom.x_right > nx || zoom.y_right > ny {
            return Err(RenderError::InvalidWindow(format!(
                "selection {}..{} x {}..{} exceeds grid {}x{}",
                zoom.x_left, zoom.x_right, zoom.y_left, zoom.y_right, nx, ny
            )));
        }
        if zoom.x_left > zoom.x_right || zoom.y_left > zoom.y_right {
            return Err(RenderError::InvalidWindow(format!(
                "inverted selection {}..{} x {}..{}",
                zoom.x_left, zoom.x_right, zoom.y_left, zoom.y_right
            )));
        }

        let i1 = zoom.x_left.saturating_sub(hints.extra);
        let i2 = (zoom.x_right + hints.extra).min(nx);
        let j1 = zoom.y_left.saturating_sub(hints.extra);
        let j2 = (zoom.y_right + hints.extra).min(ny);

        let xaxis = grid.x_axis();
        let yaxis = grid.y_axis();

        let map = |px: f64| if hints.rounding { px.round() } else { px };
        let grx: Vec<f64> = (0..=nx)
            .map(|i| map(frame.x_to_px(xaxis.bin_edge(i))))
            .collect();
        let gry: Vec<f64> = (0..=ny)
            .map(|j| map(frame.y_to_px(yaxis.bin_edge(j))))
            .collect();

        let (origx, origy) = if hints.original {
            (
                (0..=nx).map(|i| xaxis.bin_edge(i)).collect(),
                (0..=ny).map(|j| yaxis.bin_edge(j)).collect(),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        // merge bins whenever the window holds more cells than pixels
        let stride = |cells: usize, span: f64| -> usize {
            if cells == 0 {
                return 1;
            }
            let span = span.abs().max(1.0);
            ((cells as f64 / span).ceil() as usize).max(1)
        };
        let stepi = stride(i2 - i1, grx[i2] - grx[i1]);
        let stepj = stride(j2 - j1, gry[j2] - gry[j1]);

        let mut sumz = 0.0;
        let mut max_density = 0.0;
        let mut i = i1;
        while i < i2 {
            let di = stepi.min(i2 - i);
            let cw = (grx[(i + di).min(nx)] - grx[i]).abs();
            let mut j = j1;
            while j < j2 {
                let dj = stepj.min(j2 - j);
                let ch = (gry[j] - gry[(j + dj).min(ny)]).abs();
                let z = grid.content(i + 1, j + 1);
                sumz += z;
                if hints.pixel_density && cw > 0.0 && ch > 0.0 {
                    max_density = f64::max(max_density, z / cw / ch);
                }
                j += stepj;
            }
            i += stepi;
        }

        Ok(Self {
            i1,
            i2,
            j1,
            j2,
            stepi,
            stepj,
            grx,
            gry,
            origx,
            origy,
            sumz,
            max_density,
        })
    }

    /// Whether the window holds no drawable cell.
    pub fn is_empty(&self) -> bool {
        self.i1 >= self.i2 || self.j1 >= self.j2
    }
}
