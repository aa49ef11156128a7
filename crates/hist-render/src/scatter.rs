//! Scatter bin encoder.
//!
//! Two regimes are chosen by the estimated total point count. Sparse
//! windows stamp individual jittered markers; dense windows instead build
//! one repeating fill pattern per color index whose point density tracks
//! the bin content, bounding output size for very full histograms. Jitter
//! comes from a generator seeded by the window content sum, so repeated
//! passes over unchanged data reproduce the same geometry.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use hist_core::{ContentRange, ContourPalette, DrawOptions, GridAccessor};

use crate::path::SvgPath;
use crate::window::DrawWindow;

/// Estimated point count above which individual markers give way to fill
/// patterns.
pub const DIRECT_DRAW_LIMIT: f64 = 1e5;

/// Stamps one marker glyph at a device position, appending its path
/// commands. Implemented by the host's marker attribute handler.
pub trait MarkerBrush {
    fn stamp(&self, x: f64, y: f64, out: &mut String);
}

/// Simple centered square marker.
#[derive(Debug, Clone, Copy)]
pub struct SquareMarker {
    pub size: f64,
}

impl Default for SquareMarker {
    fn default() -> Self {
        Self { size: 1.0 }
    }
}

impl MarkerBrush for SquareMarker {
    fn stamp(&self, x: f64, y: f64, out: &mut String) {
        let mut p = SvgPath::new();
        let half = (self.size / 2.0).max(0.5);
        p.move_abs(x - half, y - half);
        p.rect_outline(self.size.max(1.0), self.size.max(1.0));
        out.push_str(p.as_str());
    }
}

/// A repeating fill tile for one color index.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterPattern {
    pub color_index: usize,
    /// Tile size in device pixels.
    pub width: f64,
    pub height: f64,
    /// Marker stamps inside one tile.
    pub marker_path: String,
    /// Cells of the window filled with this tile.
    pub cells_path: String,
}

/// Output of one scatter encoding pass.
#[derive(Debug, Clone, Serialize)]
pub enum ScatterGeometry {
    /// Sparse regime: individually stamped markers.
    Markers(String),
    /// Dense regime: per-color fill patterns.
    Patterns(Vec<ScatterPattern>),
}

/// Encode the visible window as a scatter plot.
pub fn encode_scatter_bins(
    grid: &impl GridAccessor,
    win: &DrawWindow,
    palette: &ContourPalette,
    range: &ContentRange,
    opts: &DrawOptions,
    marker: &impl MarkerBrush,
) -> ScatterGeometry {
    let (di, dj) = (win.stepi, win.stepj);
    let scale = opts.scat_coef
        * if range.max > 2000.0 {
            2000.0 / range.max
        } else {
            1.0
        };

    let mut rng = StdRng::seed_from_u64(win.sumz.abs().round() as u64);

    if scale * win.sumz < DIRECT_DRAW_LIMIT {
        // sparse enough for one marker per estimated entry
        let mut path = String::new();
        let mut i = win.i1;
        while i < win.i2 {
            let cw = win.grx[(i + di).min(win.grx.len() - 1)] - win.grx[i];
            let mut j = win.j1;
            while j < win.j2 {
                let ch = win.gry[j] - win.gry[(j + dj).min(win.gry.len() - 1)];
                let binz = grid.content(i + 1, j + 1);

                let npix = (scale * binz).round() as i64;
                if npix <= 0 {
                    j += dj;
                    continue;
                }

                for _ in 0..npix {
                    let x = (win.grx[i] + cw * rng.gen::<f64>()).round();
                    let y = (win.gry[(j + dj).min(win.gry.len() - 1)] + ch * rng.gen::<f64>())
                        .round();
                    marker.stamp(x, y, &mut path);
                }
                j += dj;
            }
            i += di;
        }
        debug!(len = path.len(), "scatter markers encoded");
        return ScatterGeometry::Markers(path);
    }

    // limit the filling factor, do not produce as many points as filled area
    let factor = if win.max_density > 0.7 {
        0.7 / win.max_density
    } else {
        1.0
    };

    let levels = palette.levels();
    let mut cell_paths: Vec<Option<SvgPath>> = Vec::new();
    let mut cell_w: Vec<f64> = Vec::new();
    let mut cell_h: Vec<f64> = Vec::new();

    let mut i = win.i1;
    while i < win.i2 {
        let mut j = win.j1;
        while j < win.j2 {
            let binz = grid.content(i + 1, j + 1);
            if binz <= 0.0 {
                j += dj;
                continue;
            }

            let cw = win.grx[(i + di).min(win.grx.len() - 1)] - win.grx[i];
            let ch = win.gry[j] - win.gry[(j + dj).min(win.gry.len() - 1)];
            if cw * ch <= 0.0 {
                j += dj;
                continue;
            }

            let ci = match palette.contour_index(binz / cw / ch) {
                Some(ci) => ci,
                None => {
                    j += dj;
                    continue;
                }
            };

            if cell_paths.len() <= ci {
                cell_paths.resize_with(ci + 1, || None);
                cell_w.resize(ci + 1, 0.0);
                cell_h.resize(ci + 1, 0.0);
            }

            let top = win.gry[(j + dj).min(win.gry.len() - 1)];
            match &mut cell_paths[ci] {
                slot @ None => {
                    let mut p = SvgPath::new();
                    p.move_abs(win.grx[i], top);
                    p.rect_outline_v(cw, ch);
                    *slot = Some(p);
                    cell_w[ci] = cw;
                    cell_h[ci] = ch;
                }
                Some(p) => {
                    p.move_shortest(win.grx[i], top);
                    p.rect_outline_v(cw, ch);
                    cell_w[ci] = cell_w[ci].max(cw);
                    cell_h[ci] = cell_h[ci].max(ch);
                }
            }

            j += dj;
        }
        i += di;
    }

    let mut patterns = Vec::new();
    for (ci, p) in cell_paths.into_iter().enumerate() {
        let Some(p) = p else { continue };
        if ci >= levels.len() {
            continue;
        }

        let mut npix =
            (factor * levels[ci] * cell_w[ci] * cell_h[ci]).round() as i64;
        if npix < 1 {
            npix = 1;
        }

        let mut marker_path = String::new();
        if npix == 1 {
            marker.stamp(0.5 * cell_w[ci], 0.5 * cell_h[ci], &mut marker_path);
        } else {
            for _ in 0..npix {
                let x = rng.gen::<f64>() * cell_w[ci];
                let y = rng.gen::<f64>() * cell_h[ci];
                marker.stamp(x, y, &mut marker_path);
            }
        }

        patterns.push(ScatterPattern {
            color_index: ci,
            width: cell_w[ci],
            height: cell_h[ci],
            marker_path,
            cells_path: p.into_string(),
        });
    }

    debug!(patterns = patterns.len(), "scatter patterns encoded");
    ScatterGeometry::Patterns(patterns)
}
