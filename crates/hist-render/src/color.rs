//! Flat-color bin encoder.
//!
//! Each visible cell resolves to a contour color index; one path buffer is
//! kept per observed index. Vertically adjacent cells of the same color in
//! the same column merge into a single taller rectangle, which keeps the
//! path cardinality proportional to color runs rather than cells.

use serde::Serialize;

use hist_core::{ContourPalette, DrawOptions, GridAccessor};

use crate::path::SvgPath;
use crate::window::DrawWindow;

/// Per-color-index path buffers produced by one color encoding pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ColorGeometry {
    /// Indexed by color index; `None` where no cell resolved to that color.
    pub paths: Vec<Option<String>>,
}

impl ColorGeometry {
    /// Iterate populated color indices with their path data.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.paths
            .iter()
            .enumerate()
            .filter_map(|(ci, p)| p.as_deref().map(|d| (ci, d)))
    }

    pub fn populated(&self) -> usize {
        self.paths.iter().filter(|p| p.is_some()).count()
    }
}

struct Entry {
    path: SvgPath,
    /// Top edge of the pending merged rectangle run.
    y: f64,
    /// Bottom edge of the pending merged rectangle run.
    y2: f64,
}

/// Encode the visible window as per-color filled rectangles.
///
/// `legend_refresh` is invoked exactly once per pass so the host can update
/// its palette/legend display.
pub fn encode_color_bins(
    grid: &impl GridAccessor,
    win: &DrawWindow,
    palette: &ContourPalette,
    opts: &DrawOptions,
    mut legend_refresh: impl FnMut(),
) -> ColorGeometry {
    let (di, dj) = (win.stepi, win.stepj);
    let mut entries: Vec<Option<Entry>> = Vec::new();
    // color index of the entry with a pending vertical merge run
    let mut last: Option<usize> = None;

    let flush = |entries: &mut Vec<Option<Entry>>, last: &mut Option<usize>, dx: f64| {
        if let Some(entry) = last.take().and_then(|ci| entries[ci].as_mut()) {
            let height = entry.y2 - entry.y;
            entry.path.rect_outline(dx, height);
        }
    };

    let mut i = win.i1;
    while i < win.i2 {
        let mut dx = win.grx[(i + di).min(win.grx.len() - 1)] - win.grx[i];
        if dx == 0.0 {
            dx = 1.0;
        }

        let mut j = win.j1;
        while j < win.j2 {
            let binz = grid.content(i + 1, j + 1);
            let mut colindx = palette.contour_index(binz);
            if binz == 0.0 {
                if !opts.draw_zeros {
                    colindx = None;
                } else if colindx.is_none() && opts.show_empty_bins {
                    colindx = Some(0);
                }
            }

            let ci = match colindx {
                Some(ci) => ci,
                None => {
                    flush(&mut entries, &mut last, dx);
                    j += dj;
                    continue;
                }
            };

            let mut dy = win.gry[(j + dj).min(win.gry.len() - 1)] - win.gry[j];
            if dy == 0.0 {
                dy = -1.0;
            }

            if entries.len() <= ci {
                entries.resize_with(ci + 1, || None);
            }

            match &mut entries[ci] {
                slot @ None => {
                    let mut path = SvgPath::new();
                    path.move_abs(win.grx[i], win.gry[j]);
                    *slot = Some(Entry {
                        path,
                        y: win.gry[j],
                        y2: win.gry[j] + dy,
                    });
                }
                Some(entry) => {
                    if last == Some(ci) {
                        // extend the pending run downwards
                        entry.y2 = win.gry[j] + dy;
                        j += dj;
                        continue;
                    }
                    entry.path.move_shortest(win.grx[i], win.gry[j]);
                    entry.y = win.gry[j];
                    entry.y2 = win.gry[j] + dy;
                }
            }
            // any pending run is for a different color, close it out
            flush(&mut entries, &mut last, dx);
            last = Some(ci);
            j += dj;
        }
        flush(&mut entries, &mut last, dx);
        i += di;
    }

    legend_refresh();

    ColorGeometry {
        paths: entries
            .into_iter()
            .map(|e| e.map(|e| e.path.into_string()))
            .collect(),
    }
}
