//! Per-bin value labels and tooltip lines.

use serde::Serialize;
use tracing::debug;

use hist_core::{format_value, DrawOptions, GridAccessor};

use crate::window::DrawWindow;

/// One label placed inside a bin cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLabel {
    pub x: f64,
    pub y: f64,
    /// Zero when the label is rotated; rotated text anchors at the cell
    /// center instead of filling a box.
    pub width: f64,
    pub height: f64,
    pub text: String,
}

/// Lay out one label per visible bin.
///
/// Zero bins are skipped unless empty bins were requested. `angle` selects
/// the rotated layout.
pub fn encode_text_bins(
    grid: &impl GridAccessor,
    win: &DrawWindow,
    opts: &DrawOptions,
    angle: bool,
) -> Vec<TextLabel> {
    let (di, dj) = (win.stepi, win.stepj);
    let offset = opts.bar_offset;
    let mut labels = Vec::new();

    let mut i = win.i1;
    while i < win.i2 {
        let mut j = win.j1;
        while j < win.j2 {
            let binz = grid.content(i + 1, j + 1);
            if binz == 0.0 && !opts.show_empty_bins {
                j += dj;
                continue;
            }

            let binw = win.grx[(i + di).min(win.grx.len() - 1)] - win.grx[i];
            let binh = win.gry[j] - win.gry[(j + dj).min(win.gry.len() - 1)];
            let top = win.gry[(j + dj).min(win.gry.len() - 1)];
            let text = format_value(binz);

            let label = if angle {
                TextLabel {
                    x: (win.grx[i] + binw * 0.5).round(),
                    y: (top + binh * (0.5 + offset)).round(),
                    width: 0.0,
                    height: 0.0,
                    text,
                }
            } else {
                TextLabel {
                    x: (win.grx[i] + binw * 0.1).round(),
                    y: (top + binh * (0.1 + offset)).round(),
                    width: (binw * 0.8).round(),
                    height: (binh * 0.8).round(),
                    text,
                }
            };
            labels.push(label);
            j += dj;
        }
        i += di;
    }

    debug!(labels = labels.len(), "bin labels laid out");
    labels
}

/// Human-readable lines describing one bin, for hover display. `i`/`j` are
/// 0-based cell indices; contents merged by a stride above 1 are marked as
/// approximate.
pub fn bin_tooltip(grid: &impl GridAccessor, win: &DrawWindow, i: usize, j: usize) -> Vec<String> {
    let (di, dj) = (win.stepi, win.stepj);
    let xa = grid.x_axis();
    let ya = grid.y_axis();

    let axis_tip = |name: &str, lo: f64, hi: f64, step: usize| {
        if step > 1 {
            format!("{name} = [{}, {}]", format_value(lo), format_value(hi))
        } else {
            format!("{name} = {}", format_value(0.5 * (lo + hi)))
        }
    };

    let binz = grid.content(i + 1, j + 1);
    let approx = if di > 1 || dj > 1 { "~" } else { "" };

    vec![
        axis_tip("x", xa.bin_edge(i), xa.bin_edge((i + di).min(grid.nx())), di),
        axis_tip("y", ya.bin_edge(j), ya.bin_edge((j + dj).min(grid.ny())), dj),
        format!("bin = {}, {}", i + 1, j + 1),
        format!("entries = {approx}{}", format_value(binz)),
    ]
}
