//! Area-proportional box encoder.
//!
//! Each bin becomes a rectangle whose area is proportional to the absolute
//! content, scaled between the frame's z-range (falling back to the global
//! content range when that is degenerate). Three sub-modes share the same
//! geometry: plain outlines, a diagonal cross on negative bins (style 10),
//! and a split bevel overlay distinguishing sign by two shades (style 11).

use serde::Serialize;

use hist_core::{ContentRange, GridAccessor};

use crate::path::SvgPath;
use crate::window::DrawWindow;

/// The hosting frame's z-axis range for box scaling.
#[derive(Debug, Clone, Copy)]
pub struct ZScale {
    pub min: f64,
    pub max: f64,
    pub min_positive: f64,
    /// Logarithmic z axis requested by the host.
    pub log: bool,
}

/// Output of one box encoding pass. Paths are empty strings when the
/// corresponding sub-mode produced nothing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BoxGeometry {
    /// Box outlines for every drawn bin.
    pub boxes: String,
    /// Diagonal crosses over negative bins (style 10 only).
    pub cross: String,
    /// Bevel faces drawn in the brighter shade (style 11 only).
    pub bevel_light: String,
    /// Bevel faces drawn in the darker shade (style 11 only).
    pub bevel_dark: String,
}

/// Resolve the effective z bounds for box scaling.
///
/// A degenerate frame range (`max == min`) falls back to the global content
/// range; a still-degenerate range forces a synthetic minimum strictly below
/// the maximum so the area-scaling denominator never vanishes.
pub fn corrected_z_bounds(zscale: &ZScale, range: &ContentRange) -> (f64, f64, f64) {
    let (mut min, mut max, mut min_positive) = (zscale.min, zscale.max, zscale.min_positive);
    if max == min {
        min = range.min;
        max = range.max;
        min_positive = range.min_positive;
    }
    if max == min {
        min = 0.0f64.min(max - 1.0);
    }
    (min, max, min_positive)
}

/// Encode the visible window as area-proportional boxes.
pub fn encode_box_bins(
    grid: &impl GridAccessor,
    win: &DrawWindow,
    zscale: &ZScale,
    range: &ContentRange,
    box_style: u32,
) -> BoxGeometry {
    let (minbin, maxbin, minposbin) = corrected_z_bounds(zscale, range);
    let absmax = maxbin.abs().max(minbin.abs());
    let absmin = minbin.max(0.0);

    let (uselogz, logmin, xyfactor) = if zscale.log && absmax > 0.0 {
        let logmax = absmax.ln();
        let mut logmin = if absmin > 0.0 {
            absmin.ln()
        } else if (1.0..100.0).contains(&minposbin) {
            0.7f64.ln()
        } else if minposbin > 0.0 {
            (0.7 * minposbin).ln()
        } else {
            logmax - 10.0
        };
        if logmin >= logmax {
            logmin = logmax - 10.0;
        }
        (true, logmin, 1.0 / (logmax - logmin))
    } else {
        (false, 0.0, 1.0 / (absmax - absmin))
    };

    let (di, dj) = (win.stepi, win.stepj);
    let mut geom = BoxGeometry::default();
    let mut boxes = SvgPath::new();
    let mut cross = SvgPath::new();
    let mut light = SvgPath::new();
    let mut dark = SvgPath::new();

    let mut i = win.i1;
    while i < win.i2 {
        let mut j = win.j1;
        while j < win.j2 {
            let binz = grid.content(i + 1, j + 1);
            let absz = binz.abs();
            if absz == 0.0 || absz < absmin {
                j += dj;
                continue;
            }

            let zdiff = if uselogz {
                if absz > 0.0 {
                    absz.ln() - logmin
                } else {
                    0.0
                }
            } else {
                absz - absmin
            };
            // box area proportional to the absolute content
            let mut zdiff = 0.5
                * if zdiff < 0.0 {
                    1.0
                } else {
                    1.0 - (zdiff * xyfactor).sqrt()
                };
            if zdiff < 0.0 {
                zdiff = 0.0;
            }

            let ww = win.grx[(i + di).min(win.grx.len() - 1)] - win.grx[i];
            let hh = win.gry[j] - win.gry[(j + dj).min(win.gry.len() - 1)];

            let dgrx = zdiff * ww;
            let dgry = zdiff * hh;

            let xx = (win.grx[i] + dgrx).round();
            let yy = (win.gry[(j + dj).min(win.gry.len() - 1)] + dgry).round();

            let ww = (ww - 2.0 * dgrx).round().max(1.0);
            let hh = (hh - 2.0 * dgry).round().max(1.0);

            boxes.move_abs(xx, yy);
            boxes.rect_outline_v(ww, hh);

            if binz < 0.0 && box_style == 10 {
                cross.move_abs(xx, yy);
                cross.line_delta(ww, hh);
                cross.move_abs(xx + ww, yy);
                cross.line_delta(-ww, hh);
            }

            if box_style == 11 && ww > 5.0 && hh > 5.0 {
                let pww = (ww * 0.1).round();
                let phh = (hh * 0.1).round();
                let (side1, side2) = bevel_sides(xx, yy, ww, hh, pww, phh);
                if binz < 0.0 {
                    dark.append_path(&side1);
                    light.append_path(&side2);
                } else {
                    light.append_path(&side1);
                    dark.append_path(&side2);
                }
            }

            j += dj;
        }
        i += di;
    }

    geom.boxes = boxes.into_string();
    geom.cross = cross.into_string();
    geom.bevel_light = light.into_string();
    geom.bevel_dark = dark.into_string();
    geom
}

/// Build the two complementary bevel faces of one box: the top/left face and
/// the bottom/right face.
fn bevel_sides(xx: f64, yy: f64, ww: f64, hh: f64, pww: f64, phh: f64) -> (SvgPath, SvgPath) {
    let mut side1 = SvgPath::new();
    side1.move_abs(xx, yy);
    side1.line_delta(ww, 0.0);
    side1.line_delta(-pww, phh);
    side1.line_delta(2.0 * pww - ww, 0.0);
    side1.line_delta(0.0, hh - 2.0 * phh);
    side1.line_delta(-pww, phh);
    side1.close();

    let mut side2 = SvgPath::new();
    side2.move_abs(xx + ww, yy + hh);
    side2.line_delta(0.0, -hh);
    side2.line_delta(-pww, phh);
    side2.line_delta(0.0, hh - 2.0 * phh);
    side2.line_delta(2.0 * pww - ww, 0.0);
    side2.line_delta(-pww, phh);
    side2.close();

    (side1, side2)
}
