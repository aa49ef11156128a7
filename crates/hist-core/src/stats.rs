//! Windowed statistics over a 2D grid.

use tracing::debug;

use crate::grid::GridAccessor;
use crate::value_fmt::format_value;

/// Total weight below which the moment accumulation is considered degenerate
/// and means / RMS stay at zero.
const MIN_TOTAL_WEIGHT: f64 = 1e-300;

/// The currently zoomed bin-index range along both axes, 0-based half-open:
/// bin index `idx` is inside on x when `x_left <= idx < x_right`.
#[derive(Debug, Clone, Copy)]
pub struct ZoomSelect {
    pub x_left: usize,
    pub x_right: usize,
    pub y_left: usize,
    pub y_right: usize,
}

impl ZoomSelect {
    /// Selection covering the whole grid.
    pub fn full(grid: &impl GridAccessor) -> Self {
        Self {
            x_left: 0,
            x_right: grid.nx(),
            y_left: 0,
            y_right: grid.ny(),
        }
    }
}

/// Aggregate statistics of one render pass.
///
/// `matrix` holds the summed content of the 9 regions formed by crossing
/// {below, inside, above} the zoomed x-range with the same for y, indexed
/// `yside * 3 + xside` (side 0 = below, 1 = inside, 2 = above). `matrix[4]`
/// is therefore the visible integral.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    pub entries: f64,
    pub integral: f64,
    pub meanx: f64,
    pub meany: f64,
    pub rmsx: f64,
    pub rmsy: f64,
    pub matrix: [f64; 9],
    pub xmax: f64,
    pub ymax: f64,
    pub wmax: f64,
}

/// Compute statistics of the grid against the zoom selection.
///
/// The 9-region matrix accumulates every bin; first and second moments, and
/// the maximum-weight bin, only accumulate bins inside on both axes that
/// also satisfy `cond` when given. A near-zero total weight leaves means and
/// RMS at zero rather than dividing.
pub fn compute_stats(
    grid: &impl GridAccessor,
    select: &ZoomSelect,
    cond: Option<&dyn Fn(f64, f64) -> bool>,
) -> Stats {
    let mut res = Stats::default();
    let (mut sum0, mut sumx1, mut sumy1, mut sumx2, mut sumy2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    let mut wmax: Option<f64> = None;

    let xaxis = grid.x_axis();
    let yaxis = grid.y_axis();

    for xi in 1..=grid.nx() {
        let idx = xi - 1;
        let xside = if idx < select.x_left {
            0
        } else if idx >= select.x_right {
            2
        } else {
            1
        };
        let xx = xaxis.bin_center(xi);

        for yi in 1..=grid.ny() {
            let jdx = yi - 1;
            let yside = if jdx < select.y_left {
                0
            } else if jdx >= select.y_right {
                2
            } else {
                1
            };
            let yy = yaxis.bin_center(yi);

            let zz = grid.content(xi, yi);

            res.entries += zz;
            res.matrix[yside * 3 + xside] += zz;

            if xside != 1 || yside != 1 {
                continue;
            }
            if let Some(cond) = cond {
                if !cond(xx, yy) {
                    continue;
                }
            }

            if wmax.map_or(true, |w| zz > w) {
                wmax = Some(zz);
                res.xmax = xx;
                res.ymax = yy;
            }

            sum0 += zz;
            sumx1 += xx * zz;
            sumy1 += yy * zz;
            sumx2 += xx * xx * zz;
            sumy2 += yy * yy * zz;
        }
    }

    if sum0.abs() > MIN_TOTAL_WEIGHT {
        res.meanx = sumx1 / sum0;
        res.meany = sumy1 / sum0;
        res.rmsx = (sumx2 / sum0 - res.meanx * res.meanx).abs().sqrt();
        res.rmsy = (sumy2 / sum0 - res.meany * res.meany).abs().sqrt();
    }

    res.wmax = wmax.unwrap_or(0.0);
    res.integral = sum0;
    debug!(entries = res.entries, integral = res.integral, "stats computed");
    res
}

/// Format statistics into statbox text lines.
///
/// `dostat` packs one decimal digit per element, mirroring the classic
/// histogram convention: 1 name, 10 entries, 100 means, 1000 std devs,
/// 10000 underflow row, 100000 overflow row, 1e6 integral, 1e7 skewness,
/// 1e8 kurtosis. Skewness and kurtosis are placeholders.
pub fn stat_lines(data: &Stats, name: &str, dostat: u32) -> Vec<String> {
    let digit = |pos: u32| (dostat / 10u32.pow(pos)) % 10;
    let mut lines = Vec::new();

    if digit(0) > 0 {
        lines.push(name.to_string());
    }
    if digit(1) > 0 {
        lines.push(format!("Entries = {}", format_value(data.entries)));
    }
    if digit(2) > 0 {
        lines.push(format!("Mean x = {}", format_value(data.meanx)));
        lines.push(format!("Mean y = {}", format_value(data.meany)));
    }
    if digit(3) > 0 {
        lines.push(format!("Std Dev x = {}", format_value(data.rmsx)));
        lines.push(format!("Std Dev y = {}", format_value(data.rmsy)));
    }
    if digit(6) > 0 {
        lines.push(format!("Integral = {}", format_value(data.matrix[4])));
    }
    if digit(7) > 0 {
        lines.push("Skewness x = <undef>".to_string());
        lines.push("Skewness y = <undef>".to_string());
    }
    if digit(8) > 0 {
        lines.push("Kurt = <undef>".to_string());
    }
    if digit(4) > 0 || digit(5) > 0 {
        let m = &data.matrix;
        // rows top to bottom: above-y, inside-y, below-y
        lines.push(format!("{:.0} | {:.0} | {:.0}", m[6], m[7], m[8]));
        lines.push(format!("{:.0} | {:.0} | {:.0}", m[3], m[4], m[5]));
        lines.push(format!("{:.0} | {:.0} | {:.0}", m[0], m[1], m[2]));
    }

    lines
}
