//! Grid model for 2D binned data.
//!
//! The public accessor convention is 1-based: `content(i, j)` for
//! `i in 1..=nx`, `j in 1..=ny`. Encoders trust the caller-provided window
//! bounds and perform no additional range checks on the hot path.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Uniform bin axis: `nbins` equal-width bins spanning `[min, max]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BinAxis {
    pub nbins: usize,
    pub min: f64,
    pub max: f64,
}

impl BinAxis {
    pub fn new(nbins: usize, min: f64, max: f64) -> Self {
        Self { nbins, min, max }
    }

    /// Coordinate of a fractional bin index: `0.0` is the low edge of the
    /// axis, `nbins as f64` the high edge.
    pub fn coord(&self, binf: f64) -> f64 {
        if self.nbins == 0 {
            return self.min;
        }
        self.min + binf / self.nbins as f64 * (self.max - self.min)
    }

    /// Center coordinate of 1-based bin `i`.
    pub fn bin_center(&self, i: usize) -> f64 {
        self.coord(i as f64 - 0.5)
    }

    /// Low-edge coordinate of 0-based bin index `i` (`i == nbins` yields the
    /// axis high edge).
    pub fn bin_edge(&self, i: usize) -> f64 {
        self.coord(i as f64)
    }

    pub fn bin_width(&self) -> f64 {
        if self.nbins == 0 {
            0.0
        } else {
            (self.max - self.min) / self.nbins as f64
        }
    }
}

/// Read-only access to a 2D binned data grid.
///
/// Implemented by the host's histogram object; [`DenseGrid`] is the concrete
/// implementation used in tests and simple embedders.
pub trait GridAccessor {
    fn nx(&self) -> usize;
    fn ny(&self) -> usize;

    /// Bin content with 1-based indices (`1..=nx`, `1..=ny`).
    fn content(&self, i: usize, j: usize) -> f64;

    fn x_axis(&self) -> BinAxis;
    fn y_axis(&self) -> BinAxis;
}

/// Dense row-major grid storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseGrid {
    nx: usize,
    ny: usize,
    x_axis: BinAxis,
    y_axis: BinAxis,
    data: Vec<f64>,
}

impl DenseGrid {
    pub fn new(x_axis: BinAxis, y_axis: BinAxis) -> Self {
        let (nx, ny) = (x_axis.nbins, y_axis.nbins);
        Self {
            nx,
            ny,
            x_axis,
            y_axis,
            data: vec![0.0; nx * ny],
        }
    }

    /// Build a grid from rows ordered bottom-to-top: `rows[j][i]` becomes the
    /// content of bin `(i+1, j+1)`.
    pub fn from_rows(x_axis: BinAxis, y_axis: BinAxis, rows: &[Vec<f64>]) -> Self {
        let mut grid = Self::new(x_axis, y_axis);
        for (j, row) in rows.iter().enumerate() {
            for (i, &v) in row.iter().enumerate() {
                grid.set_content(i + 1, j + 1, v);
            }
        }
        grid
    }

    /// Set bin content with 1-based indices.
    pub fn set_content(&mut self, i: usize, j: usize, value: f64) {
        self.data[(j - 1) * self.nx + (i - 1)] = value;
    }
}

impl GridAccessor for DenseGrid {
    fn nx(&self) -> usize {
        self.nx
    }

    fn ny(&self) -> usize {
        self.ny
    }

    fn content(&self, i: usize, j: usize) -> f64 {
        self.data[(j - 1) * self.nx + (i - 1)]
    }

    fn x_axis(&self) -> BinAxis {
        self.x_axis
    }

    fn y_axis(&self) -> BinAxis {
        self.y_axis
    }
}

/// Global content extrema of a grid, computed once per render pass.
#[derive(Debug, Clone, Copy)]
pub struct ContentRange {
    pub min: f64,
    pub max: f64,
    /// Smallest strictly positive content. When the grid holds no positive
    /// bin this falls back to `max * 1e-4` so that log-scale encoders always
    /// have a usable lower bound.
    pub min_positive: f64,
}

impl ContentRange {
    /// Scan the full grid for min / max / min-positive content.
    pub fn scan(grid: &impl GridAccessor) -> Self {
        let (nx, ny) = (grid.nx(), grid.ny());
        if nx == 0 || ny == 0 {
            return Self {
                min: 0.0,
                max: 0.0,
                min_positive: 0.0,
            };
        }

        let mut min = grid.content(1, 1);
        let mut max = min;
        let mut min_positive: Option<f64> = None;

        for i in 1..=nx {
            for j in 1..=ny {
                let z = grid.content(i, j);
                if z < min {
                    min = z;
                } else if z > max {
                    max = z;
                }
                if z > 0.0 && min_positive.map_or(true, |mp| mp > z) {
                    min_positive = Some(z);
                }
            }
        }

        Self {
            min,
            max,
            min_positive: min_positive.unwrap_or(max * 1e-4),
        }
    }

    /// Whether the grid holds anything worth drawing.
    pub fn has_content(&self) -> bool {
        self.max > 0.0
    }
}

/// Result of [`auto_zoom`]: new axis ranges, per axis only when the non-empty
/// region is strictly smaller than the inspected window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoZoom {
    pub x: Option<(f64, f64)>,
    pub y: Option<(f64, f64)>,
}

/// Find the smallest bin rectangle containing all above-minimum content
/// within the 0-based half-open index window `[i1, i2) x [j1, j2)`.
///
/// Returns `None` when the window is degenerate or the grid minimum is
/// positive (every bin counts, so there is nothing to zoom into). A
/// one-bin-wide result is widened by one bin on each side when the window
/// leaves room.
pub fn auto_zoom(
    grid: &impl GridAccessor,
    i1: usize,
    i2: usize,
    j1: usize,
    j2: usize,
) -> Option<AutoZoom> {
    if i1 >= i2 || j1 >= j2 {
        return None;
    }

    let mut min = grid.content(i1 + 1, j1 + 1);
    for i in i1..i2 {
        for j in j1..j2 {
            min = min.min(grid.content(i + 1, j + 1));
        }
    }
    if min > 0.0 {
        return None;
    }

    let (mut ileft, mut iright, mut jleft, mut jright) = (i2, i1, j2, j1);
    for i in i1..i2 {
        for j in j1..j2 {
            if grid.content(i + 1, j + 1) > min {
                ileft = ileft.min(i);
                iright = iright.max(i + 1);
                jleft = jleft.min(j);
                jright = jright.max(j + 1);
            }
        }
    }

    if ileft + 1 == iright && ileft > i1 + 1 && iright < i2 - 1 {
        ileft -= 1;
        iright += 1;
    }
    if jleft + 1 == jright && jleft > j1 + 1 && jright < j2 - 1 {
        jleft -= 1;
        jright += 1;
    }

    let xaxis = grid.x_axis();
    let yaxis = grid.y_axis();

    let x = if (ileft > i1 || iright < i2) && ileft + 1 < iright {
        Some((xaxis.bin_edge(ileft), xaxis.bin_edge(iright)))
    } else {
        None
    };
    let y = if (jleft > j1 || jright < j2) && jleft + 1 < jright {
        Some((yaxis.bin_edge(jleft), yaxis.bin_edge(jright)))
    } else {
        None
    };

    if x.is_none() && y.is_none() {
        None
    } else {
        debug!(?x, ?y, "auto zoom region found");
        Some(AutoZoom { x, y })
    }
}
