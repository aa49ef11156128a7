//! Gradient-arrow encoder.
//!
//! Each visible cell gets an arrow along the local content gradient,
//! estimated by central differences (one-sided at the window edges). A first
//! pass finds the largest gradient component so every arrow fits inside its
//! cell; the second pass emits the shafts and, for long enough arrows, the
//! two head strokes.

use tracing::debug;

use hist_core::GridAccessor;

use crate::path::SvgPath;
use crate::window::DrawWindow;

/// Encode the visible window as one path of gradient arrows.
pub fn encode_arrow_bins(grid: &impl GridAccessor, win: &DrawWindow) -> String {
    let (i1, i2, j1, j2) = (win.i1, win.i2, win.j1, win.j2);
    let (di, dj) = (win.stepi, win.stepj);
    let (nx, ny) = (grid.nx(), grid.ny());

    let scale_x = (win.grx[i2] - win.grx[i1]) / ((i2 - i1) as f64 + 1.0 - 0.03) / 2.0;
    let scale_y = (win.gry[j2] - win.gry[j1]) / ((j2 - j1) as f64 + 1.0 - 0.03) / 2.0;

    // contents outside the grid count as empty
    let at = |bi: usize, bj: usize| -> f64 {
        if (1..=nx).contains(&bi) && (1..=ny).contains(&bj) {
            grid.content(bi, bj)
        } else {
            0.0
        }
    };
    let gradient = |i: usize, j: usize| -> (f64, f64) {
        let dx = if i == i1 {
            at(i + 1 + di, j + 1) - at(i + 1, j + 1)
        } else if i >= i2 - di {
            at(i + 1, j + 1) - at(i + 1 - di, j + 1)
        } else {
            0.5 * (at(i + 1 + di, j + 1) - at(i + 1 - di, j + 1))
        };
        let dy = if j == j1 {
            at(i + 1, j + 1 + dj) - at(i + 1, j + 1)
        } else if j >= j2 - dj {
            at(i + 1, j + 1) - at(i + 1, j + 1 - dj)
        } else {
            0.5 * (at(i + 1, j + 1 + dj) - at(i + 1, j + 1 - dj))
        };
        (dx, dy)
    };

    let mut dn = 1e-30f64;
    let mut i = i1;
    while i < i2 {
        let mut j = j1;
        while j < j2 {
            let (dx, dy) = gradient(i, j);
            dn = dn.max(dx.abs()).max(dy.abs());
            j += dj;
        }
        i += di;
    }

    let mut path = SvgPath::new();
    let mut i = i1;
    while i < i2 {
        let mut j = j1;
        while j < j2 {
            let (dx, dy) = gradient(i, j);

            let xc = 0.5 * (win.grx[i] + win.grx[(i + di).min(nx)]);
            let yc = 0.5 * (win.gry[j] + win.gry[(j + dj).min(ny)]);
            let dxn = scale_x * dx / dn;
            let dyn_ = scale_y * dy / dn;
            let x1 = xc - dxn;
            let y1 = yc - dyn_;
            let ddx = (2.0 * dxn).round();
            let ddy = (2.0 * dyn_).round();

            if ddx != 0.0 || ddy != 0.0 {
                path.move_abs(x1.round(), y1.round());
                path.line_delta(ddx, ddy);

                if ddx.abs() > 5.0 || ddy.abs() > 5.0 {
                    let anr = (2.0 / (ddx * ddx + ddy * ddy)).sqrt();
                    let si = (anr * (ddx + ddy)).round();
                    let co = (anr * (ddx - ddy)).round();
                    if si != 0.0 || co != 0.0 {
                        path.move_delta(-si, co);
                        path.line_delta(si, -co);
                        path.line_delta(-co, -si);
                    }
                }
            }
            j += dj;
        }
        i += di;
    }

    debug!(len = path.len(), "arrow field encoded");
    path.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{DrawWindow, LinearFrame, WindowHints};
    use hist_core::{BinAxis, DenseGrid, ZoomSelect};

    fn window(grid: &DenseGrid) -> DrawWindow {
        let frame = LinearFrame::for_grid(grid, 100.0, 100.0);
        let hints = WindowHints {
            rounding: false,
            ..Default::default()
        };
        DrawWindow::prepare(grid, &frame, &ZoomSelect::full(grid), &hints).unwrap()
    }

    #[test]
    fn test_flat_grid_draws_nothing() {
        let ax = BinAxis::new(3, 0.0, 3.0);
        let mut grid = DenseGrid::new(ax, ax);
        for i in 1..=3 {
            for j in 1..=3 {
                grid.set_content(i, j, 2.0);
            }
        }
        let win = window(&grid);
        assert!(encode_arrow_bins(&grid, &win).is_empty());
    }

    #[test]
    fn test_gradient_produces_arrows() {
        let ax = BinAxis::new(4, 0.0, 4.0);
        let mut grid = DenseGrid::new(ax, ax);
        for i in 1..=4 {
            for j in 1..=4 {
                grid.set_content(i, j, i as f64 * 10.0);
            }
        }
        let win = window(&grid);
        let path = encode_arrow_bins(&grid, &win);
        assert!(path.starts_with('M'));
        // steepest-gradient arrows span their cell and carry a head
        assert!(path.contains('m'));
    }

    #[test]
    fn test_arrows_deterministic() {
        let ax = BinAxis::new(5, 0.0, 5.0);
        let mut grid = DenseGrid::new(ax, ax);
        for i in 1..=5 {
            for j in 1..=5 {
                grid.set_content(i, j, (i * j) as f64);
            }
        }
        let win = window(&grid);
        assert_eq!(encode_arrow_bins(&grid, &win), encode_arrow_bins(&grid, &win));
    }
}
