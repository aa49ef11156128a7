//! Marching-squares contour builder with polygon stitching.
//!
//! Each 2x2 block of neighboring cell centers is classified against the
//! level set; blocks whose corners straddle a level contribute crossing
//! segments along their edges, collected per level. A second stage stitches
//! segments sharing endpoints into longer chains and hands each chain to the
//! caller. Coordinates are rounded to whole pixels before stitching so that
//! endpoint matching is exact.

use serde::Serialize;
use tracing::debug;

use hist_core::{validate_levels, ContourPalette, ContourStyle, GridAccessor, RenderResult};

use crate::path::write_coord;
use crate::window::DrawWindow;

/// Per-level point-pair capacity of one 2x2 block scan.
pub const MAX_CONTOUR_POINTS: usize = 2004;

/// Upper bound on endpoint-reorder iterations for one block; blocks that
/// exceed it are skipped rather than looping forever on degenerate input.
pub const MAX_REORDER_STEPS: usize = 2000;

const POLY_CAPACITY: usize = 4 * MAX_CONTOUR_POINTS;

/// One stitched chain of contour points at a single level. Closed when the
/// first and last points coincide.
#[derive(Debug, Clone)]
pub struct ContourLoop {
    pub level_index: usize,
    pub points: Vec<(f64, f64)>,
}

/// Crossing-segment scratch shared by the two diagonal edge walks of one
/// block. Walk one fills even slots, walk two the odd slots, so consecutive
/// pairs describe one segment each.
struct EdgeScratch {
    xarr: Vec<f64>,
    yarr: Vec<f64>,
    itarr: Vec<i32>,
    lj: usize,
}

impl EdgeScratch {
    fn new() -> Self {
        Self {
            xarr: vec![0.0; 2 * MAX_CONTOUR_POINTS],
            yarr: vec![0.0; 2 * MAX_CONTOUR_POINTS],
            itarr: vec![0; 2 * MAX_CONTOUR_POINTS],
            lj: 0,
        }
    }

    /// Interpolate every level crossing along one block edge, returning the
    /// number of crossings written.
    #[allow(clippy::too_many_arguments)]
    fn fill_edge(
        &mut self,
        levels: &[f64],
        elev1: f64,
        icont1: i32,
        x1: f64,
        y1: f64,
        elev2: f64,
        icont2: i32,
        x2: f64,
        y2: f64,
    ) -> usize {
        let vert = x1 == x2;
        let tlen = if vert { y2 - y1 } else { x2 - x1 };
        let tdif = elev2 - elev1;
        let mut n = icont1 + 1;
        let mut ii = self.lj - 1;
        let maxii = MAX_CONTOUR_POINTS / 2 - 3 + self.lj;
        let mut icount = 0;

        while n <= icont2 && ii <= maxii {
            let elev = levels[n as usize];
            let xlen = tlen * (elev - elev1) / tdif;
            if vert {
                self.xarr[ii] = x1;
                self.yarr[ii] = y1 + xlen;
            } else {
                self.xarr[ii] = x1 + xlen;
                self.yarr[ii] = y1;
            }
            self.itarr[ii] = n;
            icount += 1;
            ii += 2;
            n += 1;
        }
        icount
    }
}

/// Raw segment store for one level, filled block by block.
struct LevelPoly {
    xx: Vec<f64>,
    yy: Vec<f64>,
}

/// Find the interval index of a value in the level set: the largest `k` with
/// `levels[k] <= v`, or -1 below the first level.
fn level_index(levels: &[f64], v: f64) -> i32 {
    for (k, &lev) in levels.iter().enumerate() {
        if v < lev {
            return k as i32 - 1;
        }
    }
    levels.len() as i32 - 1
}

/// Scan the window for level crossings and deliver stitched chains to
/// `sink`, filled levels in paint order: levels below the first non-negative
/// one from the inside out, then the rest ascending.
pub fn build_contours(
    grid: &impl GridAccessor,
    win: &DrawWindow,
    levels: &[f64],
    mut sink: impl FnMut(ContourLoop),
) -> RenderResult<()> {
    validate_levels(levels)?;

    let (di, dj) = (win.stepi, win.stepj);
    let (i1, i2, j1, j2) = (win.i1, win.i2, win.j1, win.j2);
    // a block needs two cell centers per axis
    if i2 - i1 <= di || j2 - j1 <= dj {
        return Ok(());
    }

    let (arrx, arry): (&[f64], &[f64]) = if !win.origx.is_empty() {
        (&win.origx, &win.origy)
    } else {
        (&win.grx, &win.gry)
    };
    let (nx, ny) = (grid.nx(), grid.ny());

    let mut scratch = EdgeScratch::new();
    let mut polys: Vec<Option<LevelPoly>> = (0..levels.len()).map(|_| None).collect();
    let mut npmax = 0usize;

    let mut j = j1;
    while j + dj < j2 {
        let y01 = 0.5 * (arry[j] + arry[j + dj]);
        let y23 = 0.5 * (arry[j + dj] + arry[(j + 2 * dj).min(ny)]);
        let y = [y01, y01, y23, y23];

        let mut i = i1;
        while i + di < i2 {
            let zc = [
                grid.content(i + 1, j + 1),
                grid.content(i + 1 + di, j + 1),
                grid.content(i + 1 + di, j + 1 + dj),
                grid.content(i + 1, j + 1 + dj),
            ];
            let ir = [
                level_index(levels, zc[0]),
                level_index(levels, zc[1]),
                level_index(levels, zc[2]),
                level_index(levels, zc[3]),
            ];

            if ir[0] == ir[1] && ir[1] == ir[2] && ir[2] == ir[3] {
                i += di;
                continue;
            }

            let x03 = 0.5 * (arrx[i] + arrx[i + di]);
            let x12 = 0.5 * (arrx[i + di] + arrx[(i + 2 * di).min(nx)]);
            let x = [x03, x12, x12, x03];

            let start = {
                let mut n = if zc[0] <= zc[1] { 0 } else { 1 };
                let m = if zc[2] <= zc[3] { 2 } else { 3 };
                if zc[n] > zc[m] {
                    n = m;
                }
                n + 1
            };

            // clockwise walk from the lowest corner, even slots
            scratch.lj = 1;
            let mut n = start;
            for _ in 0..4 {
                let m = n % 4 + 1;
                let filled = scratch.fill_edge(
                    levels,
                    zc[n - 1],
                    ir[n - 1],
                    x[n - 1],
                    y[n - 1],
                    zc[m - 1],
                    ir[m - 1],
                    x[m - 1],
                    y[m - 1],
                );
                scratch.lj += 2 * filled;
                n = m;
            }

            // counter-clockwise walk, odd slots
            scratch.lj = 2;
            let mut n = start;
            for _ in 0..4 {
                let m = if n == 1 { 4 } else { n - 1 };
                let filled = scratch.fill_edge(
                    levels,
                    zc[n - 1],
                    ir[n - 1],
                    x[n - 1],
                    y[n - 1],
                    zc[m - 1],
                    ir[m - 1],
                    x[m - 1],
                    y[m - 1],
                );
                scratch.lj += 2 * filled;
                n = m;
            }
            let lj = scratch.lj;

            // pair up endpoints of the same level
            let mut count = 0usize;
            let mut ix = 1;
            while lj >= 5 && ix <= lj - 5 {
                while scratch.itarr[ix - 1] != scratch.itarr[ix] {
                    let xsave = scratch.xarr[ix];
                    let ysave = scratch.yarr[ix];
                    let itsave = scratch.itarr[ix];
                    let mut jx = ix;
                    while jx <= lj - 5 {
                        scratch.xarr[jx] = scratch.xarr[jx + 2];
                        scratch.yarr[jx] = scratch.yarr[jx + 2];
                        scratch.itarr[jx] = scratch.itarr[jx + 2];
                        jx += 2;
                    }
                    scratch.xarr[lj - 3] = xsave;
                    scratch.yarr[lj - 3] = ysave;
                    scratch.itarr[lj - 3] = itsave;
                    if count > MAX_REORDER_STEPS {
                        break;
                    }
                    count += 1;
                }
                if count > MAX_REORDER_STEPS {
                    break;
                }
                ix += 2;
            }
            if count > MAX_REORDER_STEPS {
                debug!(i, j, "skipping degenerate contour block");
                i += di;
                continue;
            }

            let mut ix = 1;
            while ix + 1 <= lj - 1 {
                let ipoly = scratch.itarr[ix - 1];
                if ipoly >= 0 && (ipoly as usize) < levels.len() {
                    let poly = polys[ipoly as usize].get_or_insert_with(|| LevelPoly {
                        xx: Vec::new(),
                        yy: Vec::new(),
                    });
                    if poly.xx.len() + 2 <= POLY_CAPACITY {
                        poly.xx.push(scratch.xarr[ix - 1].round());
                        poly.yy.push(scratch.yarr[ix - 1].round());
                        poly.xx.push(scratch.xarr[ix].round());
                        poly.yy.push(scratch.yarr[ix].round());
                        npmax = npmax.max(poly.xx.len());
                    }
                }
                ix += 2;
            }

            i += di;
        }
        j += dj;
    }

    if npmax == 0 {
        return Ok(());
    }

    // paint filled levels inside out: below the first non-negative level in
    // descending order, then ascending
    let first = levels.iter().position(|&lev| lev >= 0.0).unwrap_or(0);
    let order = (0..first).rev().chain(first..levels.len());

    let mut xp = vec![0.0f64; 2 * npmax];
    let mut yp = vec![0.0f64; 2 * npmax];
    let mut emitted = 0usize;

    for ipoly in order {
        let Some(poly) = polys[ipoly].take() else {
            continue;
        };
        let (mut xx, mut yy) = (poly.xx, poly.yy);
        let np = xx.len();
        let mut istart = 0usize;

        loop {
            let mut iminus = npmax;
            let mut iplus = npmax + 1;
            xp[iminus] = xx[istart];
            yp[iminus] = yy[istart];
            xp[iplus] = xx[istart + 1];
            yp[iplus] = yy[istart + 1];
            xx[istart] = 0.0;
            yy[istart] = 0.0;
            xx[istart + 1] = 0.0;
            yy[istart + 1] = 0.0;

            loop {
                let mut nadd = 0;
                let mut i = 2;
                while i + 1 < np {
                    if iplus < 2 * npmax - 1 && xx[i] == xp[iplus] && yy[i] == yp[iplus] {
                        iplus += 1;
                        xp[iplus] = xx[i + 1];
                        yp[iplus] = yy[i + 1];
                        xx[i] = 0.0;
                        yy[i] = 0.0;
                        xx[i + 1] = 0.0;
                        yy[i + 1] = 0.0;
                        nadd += 1;
                    }
                    if iminus > 0 && xx[i + 1] == xp[iminus] && yy[i + 1] == yp[iminus] {
                        iminus -= 1;
                        xp[iminus] = xx[i];
                        yp[iminus] = yy[i];
                        xx[i] = 0.0;
                        yy[i] = 0.0;
                        xx[i + 1] = 0.0;
                        yy[i + 1] = 0.0;
                        nadd += 1;
                    }
                    i += 2;
                }
                if nadd == 0 {
                    break;
                }
            }

            // a seeded segment always yields two points, the minimum chain
            if iminus < iplus {
                emitted += 1;
                sink(ContourLoop {
                    level_index: ipoly,
                    points: (iminus..=iplus).map(|k| (xp[k], yp[k])).collect(),
                });
            }

            istart = 0;
            let mut i = 2;
            while i + 1 < np {
                if xx[i] != 0.0 && yy[i] != 0.0 {
                    istart = i;
                    break;
                }
                i += 2;
            }
            if istart == 0 {
                break;
            }
        }
    }

    debug!(levels = levels.len(), chains = emitted, "contours stitched");
    Ok(())
}

/// One drawable contour shape: a path with its palette color and the fill /
/// dash treatment its style calls for.
#[derive(Debug, Clone, Serialize)]
pub struct ContourShape {
    pub color_index: usize,
    pub level_index: usize,
    pub fill: bool,
    /// Dash pattern cycle position, dashed-line style only.
    pub dash: Option<u32>,
    pub path: String,
}

/// Build the path of one stitched chain; closed chains end in `z`, and open
/// chains are closed only when they will be filled. Chains that never leave
/// their starting point produce an empty path.
fn loop_path(points: &[(f64, f64)], mut do_close: bool) -> String {
    let mut cmd = String::new();
    let mut first = (0.0, 0.0);
    let mut last = (0.0, 0.0);
    let mut isany = false;

    for (idx, &(px, py)) in points.iter().enumerate() {
        let p = (px.round(), py.round());
        if cmd.is_empty() {
            cmd.push('M');
            write_coord(&mut cmd, p.0);
            cmd.push(',');
            write_coord(&mut cmd, p.1);
            first = p;
        } else if idx + 1 == points.len() && p == first {
            if !isany {
                return String::new();
            }
            cmd.push('z');
            do_close = false;
        } else if p.0 != last.0 && p.1 != last.1 {
            cmd.push('l');
            write_coord(&mut cmd, p.0 - last.0);
            cmd.push(',');
            write_coord(&mut cmd, p.1 - last.1);
            isany = true;
        } else if p.0 != last.0 {
            cmd.push('h');
            write_coord(&mut cmd, p.0 - last.0);
            isany = true;
        } else if p.1 != last.1 {
            cmd.push('v');
            write_coord(&mut cmd, p.1 - last.1);
            isany = true;
        }
        last = p;
    }
    if do_close {
        cmd.push('z');
    }
    cmd
}

/// Encode the visible window as contour shapes in paint order.
pub fn encode_contour_bins(
    grid: &impl GridAccessor,
    win: &DrawWindow,
    palette: &ContourPalette,
    style: ContourStyle,
    frame_w: f64,
    frame_h: f64,
) -> RenderResult<Vec<ContourShape>> {
    let mut shapes = Vec::new();

    if style == ContourStyle::FrameFilled {
        // backdrop in the lowest palette color, overdrawn by the levels
        let mut d = String::from("M0,0h");
        write_coord(&mut d, frame_w);
        d.push('v');
        write_coord(&mut d, frame_h);
        d.push('h');
        write_coord(&mut d, -frame_w);
        d.push('z');
        shapes.push(ContourShape {
            color_index: 0,
            level_index: 0,
            fill: true,
            dash: None,
            path: d,
        });
    }

    build_contours(grid, win, palette.levels(), |chain| {
        let fill = style.is_filled();
        let path = loop_path(&chain.points, fill);
        if path.is_empty() {
            return;
        }
        let dash = match style {
            ContourStyle::DashedLines => Some((chain.level_index % 5) as u32 + 1),
            _ => None,
        };
        shapes.push(ContourShape {
            color_index: chain.level_index,
            level_index: chain.level_index,
            fill,
            dash,
            path,
        });
    })?;

    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{DrawWindow, LinearFrame, WindowHints};
    use hist_core::{BinAxis, Color, ContourPalette, DenseGrid, ZoomSelect};

    fn midline_palette() -> ContourPalette {
        ContourPalette::new(vec![5.0], vec![Color::new(0, 0, 0, 255)]).unwrap()
    }

    fn step_grid() -> DenseGrid {
        // bottom row empty, top row full
        let xa = BinAxis::new(3, 0.0, 3.0);
        let ya = BinAxis::new(2, 0.0, 2.0);
        let mut grid = DenseGrid::new(xa, ya);
        for i in 1..=3 {
            grid.set_content(i, 2, 10.0);
        }
        grid
    }

    fn window(grid: &DenseGrid, w: f64, h: f64) -> DrawWindow {
        let frame = LinearFrame::for_grid(grid, w, h);
        let hints = WindowHints {
            rounding: false,
            ..Default::default()
        };
        DrawWindow::prepare(grid, &frame, &ZoomSelect::full(grid), &hints).unwrap()
    }

    #[test]
    fn test_step_field_yields_midline_chain() {
        let grid = step_grid();
        let win = window(&grid, 90.0, 100.0);

        let mut chains = Vec::new();
        build_contours(&grid, &win, &[5.0], |c| chains.push(c)).unwrap();

        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].level_index, 0);
        // crossings at each pair of cell centers, halfway up the frame
        assert_eq!(chains[0].points, vec![(75.0, 50.0), (45.0, 50.0), (15.0, 50.0)]);
    }

    #[test]
    fn test_two_by_two_step_emits_single_segment() {
        let ax = BinAxis::new(2, 0.0, 2.0);
        let mut grid = DenseGrid::new(ax, ax);
        grid.set_content(1, 2, 10.0);
        grid.set_content(2, 2, 10.0);
        let win = window(&grid, 100.0, 100.0);

        let mut chains = Vec::new();
        build_contours(&grid, &win, &[5.0], |c| chains.push(c)).unwrap();

        // one two-point chain on the row boundary
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].points, vec![(75.0, 50.0), (25.0, 50.0)]);
    }

    #[test]
    fn test_segment_store_caps_per_level() {
        // checkerboard: every 2x2 block crosses the midline twice, so a
        // 100x100 grid tries to store far more segments than one level holds
        let ax = BinAxis::new(100, 0.0, 100.0);
        let mut grid = DenseGrid::new(ax, ax);
        for i in 1..=100 {
            for j in 1..=100 {
                grid.set_content(i, j, (((i + j) % 2) * 10) as f64);
            }
        }
        let win = window(&grid, 1000.0, 1000.0);

        let mut chains = Vec::new();
        build_contours(&grid, &win, &[5.0], |c| chains.push(c)).unwrap();

        assert!(!chains.is_empty());
        assert!(chains.iter().all(|c| c.points.len() >= 2));
        // a chain of p points consumed p-1 stored segments; the store holds
        // two coordinates per segment, so the total is bounded by the cap
        let segments: usize = chains.iter().map(|c| c.points.len() - 1).sum();
        assert!(segments <= POLY_CAPACITY / 2);
        // the overflow must actually have been hit for the bound to matter
        assert!(segments > POLY_CAPACITY / 4);
    }

    #[test]
    fn test_uniform_field_yields_nothing() {
        let xa = BinAxis::new(4, 0.0, 4.0);
        let mut grid = DenseGrid::new(xa, xa);
        for i in 1..=4 {
            for j in 1..=4 {
                grid.set_content(i, j, 3.0);
            }
        }
        let win = window(&grid, 100.0, 100.0);

        let mut chains = 0;
        build_contours(&grid, &win, &[1.0, 2.0, 5.0], |_| chains += 1).unwrap();
        assert_eq!(chains, 0);
    }

    #[test]
    fn test_invalid_levels_rejected() {
        let grid = step_grid();
        let win = window(&grid, 90.0, 100.0);
        assert!(build_contours(&grid, &win, &[], |_| {}).is_err());
        assert!(build_contours(&grid, &win, &[3.0, 1.0, 2.0], |_| {}).is_err());
    }

    #[test]
    fn test_build_is_deterministic() {
        let grid = step_grid();
        let win = window(&grid, 90.0, 100.0);
        let collect = || {
            let mut v = Vec::new();
            build_contours(&grid, &win, &[2.0, 5.0, 8.0], |c| {
                v.push((c.level_index, c.points));
            })
            .unwrap();
            v
        };
        assert_eq!(collect(), collect());
    }

    #[test]
    fn test_encode_line_and_filled_styles() {
        let grid = step_grid();
        let win = window(&grid, 90.0, 100.0);
        let palette = midline_palette();

        let lines = encode_contour_bins(&grid, &win, &palette, ContourStyle::ColoredLines, 90.0, 100.0)
            .unwrap();
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].fill);
        assert_eq!(lines[0].path, "M75,50h-30h-30");

        let filled = encode_contour_bins(&grid, &win, &palette, ContourStyle::Filled, 90.0, 100.0)
            .unwrap();
        assert_eq!(filled.len(), 1);
        assert!(filled[0].fill);
        assert!(filled[0].path.ends_with('z'));
    }

    #[test]
    fn test_frame_filled_adds_backdrop() {
        let grid = step_grid();
        let win = window(&grid, 90.0, 100.0);
        let palette = midline_palette();

        let shapes = encode_contour_bins(&grid, &win, &palette, ContourStyle::FrameFilled, 90.0, 100.0)
            .unwrap();
        assert_eq!(shapes[0].path, "M0,0h90v100h-90z");
        assert!(shapes[0].fill);
        assert_eq!(shapes.len(), 2);
    }

    #[test]
    fn test_dashed_style_cycles_patterns() {
        let grid = step_grid();
        let win = window(&grid, 90.0, 100.0);
        let palette = midline_palette();

        let shapes = encode_contour_bins(&grid, &win, &palette, ContourStyle::DashedLines, 90.0, 100.0)
            .unwrap();
        assert_eq!(shapes[0].dash, Some(1));
    }
}
