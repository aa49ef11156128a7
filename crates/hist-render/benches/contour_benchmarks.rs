//! Benchmarks for contour building and bin encoding.
//!
//! Run with: cargo bench --package hist-render --bench contour_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hist_core::{BinAxis, Color, ContourPalette, ContourStyle, DenseGrid, DrawOptions, ZoomSelect};
use hist_render::{
    build_contours, encode_color_bins, encode_contour_bins, DrawWindow, LinearFrame, WindowHints,
};

/// Smooth two-bump field, produces long well-behaved contour chains.
fn generate_smooth_grid(n: usize) -> DenseGrid {
    let ax = BinAxis::new(n, 0.0, n as f64);
    let mut grid = DenseGrid::new(ax, ax);
    for i in 1..=n {
        for j in 1..=n {
            let x = i as f64 / n as f64;
            let y = j as f64 / n as f64;
            let v = 50.0
                + 40.0 * (x * std::f64::consts::PI * 2.0).sin()
                + 30.0 * (y * std::f64::consts::PI * 3.0).cos();
            grid.set_content(i, j, v);
        }
    }
    grid
}

fn levels(n: usize) -> Vec<f64> {
    (0..n).map(|k| k as f64 * 120.0 / n as f64).collect()
}

fn palette(n: usize) -> ContourPalette {
    ContourPalette::new(levels(n), vec![Color::new(0, 0, 0, 255); n]).unwrap()
}

fn prepare_window(grid: &DenseGrid, rounding: bool) -> DrawWindow {
    let frame = LinearFrame::for_grid(grid, 800.0, 800.0);
    let hints = WindowHints {
        rounding,
        ..Default::default()
    };
    DrawWindow::prepare(grid, &frame, &ZoomSelect::full(grid), &hints).unwrap()
}

fn bench_build_contours(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_contours");

    for n in [64, 128, 256] {
        let grid = generate_smooth_grid(n);
        let win = prepare_window(&grid, false);

        group.throughput(Throughput::Elements((n * n) as u64));

        for nlevels in [8, 20] {
            let lv = levels(nlevels);
            group.bench_with_input(
                BenchmarkId::new(format!("{nlevels}_levels"), format!("{n}x{n}")),
                &lv,
                |b, lv| {
                    b.iter(|| {
                        let mut chains = 0;
                        build_contours(black_box(&grid), &win, black_box(lv), |_| chains += 1)
                            .unwrap();
                        chains
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_encode_contour_bins(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_contour_bins");

    for n in [128, 256] {
        let grid = generate_smooth_grid(n);
        let win = prepare_window(&grid, false);
        let palette = palette(20);

        group.throughput(Throughput::Elements((n * n) as u64));

        for style in [ContourStyle::Filled, ContourStyle::ColoredLines] {
            group.bench_with_input(
                BenchmarkId::new(format!("{style:?}"), format!("{n}x{n}")),
                &style,
                |b, &style| {
                    b.iter(|| {
                        encode_contour_bins(
                            black_box(&grid),
                            &win,
                            &palette,
                            style,
                            800.0,
                            800.0,
                        )
                        .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_encode_color_bins(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_color_bins");

    for n in [128, 256, 512] {
        let grid = generate_smooth_grid(n);
        let win = prepare_window(&grid, true);
        let palette = palette(20);
        let opts = DrawOptions::default();

        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_with_input(
            BenchmarkId::new("smooth", format!("{n}x{n}")),
            &grid,
            |b, grid| {
                b.iter(|| encode_color_bins(black_box(grid), &win, &palette, &opts, || {}));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build_contours,
    bench_encode_contour_bins,
    bench_encode_color_bins
);
criterion_main!(benches);
