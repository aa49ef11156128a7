//! Per-frame draw-mode dispatch.
//!
//! Resolves the option flags into one primary encoder, prepares the draw
//! window with the hints that encoder needs, and runs the text overlay on
//! top when requested.

use serde::Serialize;
use tracing::debug;

use hist_core::{
    ContentRange, ContourPalette, DrawMode, DrawOptions, GridAccessor, RenderResult, ZoomSelect,
};

use crate::arrow::encode_arrow_bins;
use crate::boxes::{encode_box_bins, BoxGeometry, ZScale};
use crate::color::{encode_color_bins, ColorGeometry};
use crate::contour::{encode_contour_bins, ContourShape};
use crate::scatter::{encode_scatter_bins, MarkerBrush, ScatterGeometry};
use crate::text::{encode_text_bins, TextLabel};
use crate::window::{DrawWindow, FrameMapper, WindowHints};

/// Geometry of the frame's primary encoder.
#[derive(Debug, Clone, Serialize)]
pub enum PrimaryGeometry {
    Color(ColorGeometry),
    Boxes(BoxGeometry),
    Scatter(ScatterGeometry),
    Arrow(String),
    Contour(Vec<ContourShape>),
}

/// Everything one frame draws: the resolved mode, the draw window it was
/// encoded against (kept for hit-testing and tooltips), the primary geometry
/// and the optional label overlay.
#[derive(Debug, Clone, Serialize)]
pub struct FrameGeometry {
    pub mode: DrawMode,
    pub window: DrawWindow,
    pub primary: PrimaryGeometry,
    pub labels: Vec<TextLabel>,
}

fn mode_hints(mode: DrawMode) -> WindowHints {
    match mode {
        DrawMode::Scatter => WindowHints {
            pixel_density: true,
            ..Default::default()
        },
        DrawMode::Color => WindowHints::default(),
        DrawMode::Box | DrawMode::Arrow => WindowHints {
            rounding: false,
            ..Default::default()
        },
        DrawMode::Contour(_) => WindowHints {
            rounding: false,
            extra: 100,
            ..Default::default()
        },
    }
}

/// Encode one frame of a 2D histogram.
///
/// The mode is resolved from the option flags; the text overlay shares the
/// primary encoder's window so labels land on the same cells.
#[allow(clippy::too_many_arguments)]
pub fn encode_frame(
    grid: &impl GridAccessor,
    frame: &impl FrameMapper,
    zoom: &ZoomSelect,
    opts: &DrawOptions,
    palette: &ContourPalette,
    zscale: &ZScale,
    marker: &impl MarkerBrush,
    frame_w: f64,
    frame_h: f64,
) -> RenderResult<FrameGeometry> {
    let mode = DrawMode::from_options(opts);
    let win = DrawWindow::prepare(grid, frame, zoom, &mode_hints(mode))?;
    let range = ContentRange::scan(grid);
    debug!(?mode, sumz = win.sumz, "encoding frame");

    let primary = match mode {
        DrawMode::Scatter => PrimaryGeometry::Scatter(encode_scatter_bins(
            grid, &win, palette, &range, opts, marker,
        )),
        DrawMode::Color => PrimaryGeometry::Color(encode_color_bins(
            grid,
            &win,
            palette,
            opts,
            || {},
        )),
        DrawMode::Box => PrimaryGeometry::Boxes(encode_box_bins(
            grid,
            &win,
            zscale,
            &range,
            opts.box_style,
        )),
        DrawMode::Arrow => PrimaryGeometry::Arrow(encode_arrow_bins(grid, &win)),
        DrawMode::Contour(style) => PrimaryGeometry::Contour(encode_contour_bins(
            grid, &win, palette, style, frame_w, frame_h,
        )?),
    };

    let labels = if opts.text {
        encode_text_bins(grid, &win, opts, false)
    } else {
        Vec::new()
    };

    Ok(FrameGeometry {
        mode,
        window: win,
        primary,
        labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxes::ZScale;
    use crate::scatter::SquareMarker;
    use crate::window::LinearFrame;
    use hist_core::{BinAxis, Color, DenseGrid};

    fn grid() -> DenseGrid {
        let ax = BinAxis::new(3, 0.0, 3.0);
        let mut grid = DenseGrid::new(ax, ax);
        for i in 1..=3 {
            for j in 1..=3 {
                grid.set_content(i, j, (i + j) as f64);
            }
        }
        grid
    }

    fn encode(opts: &DrawOptions) -> FrameGeometry {
        let grid = grid();
        let frame = LinearFrame::for_grid(&grid, 90.0, 90.0);
        let palette =
            ContourPalette::equidistant(0.0, 10.0, 5, vec![Color::new(0, 0, 0, 255); 5]).unwrap();
        let zscale = ZScale {
            min: 0.0,
            max: 10.0,
            min_positive: 1.0,
            log: false,
        };
        encode_frame(
            &grid,
            &frame,
            &ZoomSelect::full(&grid),
            opts,
            &palette,
            &zscale,
            &SquareMarker::default(),
            90.0,
            90.0,
        )
        .unwrap()
    }

    #[test]
    fn test_color_is_the_fallback_mode() {
        let fg = encode(&DrawOptions::default());
        assert_eq!(fg.mode, DrawMode::Color);
        assert!(matches!(fg.primary, PrimaryGeometry::Color(_)));
        assert!(fg.labels.is_empty());
    }

    #[test]
    fn test_scatter_wins_over_other_flags() {
        let opts = DrawOptions {
            scatter: true,
            boxes: true,
            contour: 1,
            ..Default::default()
        };
        let fg = encode(&opts);
        assert_eq!(fg.mode, DrawMode::Scatter);
        assert!(matches!(fg.primary, PrimaryGeometry::Scatter(_)));
    }

    #[test]
    fn test_box_mode_selected() {
        let opts = DrawOptions {
            boxes: true,
            ..Default::default()
        };
        let fg = encode(&opts);
        assert!(matches!(fg.primary, PrimaryGeometry::Boxes(_)));
    }

    #[test]
    fn test_text_overlay_is_additive() {
        let opts = DrawOptions {
            arrow: true,
            text: true,
            ..Default::default()
        };
        let fg = encode(&opts);
        assert_eq!(fg.mode, DrawMode::Arrow);
        assert_eq!(fg.labels.len(), 9);
    }

    #[test]
    fn test_frame_geometry_serializes() {
        let fg = encode(&DrawOptions::default());
        let json = serde_json::to_string(&fg).unwrap();
        assert!(json.contains("\"mode\":\"Color\""));
        assert!(json.contains("\"sumz\""));
    }

    #[test]
    fn test_contour_style_reaches_encoder() {
        let opts = DrawOptions {
            contour: 12,
            ..Default::default()
        };
        let fg = encode(&opts);
        let PrimaryGeometry::Contour(shapes) = &fg.primary else {
            panic!("expected contour geometry");
        };
        assert!(shapes.iter().all(|s| !s.fill && s.dash.is_some()));
    }
}
