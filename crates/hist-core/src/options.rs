//! Draw options and the per-frame draw-mode selection.

use serde::{Deserialize, Serialize};

/// Option flags controlling how bins are encoded, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawOptions {
    pub scatter: bool,
    pub color: bool,
    pub boxes: bool,
    /// Box sub-mode: 0 plain, 10 diagonal cross on negative bins,
    /// 11 split bevel overlay.
    pub box_style: u32,
    pub arrow: bool,
    /// Contour style code: 0 off, 1 filled, 11 colored lines,
    /// 12 dashed indexed lines, 13 host line attributes, 14 frame-filled.
    pub contour: u32,
    /// Additive text-label overlay.
    pub text: bool,
    /// Draw zero-content bins in color mode.
    pub draw_zeros: bool,
    /// Map zero bins below the first level to color index 0.
    pub show_empty_bins: bool,
    /// Scatter point-count coefficient.
    pub scat_coef: f64,
    /// Vertical offset fraction for text labels.
    pub bar_offset: f64,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            scatter: false,
            color: false,
            boxes: false,
            box_style: 0,
            arrow: false,
            contour: 0,
            text: false,
            draw_zeros: false,
            show_empty_bins: false,
            scat_coef: 1.0,
            bar_offset: 0.0,
        }
    }
}

impl DrawOptions {
    /// Load options from JSON.
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }
}

/// Contour rendering sub-mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContourStyle {
    /// Filled level bands.
    Filled,
    /// Stroked lines colored by the palette.
    ColoredLines,
    /// Stroked lines with a dash pattern cycling by level index.
    DashedLines,
    /// Stroked lines using the host's line attributes.
    HostLines,
    /// Filled bands over a full-frame background in the first color.
    FrameFilled,
}

impl ContourStyle {
    /// Decode the numeric style option; unknown codes fall back to `Filled`.
    pub fn from_code(code: u32) -> Self {
        match code {
            11 => ContourStyle::ColoredLines,
            12 => ContourStyle::DashedLines,
            13 => ContourStyle::HostLines,
            14 => ContourStyle::FrameFilled,
            _ => ContourStyle::Filled,
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, ContourStyle::Filled | ContourStyle::FrameFilled)
    }
}

/// The primary encoder chosen for one frame.
///
/// Exactly one primary mode is active per frame; the text overlay is always
/// additive and not part of this selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawMode {
    Scatter,
    Color,
    Box,
    Arrow,
    Contour(ContourStyle),
}

impl DrawMode {
    /// Resolve mutually exclusive option flags into one mode. First match
    /// wins in the order scatter, color, box, arrow, contour; when nothing
    /// is selected color encoding is the fallback.
    pub fn from_options(opts: &DrawOptions) -> DrawMode {
        if opts.scatter {
            DrawMode::Scatter
        } else if opts.color {
            DrawMode::Color
        } else if opts.boxes {
            DrawMode::Box
        } else if opts.arrow {
            DrawMode::Arrow
        } else if opts.contour > 0 {
            DrawMode::Contour(ContourStyle::from_code(opts.contour))
        } else {
            DrawMode::Color
        }
    }
}
