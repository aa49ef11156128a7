//! Geometry encoders for 2D binned data.
//!
//! Turns the visible window of a histogram grid into compact 2D vector
//! primitives:
//! - flat-color fills with vertical same-color merging
//! - area-proportional boxes
//! - density scatter markers and fill patterns
//! - gradient arrows
//! - text labels
//! - iso-level contour loops (marching squares with polygon stitching)
//!
//! Pixel output is the host's job; every encoder emits path geometry plus
//! the color/level information needed to style it.

pub mod arrow;
pub mod boxes;
pub mod color;
pub mod contour;
pub mod dispatch;
pub mod path;
pub mod scatter;
pub mod text;
pub mod window;

pub use arrow::encode_arrow_bins;
pub use boxes::{encode_box_bins, BoxGeometry, ZScale};
pub use color::{encode_color_bins, ColorGeometry};
pub use contour::{
    build_contours, encode_contour_bins, ContourLoop, ContourShape, MAX_CONTOUR_POINTS,
    MAX_REORDER_STEPS,
};
pub use dispatch::{encode_frame, FrameGeometry, PrimaryGeometry};
pub use path::SvgPath;
pub use scatter::{
    encode_scatter_bins, MarkerBrush, ScatterGeometry, ScatterPattern, SquareMarker,
    DIRECT_DRAW_LIMIT,
};
pub use text::{bin_tooltip, encode_text_bins, TextLabel};
pub use window::{DrawWindow, FrameMapper, LinearFrame, WindowHints};
