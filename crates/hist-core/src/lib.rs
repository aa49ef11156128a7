//! Common types for 2D histogram rendering: grid model, contour palette,
//! statistics and draw options shared by all geometry encoders.

pub mod error;
pub mod grid;
pub mod options;
pub mod palette;
pub mod stats;
pub mod value_fmt;

pub use error::{RenderError, RenderResult};
pub use grid::{auto_zoom, AutoZoom, BinAxis, ContentRange, DenseGrid, GridAccessor};
pub use options::{ContourStyle, DrawMode, DrawOptions};
pub use palette::{validate_levels, Color, ContourPalette};
pub use stats::{compute_stats, stat_lines, Stats, ZoomSelect};
pub use value_fmt::format_value;
