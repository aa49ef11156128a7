//! Error types for the rendering core.
//!
//! Degenerate inputs (empty windows, zero total weight, flat grids) are not
//! errors anywhere in this workspace; they degrade to empty or zeroed output.
//! Errors are reserved for precondition violations at public entry points.

use thiserror::Error;

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

/// Primary error type for geometry encoding operations.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Contour levels must be strictly increasing and non-empty: {0}")]
    InvalidLevels(String),

    #[error("Palette has {levels} levels but {colors} colors")]
    PaletteMismatch { levels: usize, colors: usize },

    #[error("Invalid draw window: {0}")]
    InvalidWindow(String),

    #[error("Invalid style configuration: {0}")]
    InvalidStyle(String),
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::InvalidStyle(format!("JSON error: {}", err))
    }
}
