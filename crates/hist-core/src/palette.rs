//! Contour palette: ordered level thresholds plus a color table.

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// Color value in RGBA format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Parse a `#RRGGBB` hex string (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::new(r, g, b, 255))
    }
}

/// A sorted contour level set with one color per level interval.
///
/// `levels` partitions scalar space into `levels.len()` half-open intervals;
/// a value below `levels[0]` has no contour index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContourPalette {
    levels: Vec<f64>,
    colors: Vec<Color>,
}

impl ContourPalette {
    /// Build a palette, validating that levels are strictly increasing,
    /// non-empty, and matched one-to-one by colors.
    pub fn new(levels: Vec<f64>, colors: Vec<Color>) -> RenderResult<Self> {
        validate_levels(&levels)?;
        if colors.len() != levels.len() {
            return Err(RenderError::PaletteMismatch {
                levels: levels.len(),
                colors: colors.len(),
            });
        }
        Ok(Self { levels, colors })
    }

    /// Build `n` equidistant levels spanning `[zmin, zmax)` with the given
    /// color table (colors are spread over the levels by index).
    pub fn equidistant(zmin: f64, zmax: f64, n: usize, colors: Vec<Color>) -> RenderResult<Self> {
        if n == 0 || !(zmax > zmin) {
            return Err(RenderError::InvalidLevels(format!(
                "cannot build {} levels over [{}, {})",
                n, zmin, zmax
            )));
        }
        let step = (zmax - zmin) / n as f64;
        let levels: Vec<f64> = (0..n).map(|k| zmin + k as f64 * step).collect();
        Self::new(levels, colors)
    }

    /// Load a palette from its JSON representation.
    pub fn from_json(json_str: &str) -> RenderResult<Self> {
        let palette: Self = serde_json::from_str(json_str)?;
        validate_levels(&palette.levels)?;
        if palette.colors.len() != palette.levels.len() {
            return Err(RenderError::PaletteMismatch {
                levels: palette.levels.len(),
                colors: palette.colors.len(),
            });
        }
        Ok(palette)
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Contour interval index of a value: the largest `k` with
    /// `levels[k] <= value`, or `None` below all levels. Monotonic in the
    /// value argument.
    pub fn contour_index(&self, value: f64) -> Option<usize> {
        for (k, &level) in self.levels.iter().enumerate() {
            if value < level {
                return k.checked_sub(1);
            }
        }
        Some(self.levels.len() - 1)
    }

    /// Color of a contour interval; out-of-range indices clamp to the last
    /// color.
    pub fn color(&self, index: usize) -> Color {
        self.colors[index.min(self.colors.len() - 1)]
    }
}

/// Check that a contour level set is non-empty and strictly increasing.
///
/// Every public entry point consuming a raw level list validates with this
/// before running interval lookups, whose behavior is undefined otherwise.
pub fn validate_levels(levels: &[f64]) -> RenderResult<()> {
    if levels.is_empty() {
        return Err(RenderError::InvalidLevels("empty level list".into()));
    }
    for w in levels.windows(2) {
        if !(w[1] > w[0]) {
            return Err(RenderError::InvalidLevels(format!(
                "{} followed by {}",
                w[0], w[1]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(n: usize) -> Vec<Color> {
        (0..n)
            .map(|k| Color::new(k as u8, k as u8, k as u8, 255))
            .collect()
    }

    #[test]
    fn test_contour_index_boundaries() {
        let palette = ContourPalette::new(vec![2.0, 3.0], gray(2)).unwrap();
        assert_eq!(palette.contour_index(1.0), None);
        assert_eq!(palette.contour_index(2.0), Some(0));
        assert_eq!(palette.contour_index(2.5), Some(0));
        assert_eq!(palette.contour_index(3.0), Some(1));
        assert_eq!(palette.contour_index(100.0), Some(1));
    }

    #[test]
    fn test_contour_index_monotonic() {
        let palette =
            ContourPalette::new(vec![-5.0, -1.0, 0.0, 2.5, 10.0], gray(5)).unwrap();
        let values = [-10.0, -5.0, -2.0, -1.0, 0.0, 1.0, 2.5, 3.0, 10.0, 11.0];
        let rank = |v: f64| palette.contour_index(v).map_or(-1i64, |k| k as i64);
        for pair in values.windows(2) {
            assert!(rank(pair[0]) <= rank(pair[1]));
        }
    }

    #[test]
    fn test_rejects_non_increasing_levels() {
        assert!(ContourPalette::new(vec![1.0, 1.0], gray(2)).is_err());
        assert!(ContourPalette::new(vec![2.0, 1.0], gray(2)).is_err());
        assert!(ContourPalette::new(vec![], gray(0)).is_err());
    }

    #[test]
    fn test_color_mismatch() {
        match ContourPalette::new(vec![1.0, 2.0], gray(3)) {
            Err(RenderError::PaletteMismatch { levels, colors }) => {
                assert_eq!((levels, colors), (2, 3));
            }
            other => panic!("expected mismatch error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_equidistant() {
        let palette = ContourPalette::equidistant(0.0, 10.0, 5, gray(5)).unwrap();
        assert_eq!(palette.levels(), &[0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::new(255, 0, 0, 255)));
        assert_eq!(Color::from_hex("00FF00"), Some(Color::new(0, 255, 0, 255)));
        assert_eq!(Color::from_hex("#GGGGGG"), None);
    }

    #[test]
    fn test_json_roundtrip() {
        let palette = ContourPalette::new(vec![0.0, 1.0], gray(2)).unwrap();
        let json = serde_json::to_string(&palette).unwrap();
        let back = ContourPalette::from_json(&json).unwrap();
        assert_eq!(back.levels(), palette.levels());
    }
}
