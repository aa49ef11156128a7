//! Numeric formatting for statistics boxes and text labels.

/// Format a bin content or statistics value: integers print exactly, other
/// values with four significant-looking decimals, trailing zeros trimmed.
pub fn format_value(v: f64) -> String {
    if !v.is_finite() {
        return format!("{}", v);
    }
    if v == v.round() && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    let s = format!("{:.4}", v);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(-12.0), "-12");
        assert_eq!(format_value(0.5), "0.5");
        assert_eq!(format_value(1.2345678), "1.2346");
        assert_eq!(format_value(2.5000), "2.5");
    }
}
