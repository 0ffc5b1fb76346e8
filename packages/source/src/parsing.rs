//! Cell parsing helpers shared by the row normalizer.
//!
//! CSV cells arrive as strings. Numeric columns in the published dataset
//! are sometimes written as floats (`"3.0"`) by the exporting tool, so the
//! integer parsers accept a zero fractional part.

/// Returns the trimmed string, or `None` when it is empty.
#[must_use]
pub fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses an integer cell, accepting `"12"` and `"12.0"`.
fn parse_integer(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let float = trimmed.parse::<f64>().ok()?;
    if float.is_finite() && float.fract() == 0.0 {
        #[allow(clippy::cast_possible_truncation)]
        return Some(float as i64);
    }
    None
}

/// Parses a crash year.
#[must_use]
pub fn parse_year(s: &str) -> Option<i32> {
    parse_integer(s).and_then(|v| i32::try_from(v).ok())
}

/// Parses an hour of day. Values outside 0-23 are treated as missing.
#[must_use]
pub fn parse_hour(s: &str) -> Option<u8> {
    parse_integer(s)
        .and_then(|v| u8::try_from(v).ok())
        .filter(|h| *h <= 23)
}

/// Parses a non-negative count (casualties, fatalities).
#[must_use]
pub fn parse_count(s: &str) -> Option<u32> {
    parse_integer(s).and_then(|v| u32::try_from(v).ok())
}

/// Parses a coordinate component. Missing, unparseable, and non-finite
/// values (`"NaN"`, `"inf"`) all return `None`.
#[must_use]
pub fn parse_coordinate(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims() {
        assert_eq!(non_empty("  Bruce Hwy "), Some("Bruce Hwy".to_string()));
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(""), None);
    }

    #[test]
    fn parses_years() {
        assert_eq!(parse_year("2021"), Some(2021));
        assert_eq!(parse_year("2021.0"), Some(2021));
        assert_eq!(parse_year("2021.5"), None);
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("twenty"), None);
    }

    #[test]
    fn parses_hours_in_range() {
        assert_eq!(parse_hour("0"), Some(0));
        assert_eq!(parse_hour("23"), Some(23));
        assert_eq!(parse_hour("24"), None);
        assert_eq!(parse_hour("-1"), None);
    }

    #[test]
    fn parses_counts() {
        assert_eq!(parse_count("3"), Some(3));
        assert_eq!(parse_count("3.0"), Some(3));
        assert_eq!(parse_count("-2"), None);
    }

    #[test]
    fn parses_coordinates() {
        let lat = parse_coordinate(" -27.4698 ").unwrap();
        assert!((lat - -27.4698).abs() < f64::EPSILON);
        assert_eq!(parse_coordinate("0"), Some(0.0));
        assert_eq!(parse_coordinate("NaN"), None);
        assert_eq!(parse_coordinate("inf"), None);
        assert_eq!(parse_coordinate(""), None);
    }
}
