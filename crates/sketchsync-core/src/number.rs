//! Number formatting shared by the path, transform and SVG writers.

/// Format a coordinate the way it appears in SVG attributes.
///
/// Integral values print without a fractional part and negative zero
/// prints as `0`.
pub(crate) fn fmt_num(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Round to 10 decimal places so trigonometric noise (e.g. `cos(90°)`)
/// collapses to exact values.
pub(crate) fn round10(value: f64) -> f64 {
    let rounded = (value * 1e10).round() / 1e10;
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_integral() {
        assert_eq!(fmt_num(5.0), "5");
        assert_eq!(fmt_num(-12.0), "-12");
        assert_eq!(fmt_num(-0.0), "0");
    }

    #[test]
    fn test_fmt_fraction() {
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(-2.25), "-2.25");
    }

    #[test]
    fn test_round10() {
        let cos90 = (90.0f64).to_radians().cos();
        assert_eq!(round10(cos90), 0.0);
        assert_eq!(round10(0.123456789012), 0.1234567890);
    }
}
