//! Stateless numeric formatters shared by the message renderers.

/// Format a `[0, 1]` probability as a whole percent, clamped at the display
/// boundaries: anything above 0.99 reads `">99%"` and anything below 0.01
/// reads `"<1%"`, so a rounded value never overstates certainty.
pub fn format_percent(value: f64) -> String {
    if value > 0.99 {
        ">99%".to_string()
    } else if value < 0.01 {
        "<1%".to_string()
    } else {
        format!("{}%", (value * 100.0).round() as i64)
    }
}

/// Format a count with thousands separators (`1234567` -> `"1,234,567"`).
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a p-value to three decimal places.
pub fn format_p_value(value: f64) -> String {
    format!("{value:.3}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_percent_boundaries() {
        assert_eq!(format_percent(0.995), ">99%");
        assert_eq!(format_percent(0.005), "<1%");
        assert_eq!(format_percent(0.5), "50%");
    }

    #[test]
    fn test_format_percent_edges_round_not_clamp() {
        // Exactly at the boundaries the plain rounding applies.
        assert_eq!(format_percent(0.99), "99%");
        assert_eq!(format_percent(0.01), "1%");
        assert_eq!(format_percent(0.042), "4%");
        assert_eq!(format_percent(0.045), "5%");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_p_value() {
        assert_eq!(format_p_value(0.0321), "0.032");
        assert_eq!(format_p_value(0.05), "0.050");
        assert_eq!(format_p_value(0.0005), "0.001");
    }
}
