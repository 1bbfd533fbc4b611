/// Insert commas every 3 digits.
fn group_int_digits(int_part: &str) -> String {
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len.saturating_sub(i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

/// Format a whole-unit amount for human display.
///
/// This does **not** change any canonical JSON numeric fields. It is
/// intended for `*_display` fields and terminal output.
///
/// Options:
/// - `grouping`: enable thousands separators (`,`)
/// - `symbol`: optional prefix (e.g. `₩`, `$`)
pub fn format_amount_display(value: i64, grouping: bool, symbol: Option<&str>) -> String {
    let digits = value.unsigned_abs().to_string();
    let body = if grouping {
        group_int_digits(&digits)
    } else {
        digits
    };

    let mut out = String::new();
    if value < 0 {
        out.push('-');
    }
    if let Some(sym) = symbol {
        out.push_str(sym);
    }
    out.push_str(&body);
    out
}

/// Render a percentage with one decimal place, e.g. `+12.5%`.
pub fn format_percent_display(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.1}%")
    } else {
        format!("{value:.1}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_amount_display_defaults_to_plain_digits() {
        assert_eq!(format_amount_display(1_234_500, false, None), "1234500");
        assert_eq!(format_amount_display(0, true, None), "0");
    }

    #[test]
    fn format_amount_display_groups_and_symbols() {
        assert_eq!(
            format_amount_display(1_234_567, true, Some("₩")),
            "₩1,234,567"
        );
        assert_eq!(format_amount_display(123, true, None), "123");
    }

    #[test]
    fn format_amount_display_negative_sign_precedes_symbol() {
        assert_eq!(format_amount_display(-1_234, true, Some("$")), "-$1,234");
    }

    #[test]
    fn format_percent_display_signs_gains() {
        assert_eq!(format_percent_display(12.345), "+12.3%");
        assert_eq!(format_percent_display(0.0), "0.0%");
        assert_eq!(format_percent_display(-5.0), "-5.0%");
    }
}
