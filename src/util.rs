// Utility helpers for number parsing and console formatting.
//
// Keeps the "dirty" string-to-number handling in one place so the join
// engine can assume typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Trims whitespace.
/// - Strips thousands separators like `","`.
/// - Returns `None` for empty, non-numeric or non-finite values.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware thousands separators (`1,234.50`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Legend label text, e.g. `15.6°C`.
pub fn format_celsius(c: f64) -> String {
    format!("{}°C", format_number(c, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_handles_noise() {
        assert_eq!(parse_f64_safe(Some(" 60.5 ")), Some(60.5));
        assert_eq!(parse_f64_safe(Some("1,024")), Some(1024.0));
        assert_eq!(parse_f64_safe(Some("-3")), Some(-3.0));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.34, 1), "-12.3");
        assert_eq!(format_number(-0.01, 1), "0.0");
        assert_eq!(format_number(7.0, 0), "7");
    }

    #[test]
    fn celsius_label() {
        assert_eq!(format_celsius(15.555), "15.6°C");
        assert_eq!(format_int(9855usize), "9,855");
    }
}
