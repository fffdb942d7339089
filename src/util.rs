// Parsing and formatting helpers.
//
// All handling of raw spreadsheet text lives here so the normalizer and the
// views can work with typed values only.
use num_format::{Locale, ToFormattedString};

const LABEL_SEPARATOR: &str = " --- ";
const AXIS_BASE_LABEL: &str = "数值";

/// Parse an observation value.
///
/// - Trims whitespace and strips a single trailing `%`.
/// - Parses the rest with standard `f64` rules.
/// - Returns `None` for anything unparseable, and for NaN or infinite values.
pub fn parse_value(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    let s = s.strip_suffix('%').unwrap_or(s).trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an integer field. Spreadsheet exports often write integral cells
/// as `2024.0`, which is accepted; `2024.5` is not.
pub fn parse_int_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Trimmed text, `None` when missing or blank.
pub fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn indicator_display_label(name: &str, number: &str) -> String {
    format!("{}{}{}", name, LABEL_SEPARATOR, number)
}

/// Map a display label back to the indicator name used for filtering.
pub fn resolve_display_label(label: &str) -> &str {
    label.split(LABEL_SEPARATOR).next().unwrap_or(label)
}

/// Value-axis title: `数值 (unit)`, or just `数值` without a unit.
pub fn axis_unit_label(unit: Option<&str>) -> String {
    match unit.map(str::trim) {
        Some(u) if !u.is_empty() => format!("{} ({})", AXIS_BASE_LABEL, u),
        _ => AXIS_BASE_LABEL.to_string(),
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    // Fixed decimals first, then thousands separators on the integer part.
    let s = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if n.is_sign_negative() && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
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
