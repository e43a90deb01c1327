//! Best-effort parsing of free-form size text.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static SIZE_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:[.,]\d+)?)\s*(b|bytes?|[kmgtp](?:i?b)?)\s*$")
        .expect("valid size regex")
});

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Parse "1.2 GB", "700MiB", "734003200 B" and similar into bytes.
///
/// Units are binary (1 KB = 1024 B), matching what indexers print.
pub fn parse_size(text: &str) -> Option<u64> {
    let caps = SIZE_TEXT.captures(text)?;
    let number: f64 = caps.get(1)?.as_str().replace(',', ".").parse().ok()?;
    let unit = caps.get(2)?.as_str().to_ascii_lowercase();

    let exponent = match unit.chars().next()? {
        'b' => 0,
        'k' => 1,
        'm' => 2,
        'g' => 3,
        't' => 4,
        'p' => 5,
        _ => return None,
    };

    let bytes = number * 1024f64.powi(exponent);
    if !bytes.is_finite() || bytes < 0.0 || bytes > u64::MAX as f64 {
        return None;
    }
    Some(bytes.round() as u64)
}

/// Render a byte count with one decimal place ("1.2 GB").
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Normalize size text for display; unparseable text passes through.
pub fn display_size(text: &str) -> String {
    match parse_size(text) {
        Some(bytes) => format_size(bytes),
        None => text.to_string(),
    }
}
