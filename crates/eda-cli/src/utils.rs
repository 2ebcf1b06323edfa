//! Shared utilities: cell normalization, literal parsing and formatting.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

// =============================================================================
// Missing Value Detection
// =============================================================================

/// Cell contents treated as missing (compared case-insensitively after trim).
pub const MISSING_MARKERS: [&str; 14] = [
    "na", "n/a", "nan", "-nan", "null", "none", "#n/a", "#na", "<na>", "-1.#ind", "1.#qnan",
    "#n/a n/a", "-1.#qnan", "1.#ind",
];

/// Check if a raw cell is a missing value marker (or blank).
///
/// # Example
///
/// ```rust,ignore
/// use eda_cli::utils::is_missing_marker;
///
/// assert!(is_missing_marker(""));
/// assert!(is_missing_marker("  NaN "));
/// assert!(!is_missing_marker("0"));
/// ```
pub fn is_missing_marker(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_ascii_lowercase();
    MISSING_MARKERS.iter().any(|&marker| lower == marker)
}

/// Normalize a raw cell: trims it and maps blanks/markers to `None`.
pub fn normalize_cell(raw: Option<&str>) -> Option<String> {
    match raw {
        Some(s) if !is_missing_marker(s) => Some(s.trim().to_string()),
        _ => None,
    }
}

// =============================================================================
// Literal Parsing
// =============================================================================

// Plain decimal/scientific literal; no thousands separators or currency symbols.
static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("Invalid regex: numeric literal")
});

/// Try to parse a trimmed cell as a numeric value.
pub fn parse_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if !NUMERIC_LITERAL.is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse `true`/`false` (case-insensitive).
pub fn parse_boolean(s: &str) -> Option<bool> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Format a float the way a spreadsheet would show it: integral values
/// without a fractional part, everything else with up to six decimals.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{value:.6}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Format a share as a percentage with the given number of decimals.
pub fn format_percent(share: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, share * 100.0)
}

static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]+").expect("Invalid regex: file name"));

/// Turn a column name into something usable as a file name stem.
pub fn sanitize_file_stem(name: &str) -> String {
    let cleaned = UNSAFE_FILE_CHARS.replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "column".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Sanitized stem not yet present in `used`; repeats get `_2`, `_3`, ...
pub fn unique_file_stem(name: &str, used: &mut HashSet<String>) -> String {
    let base = sanitize_file_stem(name);
    let mut stem = base.clone();
    let mut n = 2;
    while used.contains(&stem) {
        stem = format!("{base}_{n}");
        n += 1;
    }
    used.insert(stem.clone());
    stem
}

/// Truncate a string to max characters with ellipsis.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let keep = max_len.saturating_sub(3);
        format!("{}...", s.chars().take(keep).collect::<String>())
    }
}
