//! Loose `YEAR[.MONTH[.DAY]]` dates → fixed-width `YYYY.MM.DD` sort keys.
//!
//! Master-table dates carry seasons and vague markers ("1943.秋",
//! "1948.12上旬"). Anything that is not a clean number collapses to `01`
//! so every row still gets a sortable key.

/// Canonicalize a date string. Total: never fails, never panics.
///
/// `"1935.3.7"` → `"1935.03.07"`, `"1935"` → `"1935.01.01"`,
/// `"1943.秋"` → `"1943.01.01"`.
pub fn normalize_date(raw: &str) -> String {
    let mut parts = raw.trim().split('.');
    let year = parts.next().unwrap_or("").trim();
    let month = pad_component(parts.next());
    let day = pad_component(parts.next());
    format!("{year}.{month}.{day}")
}

/// Zero-pad a month/day component to width 2, or `01` when missing or not numeric.
fn pad_component(part: Option<&str>) -> String {
    match part.map(str::trim) {
        Some(p) if !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()) => {
            format!("{p:0>2}")
        }
        _ => "01".to_string(),
    }
}

/// The year component (everything before the first `.`).
pub fn year_part(date: &str) -> &str {
    date.split('.').next().unwrap_or("")
}

/// Replace the year component, keeping month/day/season suffix verbatim.
pub fn with_year(date: &str, year: &str) -> String {
    match date.split_once('.') {
        Some((_, rest)) => format!("{year}.{rest}"),
        None => year.to_string(),
    }
}
