use crate::models::ElectricRange;

/// Format a count with thousands separators.
///
/// # Examples
///
/// ```
/// use ev_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234), "1,234");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Render a record's electric range for the listing.
///
/// Unknown ranges are spelled out rather than shown as `0`; invalid cells are
/// echoed back verbatim so the data problem stays visible.
///
/// # Examples
///
/// ```
/// use ev_core::formatting::format_range;
/// use ev_core::models::ElectricRange;
///
/// assert_eq!(format_range(ElectricRange::Known(291), Some("291")), "291 mi");
/// assert_eq!(format_range(ElectricRange::Unknown, Some("0")), "Unknown");
/// assert_eq!(format_range(ElectricRange::Invalid, Some("n/a")), "n/a");
/// ```
pub fn format_range(range: ElectricRange, raw: Option<&str>) -> String {
    match range {
        ElectricRange::Known(miles) => format!("{} mi", format_count(u64::from(miles))),
        ElectricRange::Unknown => "Unknown".to_string(),
        ElectricRange::Invalid => raw.unwrap_or_default().trim().to_string(),
    }
}

/// Share of `part` in `whole` as a whole-number percentage string.
///
/// Returns `"0%"` if `whole` is zero.
///
/// # Examples
///
/// ```
/// use ev_core::formatting::format_share;
///
/// assert_eq!(format_share(1, 3), "33%");
/// assert_eq!(format_share(2, 3), "67%");
/// assert_eq!(format_share(5, 0), "0%");
/// ```
pub fn format_share(part: u64, whole: u64) -> String {
    if whole == 0 {
        return "0%".to_string();
    }
    let pct = (part as f64 / whole as f64) * 100.0;
    format!("{:.0}%", pct)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
