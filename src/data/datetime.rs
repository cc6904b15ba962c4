use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// Formats accepted as zero-padded ISO-like dates. Strings in these formats
/// sort lexically in chronological order.
pub const ISO_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d",
];

/// True if `value` is a zero-padded `YYYY-MM-DD` date, optionally followed by
/// a time of day.
pub fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    // chrono accepts "2024-1-5" for %m/%d, so check the padding by position.
    if bytes.len() < 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    if bytes.len() > 10 && bytes[10] != b' ' && bytes[10] != b'T' {
        return false;
    }
    ISO_FORMATS.iter().any(|fmt| {
        NaiveDateTime::parse_from_str(value, fmt).is_ok()
            || NaiveDate::parse_from_str(value, fmt).is_ok()
    })
}

/// Render a spreadsheet date cell as a sortable string. Midnight values are
/// shown as a bare date.
pub fn format_cell_datetime(dt: NaiveDateTime) -> String {
    if dt.num_seconds_from_midnight() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Dates in `values` that would not sort chronologically.
pub fn non_iso_dates<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    values.into_iter().filter(|v| !is_iso_date(v)).collect()
}
