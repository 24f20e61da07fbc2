use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d";
const WEEK_LABEL_FORMAT: &str = "%Y-W%W";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateFormat {
    Date(&'static str),
    DateTime(&'static str),
    Rfc2822,
}

/// Formats tried in order when normalizing an incoming `photo_date`.
const PARSE_CHAIN: &[DateFormat] = &[
    DateFormat::Date(STORED_DATE_FORMAT),
    DateFormat::DateTime("%Y-%m-%dT%H:%M:%S"),
    DateFormat::DateTime("%Y-%m-%dT%H:%M:%SZ"),
    DateFormat::Rfc2822,
    DateFormat::Date("%B %d, %Y"),
    DateFormat::Date("%b %d, %Y"),
    DateFormat::Date("%m/%d/%Y"),
];

fn attempt(format: DateFormat, raw: &str) -> Option<NaiveDate> {
    match format {
        DateFormat::Date(fmt) => NaiveDate::parse_from_str(raw, fmt).ok(),
        DateFormat::DateTime(fmt) => NaiveDateTime::parse_from_str(raw, fmt)
            .ok()
            .map(|dt| dt.date()),
        DateFormat::Rfc2822 => DateTime::parse_from_rfc2822(raw)
            .ok()
            .map(|dt| dt.date_naive()),
    }
}

fn embedded_iso_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    if bytes.len() < 10 {
        return None;
    }
    for start in 0..=bytes.len() - 10 {
        let window = &bytes[start..start + 10];
        let shaped = window.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
        if !shaped {
            continue;
        }
        let Some(text) = raw.get(start..start + 10) else {
            continue;
        };
        if let Ok(date) = NaiveDate::parse_from_str(text, STORED_DATE_FORMAT) {
            return Some(date);
        }
    }
    None
}

/// Parse an upstream date string in any of the supported shapes.
pub fn parse_photo_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    PARSE_CHAIN
        .iter()
        .find_map(|format| attempt(*format, trimmed))
        .or_else(|| embedded_iso_date(trimmed))
}

/// Canonical `YYYY-MM-DD` form of `raw`, or `raw` unchanged when no format
/// matches.
pub fn normalize_photo_date(raw: &str) -> String {
    match parse_photo_date(raw) {
        Some(date) => format_stored_date(date),
        None => raw.to_string(),
    }
}

/// Strict parse of a stored `photo_date`, used by date-dependent queries.
pub fn parse_stored_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, STORED_DATE_FORMAT).ok()
}

pub fn format_stored_date(date: NaiveDate) -> String {
    date.format(STORED_DATE_FORMAT).to_string()
}

/// Monday-anchored week label such as `2024-W01`. Days before the first
/// Monday of the year fall in week `00`.
pub fn week_label(date: NaiveDate) -> String {
    date.format(WEEK_LABEL_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parse_chain_accepts_each_supported_shape() {
        let want = ymd(2024, 1, 5);
        for raw in [
            "2024-01-05",
            "2024-01-05T18:30:00",
            "2024-01-05T18:30:00Z",
            "Fri, 05 Jan 2024 18:30:00 +0000",
            "January 05, 2024",
            "Jan 5, 2024",
            "01/05/2024",
            "  2024-01-05  ",
        ] {
            assert_eq!(parse_photo_date(raw), Some(want), "input {raw:?}");
        }
    }

    #[test]
    fn parse_chain_falls_back_to_embedded_iso_date() {
        assert_eq!(
            parse_photo_date("shot 2023-12-31 at Crypto.com Arena"),
            Some(ymd(2023, 12, 31))
        );
        assert_eq!(parse_photo_date("2024-13-45 somewhere"), None);
    }

    #[test]
    fn unparseable_dates_are_kept_verbatim() {
        assert_eq!(parse_photo_date("last tuesday"), None);
        assert_eq!(parse_photo_date(""), None);
        assert_eq!(normalize_photo_date("last tuesday"), "last tuesday");
        assert_eq!(normalize_photo_date(""), "");
        assert_eq!(normalize_photo_date("2024-01-05T01:02:03"), "2024-01-05");
    }

    #[test]
    fn week_label_is_monday_anchored() {
        assert_eq!(week_label(ymd(2024, 1, 1)), "2024-W01");
        assert_eq!(week_label(ymd(2024, 1, 7)), "2024-W01");
        assert_eq!(week_label(ymd(2024, 1, 8)), "2024-W02");
        assert_eq!(week_label(ymd(2023, 12, 31)), "2023-W52");
        assert_eq!(week_label(ymd(2023, 1, 1)), "2023-W00");
    }

    #[test]
    fn stored_dates_parse_strictly() {
        assert_eq!(parse_stored_date("2024-01-05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_stored_date("2024-01-05T00:00:00"), None);
        assert_eq!(parse_stored_date("Jan 5, 2024"), None);
    }
}
