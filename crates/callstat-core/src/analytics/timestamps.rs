//! Date-time parsing for record timestamps and filter bounds.
//!
//! Timestamps are compared on their wall-clock value as written: an RFC 3339
//! offset is accepted but not applied, so `10:00+03:00` lands in hour 10.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which end of a filter range a bound sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundEdge {
    Start,
    End,
}

/// Parse a record timestamp. A date without a time of day is rejected,
/// since it cannot be placed in an hour bucket.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parse a filter bound. Bare dates expand to the first instant of the day
/// for a start bound and the last instant for an end bound.
pub fn parse_bound(raw: &str, edge: BoundEdge) -> Option<NaiveDateTime> {
    if let Some(dt) = parse_timestamp(raw) {
        return Some(dt);
    }
    let date = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()?;
    let time = match edge {
        BoundEdge::Start => NaiveTime::from_hms_opt(0, 0, 0)?,
        BoundEdge::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)?,
    };
    Some(date.and_time(time))
}

/// Calendar date and hour-of-day bucket of a timestamp.
pub fn date_and_hour(dt: &NaiveDateTime) -> (NaiveDate, usize) {
    (dt.date(), dt.hour() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_iso_without_offset() {
        assert_eq!(
            parse_timestamp("2024-01-01T10:05:00"),
            Some(ymd_hms(2024, 1, 1, 10, 5, 0))
        );
    }

    #[test]
    fn test_parse_space_separated_with_fraction() {
        let dt = parse_timestamp("2024-03-09 23:59:58.250").unwrap();
        assert_eq!(date_and_hour(&dt), (NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(), 23));
    }

    #[test]
    fn test_parse_rfc3339_keeps_wall_clock() {
        let dt = parse_timestamp("2024-01-01T10:00:00+03:00").unwrap();
        assert_eq!(dt, ymd_hms(2024, 1, 1, 10, 0, 0));
        let utc = parse_timestamp("2024-01-01T10:00:00Z").unwrap();
        assert_eq!(utc, ymd_hms(2024, 1, 1, 10, 0, 0));
    }

    #[test]
    fn test_parse_rejects_garbage_and_bare_dates() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("2024-13-01T00:00:00"), None);
        assert_eq!(parse_timestamp("2024-01-01"), None);
    }

    #[test]
    fn test_bare_date_bounds_cover_whole_day() {
        let start = parse_bound("2024-01-01", BoundEdge::Start).unwrap();
        let end = parse_bound("2024-01-01", BoundEdge::End).unwrap();
        assert_eq!(start, ymd_hms(2024, 1, 1, 0, 0, 0));
        assert!(end > ymd_hms(2024, 1, 1, 23, 59, 59));
        assert!(end < ymd_hms(2024, 1, 2, 0, 0, 0));
    }

    #[test]
    fn test_bound_accepts_full_timestamp() {
        assert_eq!(
            parse_bound("2024-01-01T10:00:00", BoundEdge::End),
            Some(ymd_hms(2024, 1, 1, 10, 0, 0))
        );
        assert_eq!(parse_bound("not a date", BoundEdge::Start), None);
    }
}
