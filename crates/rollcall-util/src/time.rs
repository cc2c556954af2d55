//! Time utilities for rollcall
//!
//! The engine itself never reads the clock; every operation takes the
//! current date/time as a parameter. These helpers are for the daemon's
//! outer loops and for the store's canonical encodings.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Weekday};

/// Get the current local time.
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Get the current local date.
pub fn today() -> NaiveDate {
    now().date_naive()
}

/// Canonical date encoding used in the store and in URLs (`YYYY-MM-DD`)
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Canonical time-of-day encoding (`HH:MM:SS`)
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Parse a `HH:MM:SS` (or `HH:MM`) time-of-day
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Weekday encoding shared with the schedule table (`MONDAY`..`SUNDAY`)
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}

/// Parse a weekday name as stored in the schedule table
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "MONDAY" => Some(Weekday::Mon),
        "TUESDAY" => Some(Weekday::Tue),
        "WEDNESDAY" => Some(Weekday::Wed),
        "THURSDAY" => Some(Weekday::Thu),
        "FRIDAY" => Some(Weekday::Fri),
        "SATURDAY" => Some(Weekday::Sat),
        "SUNDAY" => Some(Weekday::Sun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn date_round_trip() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(format_date(date), "2026-03-09");
        assert_eq!(parse_date("2026-03-09"), Some(date));
        assert_eq!(parse_date("09/03/2026"), None);
    }

    #[test]
    fn time_round_trip() {
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(format_time(time), "09:00:00");
        assert_eq!(parse_time("09:00:00"), Some(time));
        // Short form accepted for hand-written input
        assert_eq!(parse_time("09:00"), Some(time));
        assert_eq!(parse_time("9am"), None);
    }

    #[test]
    fn weekday_round_trip() {
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            assert_eq!(parse_weekday(weekday_name(day)), Some(day));
        }
        assert_eq!(parse_weekday("monday"), None);
    }

    #[test]
    fn now_returns_time() {
        let t = now();
        assert!(t.year() >= 2020);
        assert!(t.year() <= 2100);
    }
}
