//! Best-effort compact rendering of upload dates.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%b %d, %Y"];

/// Parse a provider date into the timezone of `tz`.
///
/// Offset-less values are taken to already be in `tz`.
pub fn parse_date<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(tz));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(tz));
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    tz.from_local_datetime(&naive).earliest()
}

/// Render `text` relative to `now`: time of day if today, month and day if
/// this year, full date otherwise. Unparseable text passes through.
pub fn format_date_at<Tz: TimeZone>(text: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(date) = parse_date(text, &now.timezone()) else {
        return text.to_string();
    };

    if date.date_naive() == now.date_naive() {
        date.format("%H:%M").to_string()
    } else if date.year() == now.year() {
        date.format("%b %-d").to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

/// [`format_date_at`] against the local clock.
pub fn format_date(text: &str) -> String {
    format_date_at(text, &Local::now())
}
