//! core::formats
//!
//! Culture-invariant text formats for the well-known scalar types.
//!
//! # Formats
//!
//! - Dates: `yyyy-MM-dd` (e.g. `2024-03-17`)
//! - Time spans: `[-][d.]hh:mm:ss[.fffffff]` (e.g. `1.02:30:00`, `00:00:01.5`)
//!
//! Both directions live here so that generated commands always re-parse.

use chrono::{NaiveDate, TimeDelta};

/// Human-readable date format, shown in usage text and errors.
pub const DATE_FORMAT: &str = "yyyy-MM-dd";

/// Human-readable time span format, shown in usage text and errors.
pub const TIME_SPAN_FORMAT: &str = "[-][d.]hh:mm:ss[.fffffff]";

const CHRONO_DATE_FORMAT: &str = "%Y-%m-%d";
const SECONDS_PER_DAY: i64 = 86_400;
const NANOS_PER_TICK: i32 = 100;

/// Parse a `yyyy-MM-dd` date.
///
/// The format is strict: four-digit year, two-digit month and day.
///
/// # Example
///
/// ```
/// use seedline::core::formats::parse_date;
///
/// assert!(parse_date("2024-03-17").is_some());
/// assert!(parse_date("2024-3-17").is_none());
/// assert!(parse_date("17/03/2024").is_none());
/// ```
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(text, CHRONO_DATE_FORMAT).ok()
}

/// Format a date as `yyyy-MM-dd`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(CHRONO_DATE_FORMAT).to_string()
}

/// Parse a time span in `[-][d.]hh:mm:ss[.fffffff]` form.
///
/// # Example
///
/// ```
/// use chrono::TimeDelta;
/// use seedline::core::formats::parse_time_span;
///
/// assert_eq!(parse_time_span("01:30:00"), Some(TimeDelta::minutes(90)));
/// assert_eq!(parse_time_span("2.00:00:00"), Some(TimeDelta::days(2)));
/// assert_eq!(parse_time_span("-00:00:05"), Some(TimeDelta::seconds(-5)));
/// assert!(parse_time_span("90 minutes").is_none());
/// ```
pub fn parse_time_span(text: &str) -> Option<TimeDelta> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let first_colon = body.find(':')?;
    let (days, rest) = match body[..first_colon].find('.') {
        Some(dot) => (digits(&body[..dot])?, &body[dot + 1..]),
        None => (0, body),
    };

    let (clock, fraction) = match rest.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (rest, None),
    };

    let mut parts = clock.split(':');
    let hours = two_digits(parts.next()?, 24)?;
    let minutes = two_digits(parts.next()?, 60)?;
    let seconds = two_digits(parts.next()?, 60)?;
    if parts.next().is_some() {
        return None;
    }

    let nanos = match fraction {
        Some(f) if !f.is_empty() && f.len() <= 7 && f.bytes().all(|b| b.is_ascii_digit()) => {
            // Right-pad to nanosecond precision.
            format!("{f:0<9}").parse::<i64>().ok()?
        }
        Some(_) => return None,
        None => 0,
    };

    let span = TimeDelta::try_days(days)?
        .checked_add(&TimeDelta::hours(hours))?
        .checked_add(&TimeDelta::minutes(minutes))?
        .checked_add(&TimeDelta::seconds(seconds))?
        .checked_add(&TimeDelta::nanoseconds(nanos))?;

    Some(if negative { -span } else { span })
}

/// Format a time span as `[-][d.]hh:mm:ss[.fffffff]`.
///
/// # Example
///
/// ```
/// use chrono::TimeDelta;
/// use seedline::core::formats::format_time_span;
///
/// assert_eq!(format_time_span(TimeDelta::minutes(90)), "01:30:00");
/// assert_eq!(format_time_span(TimeDelta::hours(26)), "1.02:00:00");
/// assert_eq!(format_time_span(TimeDelta::milliseconds(-1500)), "-00:00:01.5000000");
/// ```
pub fn format_time_span(span: TimeDelta) -> String {
    let negative = span < TimeDelta::zero();
    let span = span.abs();

    let total = span.num_seconds();
    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    let ticks = span.subsec_nanos() / NANOS_PER_TICK;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if ticks > 0 {
        out.push_str(&format!(".{ticks:07}"));
    }
    out
}

fn digits(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn two_digits(text: &str, limit: i64) -> Option<i64> {
    if text.len() != 2 {
        return None;
    }
    digits(text).filter(|v| *v < limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_round_trips() {
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(format_date(date), "1999-12-31");
        assert_eq!(parse_date("1999-12-31"), Some(date));
    }

    #[test]
    fn date_rejects_out_of_range() {
        assert!(parse_date("2023-02-30").is_none());
        assert!(parse_date("2023-13-01").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn time_span_with_fraction() {
        let span = parse_time_span("00:00:01.25").unwrap();
        assert_eq!(span, TimeDelta::milliseconds(1250));
        assert_eq!(format_time_span(span), "00:00:01.2500000");
    }

    #[test]
    fn time_span_rejects_bad_clock() {
        assert!(parse_time_span("24:00:00").is_none());
        assert!(parse_time_span("00:60:00").is_none());
        assert!(parse_time_span("1:00:00").is_none());
        assert!(parse_time_span("00:00").is_none());
        assert!(parse_time_span("00:00:00:00").is_none());
        assert!(parse_time_span("00:00:00.").is_none());
        assert!(parse_time_span("+1.00:00:00").is_none());
    }

    #[test]
    fn time_span_days_round_trip() {
        let text = "3.04:05:06";
        assert_eq!(format_time_span(parse_time_span(text).unwrap()), text);
    }

    #[test]
    fn zero_span_formats_as_midnight() {
        assert_eq!(format_time_span(TimeDelta::zero()), "00:00:00");
    }
}
