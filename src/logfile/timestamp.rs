//! Timestamps carried by every shuffle log line.
//!
//! Lines start with `DD/MM/YY HH:MM:SS.ffffff`. The fraction is mandatory and
//! holds 1 to 6 digits. Two-digit years 69..=99 resolve to 19xx, 00..=68 to 20xx.

use crate::error::TimingError;
use chrono::{Datelike, NaiveDateTime, Timelike};

pub type Timestamp = NaiveDateTime;

/// Layout of the first two whitespace fields of a log line, minus the fraction.
pub const LOG_TIMESTAMP_FORMAT: &str = "%d/%m/%y %H:%M:%S";

const MAX_FRACTION_DIGITS: usize = 6;

/// Parse a `DD/MM/YY HH:MM:SS.ffffff` string.
pub fn parse_timestamp(text: &str) -> Result<Timestamp, TimingError> {
    let malformed = |source| TimingError::Timestamp {
        text: text.to_string(),
        source,
    };

    let Some((seconds, fraction)) = text.rsplit_once('.') else {
        return Err(malformed(None));
    };
    if fraction.is_empty()
        || fraction.len() > MAX_FRACTION_DIGITS
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(malformed(None));
    }

    let ts = NaiveDateTime::parse_from_str(seconds, LOG_TIMESTAMP_FORMAT)
        .map_err(|err| malformed(Some(err)))?;

    // chrono's %y puts 69 in 2069.
    let ts = if ts.year() == 2069 {
        ts.with_year(1969).ok_or_else(|| malformed(None))?
    } else {
        ts
    };

    let micros: u32 = format!("{:0<width$}", fraction, width = MAX_FRACTION_DIGITS)
        .parse()
        .map_err(|_| malformed(None))?;
    ts.with_nanosecond(micros * 1_000)
        .ok_or_else(|| malformed(None))
}

/// Parse the timestamp made of the first two space-separated fields of `line`.
pub fn timestamp_from_line(line: &str) -> Result<Timestamp, TimingError> {
    let mut fields = line.splitn(3, ' ');
    match (fields.next(), fields.next()) {
        (Some(date), Some(time)) => parse_timestamp(&format!("{} {}", date, time)),
        _ => Err(TimingError::MissingTimestamp {
            line: line.to_string(),
        }),
    }
}

/// Render as `YYYY-MM-DD HH:MM:SS`, with a six-digit fraction only when the
/// sub-second part is non-zero.
pub fn format_timestamp(ts: &Timestamp) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

/// `later - earlier` in fractional seconds.
pub fn seconds_between(earlier: &Timestamp, later: &Timestamp) -> f64 {
    let delta = later.signed_duration_since(*earlier);
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        // Spans too wide for i64 microseconds (the empty-fold sentinels).
        None => delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1e9,
    }
}

/// Shortest round-trip float form, keeping `.0` on integral values.
pub fn format_seconds(secs: f64) -> String {
    format!("{:?}", secs)
}
