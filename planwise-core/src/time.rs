//! Time utilities: deadline parsing and day arithmetic.
//!
//! All scheduling instants are UTC. Work hours are hour offsets from the
//! UTC midnight of a date, so hour 24 is the following midnight.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

const SECONDS_PER_DAY: i64 = 86_400;

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse a stored deadline string into UTC.
///
/// RFC 3339 strings keep their own offset (`Z` is UTC). Naive datetimes such
/// as "2026-02-20 23:59" and bare dates are wall-clock time in `tz`; a bare
/// date means midnight. Returns `None` when nothing matches.
pub fn parse_deadline(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })?;

    local_to_utc(naive, tz)
}

/// Resolve a wall-clock time in `tz`. Times skipped by a DST jump resolve
/// to the first valid instant an hour later.
fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whole days from `now` until `deadline`, floored: one hour overdue is -1,
/// twenty-three hours ahead is 0.
pub fn whole_days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (deadline - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Fractional days from `now` until `deadline` (negative when overdue).
pub fn fractional_days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (deadline - now).num_milliseconds() as f64 / (SECONDS_PER_DAY * 1000) as f64
}

/// Calendar-date difference, ignoring time of day.
pub fn calendar_days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// UTC instant `hour` hours after the midnight that starts `date`.
pub fn at_hour(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)) + Duration::hours(i64::from(hour))
}
