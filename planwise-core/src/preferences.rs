//! Rule-based preference parsing: short "busy" clauses to unavailable windows.
//!
//! Accepted clause shapes (one per line or `;`-separated):
//!
//! ```text
//! 2026-02-20 12-14 dentist
//! tomorrow from 9 to 11 lab meeting
//! fri 13:00-15:00
//! ```
//!
//! Weekdays resolve to the next occurrence on or after the reference date.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;

use crate::kernel::PreferenceParser;
use crate::weekly::UnavailableWindow;

#[derive(Debug, Clone, Copy, Default)]
pub struct RulePreferenceParser;

impl RulePreferenceParser {
    pub fn new() -> Self {
        Self
    }
}

impl PreferenceParser for RulePreferenceParser {
    fn parse(&self, text: &str, reference_date: NaiveDate) -> Result<Vec<UnavailableWindow>> {
        let clause_re = Regex::new(concat!(
            r"(?i)^(?P<day>\d{4}-\d{2}-\d{2}|today|tomorrow|[a-z]+)\s+",
            r"(?:from\s+)?(?P<start>\d{1,2})(?::00)?\s*(?:-|to)\s*",
            r"(?P<end>\d{1,2})(?::00)?",
            r"(?:\s*[:,-]?\s+(?P<reason>.+))?$",
        ))?;

        let mut windows = Vec::new();
        for clause in text.split(['\n', ';']).map(str::trim).filter(|c| !c.is_empty()) {
            let Some(caps) = clause_re.captures(clause) else {
                tracing::warn!(clause, "skipping unrecognised preference clause");
                continue;
            };
            let Some(date) = resolve_day(&caps["day"], reference_date) else {
                tracing::warn!(clause, "skipping preference clause with unknown day");
                continue;
            };
            let start_hour: i32 = caps["start"].parse()?;
            let end_hour: i32 = caps["end"].parse()?;
            let reason = caps
                .name("reason")
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            windows.push(UnavailableWindow::new(date, start_hour, end_hour, reason));
        }

        tracing::debug!(count = windows.len(), "parsed unavailable windows");
        Ok(windows)
    }
}

fn resolve_day(raw: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let lower = raw.to_ascii_lowercase();
    match lower.as_str() {
        "today" => return Some(reference),
        "tomorrow" => return reference.succ_opt(),
        _ => {}
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    let target = weekday(&lower)?;
    let ahead = (7 + target.num_days_from_monday() - reference.weekday().num_days_from_monday()) % 7;
    Some(reference + Duration::days(i64::from(ahead)))
}

fn weekday(name: &str) -> Option<Weekday> {
    let day = match name {
        "mon" | "monday" => Weekday::Mon,
        "tue" | "tues" | "tuesday" => Weekday::Tue,
        "wed" | "wednesday" => Weekday::Wed,
        "thu" | "thur" | "thurs" | "thursday" => Weekday::Thu,
        "fri" | "friday" => Weekday::Fri,
        "sat" | "saturday" => Weekday::Sat,
        "sun" | "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
    }

    #[test]
    fn parses_mixed_clauses() {
        let text = "2026-02-18 12-14 dentist\ntomorrow from 9 to 11 lab meeting; fri 13:00-15:00";
        let windows = RulePreferenceParser::new().parse(text, monday()).unwrap();

        assert_eq!(windows.len(), 3);
        assert_eq!(
            windows[0],
            UnavailableWindow::new(NaiveDate::from_ymd_opt(2026, 2, 18).unwrap(), 12, 14, "dentist")
        );
        assert_eq!(windows[1].date, NaiveDate::from_ymd_opt(2026, 2, 17).unwrap());
        assert_eq!((windows[1].start_hour, windows[1].end_hour), (9, 11));
        assert_eq!(windows[1].reason, "lab meeting");
        assert_eq!(windows[2].date, NaiveDate::from_ymd_opt(2026, 2, 20).unwrap());
        assert_eq!(windows[2].reason, "");
    }

    #[test]
    fn same_weekday_resolves_to_reference_date() {
        let windows = RulePreferenceParser::new().parse("monday 8-9 run", monday()).unwrap();
        assert_eq!(windows[0].date, monday());
    }

    #[test]
    fn garbage_is_skipped_not_fatal() {
        let windows = RulePreferenceParser::new()
            .parse("I'd rather not work late\nsomeday 1-2 nap\ntoday 16-18 gym", monday())
            .unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].reason, "gym");
    }
}
