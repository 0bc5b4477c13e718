//! Study techniques: how a task's effort is chunked into work and breaks.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Technique {
    /// 25 min work, 5 min break.
    #[default]
    Pomodoro,
    /// 120 min work, 15 min break.
    TimeBlocking,
    /// 52 min work, 17 min break.
    FiftyTwoSeventeen,
    /// Whole task in one continuous block.
    None,
}

/// Fixed work/break rhythm of a technique, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub work_minutes: i64,
    pub break_minutes: i64,
}

impl Technique {
    /// Lenient parse; unknown names behave like `none`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pomodoro" => Self::Pomodoro,
            "timeblocking" | "time-blocking" | "time_blocking" => Self::TimeBlocking,
            "52-17" | "52/17" | "52_17" => Self::FiftyTwoSeventeen,
            _ => Self::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pomodoro => "pomodoro",
            Self::TimeBlocking => "timeblocking",
            Self::FiftyTwoSeventeen => "52-17",
            Self::None => "none",
        }
    }

    /// `None` for the continuous technique.
    pub fn cadence(self) -> Option<Cadence> {
        let (work_minutes, break_minutes) = match self {
            Self::Pomodoro => (25, 5),
            Self::TimeBlocking => (120, 15),
            Self::FiftyTwoSeventeen => (52, 17),
            Self::None => return None,
        };
        Some(Cadence {
            work_minutes,
            break_minutes,
        })
    }
}

impl From<String> for Technique {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Technique> for String {
    fn from(t: Technique) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadences() {
        assert_eq!(Technique::parse("pomodoro").cadence().unwrap().work_minutes, 25);
        assert_eq!(Technique::parse("TimeBlocking").cadence().unwrap().break_minutes, 15);
        assert_eq!(
            Technique::parse("52-17").cadence(),
            Some(Cadence {
                work_minutes: 52,
                break_minutes: 17
            })
        );
        assert_eq!(Technique::parse("none").cadence(), None);
    }

    #[test]
    fn unknown_technique_is_none() {
        assert_eq!(Technique::parse("flowtime"), Technique::None);
        let t: Technique = serde_json::from_str("\"ultradian\"").unwrap();
        assert_eq!(t, Technique::None);
    }
}
