//! Task model for the planning core.
//!
//! `TaskRecord` is the loosely-typed document shape a store hands us;
//! `Task` is the validated form every planner component works on. All the
//! lenient defaulting happens once, in `Task::from_record`.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::parse_deadline;

/// Effort assumed when a task has none (or a nonsensical one), in hours.
pub const DEFAULT_EFFORT_HOURS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Lenient parse; anything unrecognised is treated as pending.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "in-progress" | "inprogress" => Self::InProgress,
            "completed" | "done" => Self::Completed,
            _ => Self::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task deadline as far as we could make sense of it.
#[derive(Debug, Clone, PartialEq)]
pub enum Deadline {
    At(DateTime<Utc>),
    /// The store had something, but it is not a date we can read. Still
    /// counts as "has a deadline"; scoring falls back to neutral values.
    Unparseable(String),
}

impl Deadline {
    pub fn parse(raw: &str, tz: Tz) -> Self {
        match parse_deadline(raw, tz) {
            Some(at) => Self::At(at),
            None => Self::Unparseable(raw.to_string()),
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::At(at) => Some(*at),
            Self::Unparseable(_) => None,
        }
    }

    /// String form for writing back to a store.
    pub fn to_raw(&self) -> String {
        match self {
            Self::At(at) => at.to_rfc3339(),
            Self::Unparseable(raw) => raw.clone(),
        }
    }
}

/// Stored task document. Every field is optional because upstream
/// extraction (syllabus parsing, imports) is dirty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    pub deadline: Option<String>,
    pub estimated_effort: Option<f64>,
    pub weight: Option<f64>,
    pub status: Option<String>,
    pub priority_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burnout_rating: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Validated task.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,

    /// `None` means no deadline pressure at all.
    pub deadline: Option<Deadline>,

    /// Hours, always finite and positive.
    pub estimated_effort: f64,

    /// Share of the final grade, 0..~100.
    pub weight: f64,

    pub status: TaskStatus,

    /// Derived 0-100 score; may be stale until re-ranked.
    pub priority_score: Option<f64>,

    /// 1 (exhausted) ..= 5 (fresh), recorded when the task was completed.
    pub burnout_rating: Option<u8>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            deadline: None,
            estimated_effort: DEFAULT_EFFORT_HOURS,
            weight: 0.0,
            status: TaskStatus::Pending,
            priority_score: None,
            burnout_rating: None,
        }
    }

    /// Validate a stored record. Naive deadline strings are read in `tz`.
    pub fn from_record(record: &TaskRecord, tz: Tz) -> Self {
        let deadline = record
            .deadline
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| Deadline::parse(raw, tz));

        let title = if record.title.trim().is_empty() {
            "Untitled".to_string()
        } else {
            record.title.clone()
        };

        Self {
            id: record.id.clone(),
            title,
            description: record.description.clone().unwrap_or_default(),
            deadline,
            estimated_effort: sanitize_effort(record.estimated_effort),
            weight: sanitize_weight(record.weight),
            status: record
                .status
                .as_deref()
                .map(TaskStatus::parse)
                .unwrap_or_default(),
            priority_score: record.priority_score.filter(|s| s.is_finite()),
            burnout_rating: record
                .burnout_rating
                .filter(|r| (1..=5).contains(r))
                .and_then(|r| u8::try_from(r).ok()),
        }
    }

    /// Layout and distribution only consider tasks that have a deadline and
    /// are not completed.
    pub fn is_schedulable(&self) -> bool {
        self.deadline.is_some() && self.status != TaskStatus::Completed
    }

    /// Stored score, 0 when the task was never ranked.
    pub fn score_or_zero(&self) -> f64 {
        self.priority_score.unwrap_or(0.0)
    }

    /// Effort rounded down to whole minutes.
    pub fn effort_minutes(&self) -> i64 {
        (self.estimated_effort * 60.0) as i64
    }

    /// Merge a partial update into this task, applying the same defaults as
    /// `from_record`.
    pub fn apply_update(&mut self, update: &TaskUpdate) {
        if let Some(deadline) = &update.deadline {
            self.deadline = Some(deadline.clone());
        }
        if let Some(effort) = update.estimated_effort {
            self.estimated_effort = sanitize_effort(Some(effort));
        }
        if let Some(weight) = update.weight {
            self.weight = sanitize_weight(Some(weight));
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(score) = update.priority_score.filter(|s| s.is_finite()) {
            self.priority_score = Some(score);
        }
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(Deadline::At(deadline));
        self
    }

    pub fn with_effort(mut self, hours: f64) -> Self {
        self.estimated_effort = sanitize_effort(Some(hours));
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = sanitize_weight(Some(weight));
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority_score(mut self, score: f64) -> Self {
        self.priority_score = Some(score);
        self
    }

    pub fn with_burnout_rating(mut self, rating: u8) -> Self {
        self.burnout_rating = Some(rating).filter(|r| (1..=5).contains(r));
        self
    }

    /// Back to the stored shape. Owner, course and timestamps are left for
    /// the store to carry over.
    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            description: Some(self.description.clone()).filter(|d| !d.is_empty()),
            deadline: self.deadline.as_ref().map(Deadline::to_raw),
            estimated_effort: Some(self.estimated_effort),
            weight: Some(self.weight),
            status: Some(self.status.to_string()),
            priority_score: self.priority_score,
            burnout_rating: self.burnout_rating.map(i64::from),
            ..TaskRecord::default()
        }
    }
}

/// Partial update proposed for a stored task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub deadline: Option<Deadline>,
    pub estimated_effort: Option<f64>,
    pub weight: Option<f64>,
    pub status: Option<TaskStatus>,
    pub priority_score: Option<f64>,
}

impl TaskUpdate {
    pub fn priority_score(score: f64) -> Self {
        Self {
            priority_score: Some(score),
            ..Self::default()
        }
    }

    /// True when the update touches an input of the priority score.
    pub fn touches_priority_inputs(&self) -> bool {
        self.deadline.is_some() || self.estimated_effort.is_some() || self.weight.is_some()
    }
}

fn sanitize_effort(effort: Option<f64>) -> f64 {
    effort
        .filter(|e| e.is_finite() && *e > 0.0)
        .unwrap_or(DEFAULT_EFFORT_HOURS)
}

fn sanitize_weight(weight: Option<f64>) -> f64 {
    weight.filter(|w| w.is_finite()).map_or(0.0, |w| w.max(0.0))
}
