//! Priority model: urgency, importance and effort folded into one 0-100 score.
//!
//! Deliberately a fixed, interpretable formula. Every sub-score is exposed
//! through `PriorityBreakdown` so a UI can show why a task ranks where it does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PriorityConfig;
use crate::task::{Deadline, Task, TaskUpdate};
use crate::time::whole_days_until;

/// Urgency used when there is no deadline or it cannot be read.
pub const NEUTRAL_URGENCY: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub urgency: f64,
    pub importance: f64,
    pub effort_factor: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityLabel {
    High,
    Medium,
    Low,
}

impl PriorityLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            Self::High
        } else if score >= 40.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PriorityModel {
    config: PriorityConfig,
}

impl PriorityModel {
    pub fn new(config: PriorityConfig) -> Self {
        Self { config }
    }

    pub fn calculate_priority_score(&self, task: &Task, now: DateTime<Utc>) -> f64 {
        self.breakdown(task, now).score
    }

    pub fn breakdown(&self, task: &Task, now: DateTime<Utc>) -> PriorityBreakdown {
        let urgency = self.urgency(task.deadline.as_ref(), now);
        let importance = self.importance(task.weight);
        let effort_factor = self.effort_factor(task.estimated_effort);

        let raw = urgency * self.config.urgency_weight
            + importance * self.config.importance_weight
            + effort_factor * self.config.effort_weight;

        PriorityBreakdown {
            urgency,
            importance,
            effort_factor,
            score: round2(raw.clamp(0.0, 100.0)),
        }
    }

    /// Step function over whole days left until the deadline.
    pub fn urgency(&self, deadline: Option<&Deadline>, now: DateTime<Utc>) -> f64 {
        match deadline.and_then(Deadline::instant) {
            Some(at) => urgency_for_days(whole_days_until(at, now)),
            None => NEUTRAL_URGENCY,
        }
    }

    pub fn importance(&self, weight: f64) -> f64 {
        (weight * self.config.importance_multiplier).clamp(0.0, 100.0)
    }

    /// Quick wins score high; effort at or past the ceiling scores 0.
    pub fn effort_factor(&self, effort_hours: f64) -> f64 {
        (100.0 - effort_hours / self.config.effort_ceiling_hours * 100.0).clamp(0.0, 100.0)
    }

    /// An update only invalidates the stored score if it changes an input.
    pub fn needs_rescore(update: &TaskUpdate) -> bool {
        update.touches_priority_inputs()
    }
}

fn urgency_for_days(days: i64) -> f64 {
    match days {
        d if d < 0 => 100.0,
        0 => 95.0,
        1..=3 => 90.0,
        4..=7 => 70.0,
        8..=14 => 50.0,
        15..=30 => 30.0,
        _ => 10.0,
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn overdue_zero_weight_default_effort_scores_68() {
        let model = PriorityModel::default();
        let task = Task::new("t1", "late lab")
            .with_deadline(now() - Duration::days(2))
            .with_effort(2.0);

        let b = model.breakdown(&task, now());
        assert_eq!(b.urgency, 100.0);
        assert_eq!(b.importance, 0.0);
        assert_eq!(b.effort_factor, 90.0);
        assert_eq!(b.score, 68.0);
    }

    #[test]
    fn urgency_steps() {
        let model = PriorityModel::default();
        let at = |d: i64| Deadline::At(now() + Duration::days(d) + Duration::minutes(1));
        assert_eq!(model.urgency(Some(&at(0)), now()), 95.0);
        assert_eq!(model.urgency(Some(&at(3)), now()), 90.0);
        assert_eq!(model.urgency(Some(&at(7)), now()), 70.0);
        assert_eq!(model.urgency(Some(&at(14)), now()), 50.0);
        assert_eq!(model.urgency(Some(&at(30)), now()), 30.0);
        assert_eq!(model.urgency(Some(&at(31)), now()), 10.0);
        assert_eq!(model.urgency(None, now()), NEUTRAL_URGENCY);
        assert_eq!(
            model.urgency(Some(&Deadline::Unparseable("soon".into())), now()),
            NEUTRAL_URGENCY
        );
    }

    #[test]
    fn importance_caps_at_100() {
        let model = PriorityModel::default();
        assert_eq!(model.importance(25.0), 50.0);
        assert_eq!(model.importance(80.0), 100.0);
    }

    #[test]
    fn effort_floors_at_zero() {
        let model = PriorityModel::default();
        assert_eq!(model.effort_factor(20.0), 0.0);
        assert_eq!(model.effort_factor(40.0), 0.0);
        assert_eq!(model.effort_factor(5.0), 75.0);
    }

    #[test]
    fn sooner_deadline_never_scores_lower() {
        let model = PriorityModel::default();
        let mut last = f64::MAX;
        for days in -3..60 {
            let t = Task::new("t", "x")
                .with_deadline(now() + Duration::days(days))
                .with_weight(20.0)
                .with_effort(3.0);
            let s = model.calculate_priority_score(&t, now());
            assert!(s <= last, "day {days}: {s} > {last}");
            assert!((0.0..=100.0).contains(&s));
            last = s;
        }
    }

    #[test]
    fn labels() {
        assert_eq!(PriorityLabel::from_score(70.0), PriorityLabel::High);
        assert_eq!(PriorityLabel::from_score(55.5), PriorityLabel::Medium);
        assert_eq!(PriorityLabel::from_score(12.0), PriorityLabel::Low);
    }
}
