//! Procrastination risk: an additive, explainable model.
//!
//! Each factor adds a fixed increment when its condition holds. Factors are
//! independent, so several may fire for the same task. The `factors` list is
//! for display only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;
use crate::priority::round2;
use crate::task::{Deadline, Task};
use crate::time::fractional_days_until;

/// Days assumed when a deadline is missing or unreadable.
pub const FALLBACK_DAYS_UNTIL_DEADLINE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: f64,
    pub level: RiskLevel,
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RiskModel {
    config: RiskConfig,
}

impl RiskModel {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// `history` is the user's completed tasks, most recent first. Only
    /// entries carrying a burnout rating count toward the burnout factor.
    pub fn predict_procrastination_risk(
        &self,
        task: &Task,
        history: &[Task],
        now: DateTime<Utc>,
    ) -> RiskAssessment {
        let cfg = &self.config;
        let days_left = task
            .deadline
            .as_ref()
            .and_then(Deadline::instant)
            .map_or(FALLBACK_DAYS_UNTIL_DEADLINE, |at| fractional_days_until(at, now));

        let mut score = 0.0;
        let mut factors = Vec::new();

        // Parkinson's Law: work expands to fill the time available.
        if days_left > cfg.far_deadline_days {
            score += cfg.far_deadline_increment;
            factors.push("Deadline is far away (Parkinson's Law)".to_string());
        } else if days_left > cfg.near_deadline_days {
            score += cfg.near_deadline_increment;
            factors.push("Deadline is more than a week away".to_string());
        }

        if task.estimated_effort > cfg.high_effort_hours {
            score += cfg.high_effort_increment;
            factors.push("High estimated effort requires high activation energy".to_string());
        }

        if task.weight < cfg.low_weight_below {
            score += cfg.low_weight_increment;
            factors.push("Low impact on grade reduces motivation".to_string());
        }

        // Ratings run 1 (exhausted) to 5 (fresh).
        let recent: Vec<u8> = history
            .iter()
            .filter_map(|t| t.burnout_rating)
            .take(cfg.burnout_window)
            .collect();
        if !recent.is_empty() {
            let mean = recent.iter().map(|r| f64::from(*r)).sum::<f64>() / recent.len() as f64;
            if mean <= cfg.high_burnout_mean {
                score += cfg.high_burnout_increment;
                factors.push("Recent high burnout detected".to_string());
            } else if mean <= cfg.moderate_burnout_mean {
                score += cfg.moderate_burnout_increment;
                factors.push("Moderate fatigue in recent tasks".to_string());
            }
        }

        let score = round2(score).clamp(0.0, cfg.score_cap);
        let level = if score > cfg.high_level_above {
            RiskLevel::High
        } else if score > cfg.medium_level_above {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        RiskAssessment { score, level, factors }
    }
}
