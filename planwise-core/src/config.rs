//! Planner tuning knobs, passed explicitly into each model.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// Weights and scales for the 0-100 priority score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityConfig {
    pub urgency_weight: f64,
    pub importance_weight: f64,
    pub effort_weight: f64,
    /// Grade weight is multiplied by this to get importance (capped at 100).
    pub importance_multiplier: f64,
    /// Effort (hours) at which the effort factor bottoms out at 0.
    pub effort_ceiling_hours: f64,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            urgency_weight: 0.5,
            importance_weight: 0.3,
            effort_weight: 0.2,
            importance_multiplier: 2.0,
            effort_ceiling_hours: 20.0,
        }
    }
}

/// Thresholds and increments of the additive procrastination-risk model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub far_deadline_days: f64,
    pub far_deadline_increment: f64,
    pub near_deadline_days: f64,
    pub near_deadline_increment: f64,
    pub high_effort_hours: f64,
    pub high_effort_increment: f64,
    pub low_weight_below: f64,
    pub low_weight_increment: f64,
    /// How many recent burnout ratings to average.
    pub burnout_window: usize,
    pub high_burnout_mean: f64,
    pub high_burnout_increment: f64,
    pub moderate_burnout_mean: f64,
    pub moderate_burnout_increment: f64,
    pub score_cap: f64,
    pub high_level_above: f64,
    pub medium_level_above: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            far_deadline_days: 14.0,
            far_deadline_increment: 0.30,
            near_deadline_days: 7.0,
            near_deadline_increment: 0.10,
            high_effort_hours: 5.0,
            high_effort_increment: 0.25,
            low_weight_below: 10.0,
            low_weight_increment: 0.15,
            burnout_window: 5,
            high_burnout_mean: 2.5,
            high_burnout_increment: 0.35,
            moderate_burnout_mean: 3.5,
            moderate_burnout_increment: 0.10,
            score_cap: 0.95,
            high_level_above: 0.7,
            medium_level_above: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub priority: PriorityConfig,
    pub risk: RiskConfig,
    /// Characters of task description copied onto each work block.
    pub description_limit: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            priority: PriorityConfig::default(),
            risk: RiskConfig::default(),
            description_limit: 100,
        }
    }
}

impl PlannerConfig {
    /// Reject settings that would push scores outside their documented bounds.
    pub fn validate(&self) -> Result<(), PlanError> {
        let p = &self.priority;
        for (field, value) in [
            ("priority.urgency_weight", p.urgency_weight),
            ("priority.importance_weight", p.importance_weight),
            ("priority.effort_weight", p.effort_weight),
            ("priority.importance_multiplier", p.importance_multiplier),
        ] {
            non_negative(field, value)?;
        }
        let sum = p.urgency_weight + p.importance_weight + p.effort_weight;
        if sum > 1.0 + 1e-9 {
            return Err(PlanError::WeightSumTooLarge { sum });
        }
        if !(p.effort_ceiling_hours.is_finite() && p.effort_ceiling_hours > 0.0) {
            return Err(PlanError::NotPositive {
                field: "priority.effort_ceiling_hours",
                value: p.effort_ceiling_hours,
            });
        }

        let r = &self.risk;
        for (field, value) in [
            ("risk.far_deadline_increment", r.far_deadline_increment),
            ("risk.near_deadline_increment", r.near_deadline_increment),
            ("risk.high_effort_increment", r.high_effort_increment),
            ("risk.low_weight_increment", r.low_weight_increment),
            ("risk.high_burnout_increment", r.high_burnout_increment),
            ("risk.moderate_burnout_increment", r.moderate_burnout_increment),
        ] {
            non_negative(field, value)?;
        }
        if !(0.0..=1.0).contains(&r.score_cap) {
            return Err(PlanError::InvalidRiskCap { value: r.score_cap });
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), PlanError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PlanError::NegativeOrNonFinite { field, value })
    }
}
