//! Boundary validation errors.
//!
//! The planning computations themselves are total; these errors only come
//! out of constructors that validate caller-supplied settings.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("work hours must satisfy start < end <= 24, got {start}..{end}")]
    InvalidWorkHours { start: u32, end: u32 },

    #[error("{field} must be a finite non-negative number, got {value}")]
    NegativeOrNonFinite { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("priority weights must sum to at most 1.0, got {sum}")]
    WeightSumTooLarge { sum: f64 },

    #[error("risk score cap must be within 0..=1, got {value}")]
    InvalidRiskCap { value: f64 },
}
