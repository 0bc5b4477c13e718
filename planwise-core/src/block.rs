//! Time blocks: the output of schedule synthesis.
//!
//! serde-ready so a caller can persist a day's blocks verbatim.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Work,
    Break,
    Unavailable,
}

/// Half-open interval `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Only set on work blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl TimeBlock {
    pub fn work(
        task: &Task,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        description_limit: usize,
    ) -> Self {
        Self {
            start_time,
            end_time,
            kind: BlockKind::Work,
            task_id: Some(task.id.clone()),
            title: task.title.clone(),
            description: task.description.chars().take(description_limit).collect(),
        }
    }

    pub fn rest(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time,
            kind: BlockKind::Break,
            task_id: None,
            title: "Break".to_string(),
            description: "Take a break".to_string(),
        }
    }

    pub fn unavailable(start_time: DateTime<Utc>, end_time: DateTime<Utc>, reason: &str) -> Self {
        let description = if reason.trim().is_empty() {
            "Not available during this time".to_string()
        } else {
            reason.trim().to_string()
        };
        Self {
            start_time,
            end_time,
            kind: BlockKind::Unavailable,
            task_id: None,
            title: "Unavailable".to_string(),
            description,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    pub fn is_work(&self) -> bool {
        self.kind == BlockKind::Work
    }

    /// Minimal invariants for safe persistence.
    pub fn validate(&self) -> Result<(), String> {
        if self.end_time <= self.start_time {
            return Err("end_time must be after start_time".to_string());
        }
        match (self.kind, &self.task_id) {
            (BlockKind::Work, None) => Err("work blocks need a task_id".to_string()),
            (BlockKind::Break | BlockKind::Unavailable, Some(_)) => {
                Err("only work blocks carry a task_id".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Check a day's blocks: each valid, ordered by start, none overlapping.
pub fn validate_day(blocks: &[TimeBlock]) -> Result<(), String> {
    for (idx, block) in blocks.iter().enumerate() {
        block.validate().map_err(|e| format!("blocks[{idx}]: {e}"))?;
    }
    for (idx, pair) in blocks.windows(2).enumerate() {
        if pair[1].start_time < pair[0].end_time {
            return Err(format!("blocks[{}] overlaps blocks[{idx}]", idx + 1));
        }
    }
    Ok(())
}

/// Ids of schedulable tasks that got no work block at all.
pub fn unplaced_tasks(tasks: &[Task], blocks: &[TimeBlock]) -> Vec<String> {
    let placed: HashSet<&str> = blocks
        .iter()
        .filter(|b| b.is_work())
        .filter_map(|b| b.task_id.as_deref())
        .collect();
    tasks
        .iter()
        .filter(|t| t.is_schedulable() && !placed.contains(t.id.as_str()))
        .map(|t| t.id.clone())
        .collect()
}
