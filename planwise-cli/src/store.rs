//! JSON-file stores under the planwise home.

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use planwise_core::{ScheduleStore, Task, TaskRecord, TaskStatus, TaskStore, TaskUpdate, TimeBlock};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::state::{read_json_or_default, schedule_path, write_json};

/// `tasks.json` (open and recently finished work) plus `history.json`
/// (older completed tasks kept around for burnout history).
pub struct JsonTaskStore {
    path: PathBuf,
    tz: Tz,
    records: Vec<TaskRecord>,
    history: Vec<TaskRecord>,
    dirty: bool,
}

impl JsonTaskStore {
    pub fn open(tasks: &Path, history: &Path, tz: Tz) -> Result<Self> {
        let records: Vec<TaskRecord> = read_json_or_default(tasks)?;
        let history: Vec<TaskRecord> = read_json_or_default(history)?;
        tracing::debug!(tasks = records.len(), history = history.len(), "loaded task store");
        Ok(Self {
            path: tasks.to_path_buf(),
            tz,
            records,
            history,
            dirty: false,
        })
    }

    /// Write `tasks.json` back if anything changed.
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        write_json(&self.path, &self.records)?;
        self.dirty = false;
        Ok(())
    }

    fn owned_by(record: &TaskRecord, user_id: &str) -> bool {
        record.user_id.as_deref().is_none_or(|owner| owner == user_id)
    }
}

impl TaskStore for JsonTaskStore {
    fn get_tasks_for_user(&self, user_id: &str, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let mut found: Vec<(Option<&str>, Task)> = self
            .records
            .iter()
            .chain(self.history.iter())
            .filter(|r| Self::owned_by(r, user_id))
            .map(|r| (r.updated_at.as_deref(), Task::from_record(r, self.tz)))
            .filter(|(_, t)| status.is_none_or(|s| t.status == s))
            .collect();

        if status == Some(TaskStatus::Completed) {
            // RFC 3339 strings in one zone sort chronologically; undated last.
            found.sort_by(|a, b| b.0.cmp(&a.0));
        }
        Ok(found.into_iter().map(|(_, t)| t).collect())
    }

    fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        Ok(self
            .records
            .iter()
            .chain(self.history.iter())
            .find(|r| r.id == task_id)
            .map(|r| Task::from_record(r, self.tz)))
    }

    fn update_task(&mut self, task_id: &str, update: &TaskUpdate) -> Result<()> {
        let Some(record) = self.records.iter_mut().find(|r| r.id == task_id) else {
            bail!("no task with id {task_id} in {}", self.path.display());
        };

        let mut task = Task::from_record(record, self.tz);
        task.apply_update(update);

        let fresh = task.to_record();
        record.title = fresh.title;
        record.deadline = fresh.deadline;
        record.estimated_effort = fresh.estimated_effort;
        record.weight = fresh.weight;
        record.status = fresh.status;
        record.priority_score = fresh.priority_score;
        record.updated_at = Some(Utc::now().to_rfc3339());
        self.dirty = true;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSchedule {
    pub user_id: String,
    pub date: NaiveDate,
    pub blocks: Vec<TimeBlock>,
}

/// One `schedules/<date>.json` per day.
pub struct JsonScheduleStore {
    dir: PathBuf,
}

impl JsonScheduleStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl ScheduleStore for JsonScheduleStore {
    fn save_schedule(&mut self, user_id: &str, date: NaiveDate, blocks: &[TimeBlock]) -> Result<()> {
        let path = schedule_path(&self.dir, date);
        let saved = SavedSchedule {
            user_id: user_id.to_string(),
            date,
            blocks: blocks.to_vec(),
        };
        write_json(&path, &saved).with_context(|| format!("save schedule for {date}"))?;
        tracing::debug!(%date, blocks = blocks.len(), path = %path.display(), "saved schedule");
        Ok(())
    }
}
