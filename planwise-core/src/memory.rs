//! In-memory stores, for tests and for callers that keep state elsewhere.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use chrono::NaiveDate;

use crate::block::TimeBlock;
use crate::kernel::{ScheduleStore, TaskStore};
use crate::task::{Task, TaskStatus, TaskUpdate};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    /// (owner, task) in insertion order.
    tasks: Vec<(String, Task)>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user_id: impl Into<String>, task: Task) {
        self.tasks.push((user_id.into(), task));
    }

    pub fn all_tasks(&self) -> Vec<Task> {
        self.tasks.iter().map(|(_, t)| t.clone()).collect()
    }
}

impl TaskStore for InMemoryTaskStore {
    /// Insertion order, except completed-only queries which return the most
    /// recently inserted first.
    fn get_tasks_for_user(&self, user_id: &str, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let mut found: Vec<Task> = self
            .tasks
            .iter()
            .filter(|(owner, t)| owner == user_id && status.is_none_or(|s| t.status == s))
            .map(|(_, t)| t.clone())
            .collect();
        if status == Some(TaskStatus::Completed) {
            found.reverse();
        }
        Ok(found)
    }

    fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        Ok(self
            .tasks
            .iter()
            .find(|(_, t)| t.id == task_id)
            .map(|(_, t)| t.clone()))
    }

    fn update_task(&mut self, task_id: &str, update: &TaskUpdate) -> Result<()> {
        match self.tasks.iter_mut().find(|(_, t)| t.id == task_id) {
            Some((_, task)) => {
                task.apply_update(update);
                Ok(())
            }
            None => bail!("no task with id {task_id}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleStore {
    saved: BTreeMap<(String, NaiveDate), Vec<TimeBlock>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str, date: NaiveDate) -> Option<&[TimeBlock]> {
        self.saved
            .get(&(user_id.to_string(), date))
            .map(Vec::as_slice)
    }

    pub fn saved_days(&self, user_id: &str) -> usize {
        self.saved.keys().filter(|(owner, _)| owner == user_id).count()
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn save_schedule(&mut self, user_id: &str, date: NaiveDate, blocks: &[TimeBlock]) -> Result<()> {
        self.saved
            .insert((user_id.to_string(), date), blocks.to_vec());
        Ok(())
    }
}
