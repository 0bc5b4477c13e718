//! Task ranker: rescore, then order by priority.

use chrono::{DateTime, Utc};

use crate::priority::PriorityModel;
use crate::task::Task;

#[derive(Debug, Clone, Default)]
pub struct TaskRanker {
    model: PriorityModel,
}

impl TaskRanker {
    pub fn new(model: PriorityModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &PriorityModel {
        &self.model
    }

    /// Recompute every `priority_score`, then sort descending.
    ///
    /// The sort is stable: tasks with equal scores keep their input order,
    /// so ranking an already-ranked list is a no-op.
    pub fn prioritize(&self, mut tasks: Vec<Task>, now: DateTime<Utc>) -> Vec<Task> {
        for task in tasks.iter_mut() {
            task.priority_score = Some(self.model.calculate_priority_score(task, now));
        }
        sort_by_priority(&mut tasks);
        tracing::debug!(count = tasks.len(), "ranked tasks");
        tasks
    }
}

/// Stable descending sort on the stored score (unscored tasks count as 0).
pub fn sort_by_priority<T: AsRef<Task>>(tasks: &mut [T]) {
    tasks.sort_by(|a, b| {
        b.as_ref()
            .score_or_zero()
            .total_cmp(&a.as_ref().score_or_zero())
    });
}

impl AsRef<Task> for Task {
    fn as_ref(&self) -> &Task {
        self
    }
}
