//! Planning kernel: wires the pure planning components to a caller's stores.
//!
//! Storage and natural-language parsing live outside this crate; they are
//! reached only through the three collaborator traits below.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::block::TimeBlock;
use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::layout::{DailyLayoutEngine, WorkHours};
use crate::priority::PriorityModel;
use crate::ranker::TaskRanker;
use crate::risk::{RiskAssessment, RiskModel};
use crate::task::{Task, TaskStatus, TaskUpdate};
use crate::technique::Technique;
use crate::weekly::{UnavailableWindow, WeeklyDistributor, WeeklySchedule};

/// Read access to a user's tasks plus partial updates.
pub trait TaskStore {
    /// Tasks for `user_id`, optionally only those with `status`. Completed
    /// tasks should come back most recent first.
    fn get_tasks_for_user(&self, user_id: &str, status: Option<TaskStatus>) -> Result<Vec<Task>>;

    fn get_task(&self, task_id: &str) -> Result<Option<Task>>;

    fn update_task(&mut self, task_id: &str, update: &TaskUpdate) -> Result<()>;
}

/// Persists a day's blocks, replacing whatever was stored for that date.
pub trait ScheduleStore {
    fn save_schedule(&mut self, user_id: &str, date: NaiveDate, blocks: &[TimeBlock]) -> Result<()>;
}

/// Turns free text ("busy Friday 1-3") into unavailable windows.
pub trait PreferenceParser {
    fn parse(&self, text: &str, reference_date: NaiveDate) -> Result<Vec<UnavailableWindow>>;
}

#[derive(Debug, Clone)]
pub struct DayRequest {
    pub date: NaiveDate,
    pub hours: WorkHours,
    pub technique: Technique,
}

#[derive(Debug, Clone)]
pub struct WeekRequest {
    pub start_date: NaiveDate,
    pub hours: WorkHours,
    pub technique: Technique,
    /// Free text handed to the preference parser, if one is installed.
    pub preferences: Option<String>,
    /// Already-structured windows, applied alongside parsed ones.
    pub unavailable: Vec<UnavailableWindow>,
}

pub struct PlanningKernel<T: TaskStore, S: ScheduleStore> {
    tasks: T,
    schedules: S,
    parser: Option<Box<dyn PreferenceParser>>,
    ranker: TaskRanker,
    risk: RiskModel,
    layout: DailyLayoutEngine,
    weekly: WeeklyDistributor,
}

impl<T: TaskStore, S: ScheduleStore> PlanningKernel<T, S> {
    pub fn new(config: PlannerConfig, tasks: T, schedules: S) -> Result<Self, PlanError> {
        config.validate()?;
        Ok(Self {
            tasks,
            schedules,
            parser: None,
            ranker: TaskRanker::new(PriorityModel::new(config.priority.clone())),
            risk: RiskModel::new(config.risk.clone()),
            layout: DailyLayoutEngine::new(&config),
            weekly: WeeklyDistributor::new(&config),
        })
    }

    pub fn with_preference_parser(mut self, parser: impl PreferenceParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn task_store(&self) -> &T {
        &self.tasks
    }

    pub fn schedule_store(&self) -> &S {
        &self.schedules
    }

    pub fn into_parts(self) -> (T, S) {
        (self.tasks, self.schedules)
    }

    /// Rank the user's pending tasks and write each fresh score back.
    pub fn prioritize_user(&mut self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Task>> {
        let pending = self
            .tasks
            .get_tasks_for_user(user_id, Some(TaskStatus::Pending))
            .context("load pending tasks")?;
        let ranked = self.ranker.prioritize(pending, now);

        for task in &ranked {
            if let Some(score) = task.priority_score {
                self.tasks
                    .update_task(&task.id, &TaskUpdate::priority_score(score))
                    .with_context(|| format!("store priority for {}", task.id))?;
            }
        }
        Ok(ranked)
    }

    /// Apply a partial update; the score is recomputed only when a scoring
    /// input changed. Returns `None` when the task does not exist.
    pub fn update_task(
        &mut self,
        task_id: &str,
        mut update: TaskUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>> {
        let Some(mut task) = self.tasks.get_task(task_id)? else {
            return Ok(None);
        };

        task.apply_update(&update);
        if PriorityModel::needs_rescore(&update) {
            let score = self.ranker.model().calculate_priority_score(&task, now);
            task.priority_score = Some(score);
            update.priority_score = Some(score);
        }

        self.tasks
            .update_task(task_id, &update)
            .with_context(|| format!("update task {task_id}"))?;
        Ok(Some(task))
    }

    /// Risk for one task, using the user's completed tasks as history.
    pub fn assess_risk(
        &self,
        user_id: &str,
        task_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<RiskAssessment>> {
        let Some(task) = self.tasks.get_task(task_id)? else {
            return Ok(None);
        };
        let history = self
            .tasks
            .get_tasks_for_user(user_id, Some(TaskStatus::Completed))
            .context("load completed tasks")?;
        Ok(Some(self.risk.predict_procrastination_risk(&task, &history, now)))
    }

    pub fn plan_day(
        &mut self,
        user_id: &str,
        request: &DayRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeBlock>> {
        let tasks = self.open_tasks(user_id, now)?;
        let blocks = self.layout.generate_daily_schedule(
            &tasks,
            request.date,
            request.hours,
            request.technique,
        );
        self.schedules
            .save_schedule(user_id, request.date, &blocks)
            .with_context(|| format!("save schedule for {}", request.date))?;
        Ok(blocks)
    }

    pub fn plan_week(
        &mut self,
        user_id: &str,
        request: &WeekRequest,
        now: DateTime<Utc>,
    ) -> Result<WeeklySchedule> {
        let tasks = self.open_tasks(user_id, now)?;

        let mut windows = request.unavailable.clone();
        windows.extend(self.parsed_windows(request));

        let week = self.weekly.generate_weekly_schedule(
            &tasks,
            request.start_date,
            request.hours,
            request.technique,
            &windows,
        );

        for (date, blocks) in week.iter() {
            self.schedules
                .save_schedule(user_id, *date, blocks)
                .with_context(|| format!("save schedule for {date}"))?;
        }
        Ok(week)
    }

    /// Every non-completed task, freshly scored.
    fn open_tasks(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Task>> {
        let tasks: Vec<Task> = self
            .tasks
            .get_tasks_for_user(user_id, None)
            .context("load tasks")?
            .into_iter()
            .filter(|t| t.status != TaskStatus::Completed)
            .collect();
        Ok(self.ranker.prioritize(tasks, now))
    }

    /// Parser failures degrade to "no windows" rather than failing the plan.
    fn parsed_windows(&self, request: &WeekRequest) -> Vec<UnavailableWindow> {
        let (Some(parser), Some(text)) = (&self.parser, request.preferences.as_deref()) else {
            return Vec::new();
        };
        if text.trim().is_empty() {
            return Vec::new();
        }
        match parser.parse(text, request.start_date) {
            Ok(windows) => windows,
            Err(err) => {
                tracing::warn!(error = %err, "preference parsing failed; scheduling without windows");
                Vec::new()
            }
        }
    }
}
