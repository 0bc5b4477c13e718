use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use planwise_core::{
    unplaced_tasks, BlockKind, DayRequest, PlanningKernel, PriorityLabel, RulePreferenceParser,
    TaskStore, Technique, TimeBlock, WeekRequest, WorkHours,
};
use std::fs;
use std::path::{Path, PathBuf};

use crate::calendar::{CalendarEvent, blocks_to_events, events_to_ics, week_to_events};
use crate::config::{self, Config};
use crate::state;
use crate::store::{JsonScheduleStore, JsonTaskStore};

type Kernel = PlanningKernel<JsonTaskStore, JsonScheduleStore>;

/// Per-run overrides of the `[schedule]` section.
#[derive(Debug, Default)]
pub struct HoursOverride {
    pub start: Option<u32>,
    pub end: Option<u32>,
    pub technique: Option<String>,
}

impl HoursOverride {
    fn resolve(&self, cfg: &Config) -> Result<(WorkHours, Technique)> {
        let hours = match (self.start, self.end) {
            (None, None) => cfg.schedule.work_hours()?,
            (start, end) => WorkHours::new(
                start.unwrap_or(cfg.schedule.work_start_hour),
                end.unwrap_or(cfg.schedule.work_end_hour),
            )?,
        };
        let technique = self
            .technique
            .as_deref()
            .map_or(cfg.schedule.technique, Technique::parse);
        Ok((hours, technique))
    }
}

fn open_kernel(cfg: &Config) -> Result<Kernel> {
    let tasks = JsonTaskStore::open(&state::tasks_path()?, &state::history_path()?, cfg.schedule.tz()?)?;
    let schedules = JsonScheduleStore::new(state::schedules_dir()?);
    let kernel = PlanningKernel::new(cfg.planner.clone(), tasks, schedules)
        .context("build planner")?
        .with_preference_parser(RulePreferenceParser::new());
    Ok(kernel)
}

pub fn init() -> Result<()> {
    config::init_config()?;
    let tasks = state::tasks_path()?;
    if !tasks.exists() {
        fs::write(&tasks, "[]\n").with_context(|| format!("write {}", tasks.display()))?;
        println!("Wrote {}", tasks.display());
    }
    println!("Add tasks to {} and run: planwise prioritize", tasks.display());
    Ok(())
}

pub fn prioritize(write: bool) -> Result<()> {
    let cfg = config::load_config()?;
    let user = cfg.schedule.user_id.clone();
    let now = Utc::now();
    let mut kernel = open_kernel(&cfg)?;

    let ranked = kernel.prioritize_user(&user, now)?;
    if ranked.is_empty() {
        println!("No pending tasks.");
        return Ok(());
    }

    println!("{:>3}  {:>6}  {:<6}  {:<6}  {:<12}  Title", "#", "Score", "Label", "Risk", "Id");
    for (i, task) in ranked.iter().enumerate() {
        let score = task.score_or_zero();
        let risk = kernel
            .assess_risk(&user, &task.id, now)?
            .map_or_else(|| "-".to_string(), |r| format!("{:?}", r.level));
        println!(
            "{:>3}  {:>6.2}  {:<6}  {:<6}  {:<12}  {}",
            i + 1,
            score,
            format!("{:?}", PriorityLabel::from_score(score)),
            risk,
            task.id,
            task.title
        );
    }

    if write {
        let (mut tasks, _) = kernel.into_parts();
        tasks.save()?;
        println!("\nScores written to {}", state::tasks_path()?.display());
    }
    Ok(())
}

pub fn risk(task_id: &str) -> Result<()> {
    let cfg = config::load_config()?;
    let kernel = open_kernel(&cfg)?;
    let Some(assessment) = kernel.assess_risk(&cfg.schedule.user_id, task_id, Utc::now())? else {
        bail!("No task with id {task_id}");
    };

    println!("Risk for {task_id}: {:.2} ({:?})", assessment.score, assessment.level);
    if assessment.factors.is_empty() {
        println!("No risk factors.");
    }
    for factor in &assessment.factors {
        println!("- {factor}");
    }
    Ok(())
}

pub fn schedule_day(
    date: Option<NaiveDate>,
    hours: &HoursOverride,
    ics: Option<PathBuf>,
) -> Result<()> {
    let cfg = config::load_config()?;
    let (work_hours, technique) = hours.resolve(&cfg)?;
    let user = cfg.schedule.user_id.clone();
    let mut kernel = open_kernel(&cfg)?;

    let request = DayRequest {
        date: date.unwrap_or_else(|| Utc::now().date_naive()),
        hours: work_hours,
        technique,
    };
    let blocks = kernel.plan_day(&user, &request, Utc::now())?;

    println!("# {} ({technique})\n", request.date);
    print_blocks(&blocks);

    let open = kernel.task_store().get_tasks_for_user(&user, None)?;
    let missing = unplaced_tasks(&open, &blocks);
    if !missing.is_empty() {
        println!("\nNot placed: {}", missing.join(", "));
    }

    if let Some(path) = ics {
        write_ics(&path, &blocks_to_events(&blocks))?;
    }
    Ok(())
}

pub fn schedule_week(
    start_date: Option<NaiveDate>,
    hours: &HoursOverride,
    unavailable: &[String],
    ics: Option<PathBuf>,
) -> Result<()> {
    let cfg = config::load_config()?;
    let (work_hours, technique) = hours.resolve(&cfg)?;
    let user = cfg.schedule.user_id.clone();
    let mut kernel = open_kernel(&cfg)?;

    let request = WeekRequest {
        start_date: start_date.unwrap_or_else(|| Utc::now().date_naive()),
        hours: work_hours,
        technique,
        preferences: (!unavailable.is_empty()).then(|| unavailable.join("\n")),
        unavailable: Vec::new(),
    };
    let week = kernel.plan_week(&user, &request, Utc::now())?;

    for (date, blocks) in week.iter() {
        let minutes: i64 = blocks.iter().filter(|b| b.is_work()).map(TimeBlock::minutes).sum();
        println!("## {date} {}  ({}h{:02}m of work)", date.format("%a"), minutes / 60, minutes % 60);
        print_blocks(blocks);
        println!();
    }

    let open = kernel.task_store().get_tasks_for_user(&user, None)?;
    let missing = week.unplaced(&open);
    if !missing.is_empty() {
        println!("Not placed this week: {}", missing.join(", "));
    }

    if let Some(path) = ics {
        write_ics(&path, &week_to_events(&week))?;
    }
    Ok(())
}

fn print_blocks(blocks: &[TimeBlock]) {
    if blocks.is_empty() {
        println!("(nothing scheduled)");
        return;
    }
    for b in blocks {
        let label = match b.kind {
            BlockKind::Work => "work",
            BlockKind::Break => "break",
            BlockKind::Unavailable => "busy",
        };
        println!(
            "{}-{}  {:<5}  {}",
            b.start_time.format("%H:%M"),
            b.end_time.format("%H:%M"),
            label,
            b.title
        );
    }
}

fn write_ics(path: &Path, events: &[CalendarEvent]) -> Result<()> {
    fs::write(path, events_to_ics(events)).with_context(|| format!("write {}", path.display()))?;
    println!("Wrote {} events to {}", events.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_fall_back_to_the_schedule_section() {
        let mut cfg = Config::default();
        cfg.schedule.work_start_hour = 8;
        cfg.schedule.technique = Technique::TimeBlocking;

        let (hours, technique) = HoursOverride::default().resolve(&cfg).unwrap();
        assert_eq!((hours.start(), hours.end()), (8, 17));
        assert_eq!(technique, Technique::TimeBlocking);

        let partial = HoursOverride {
            end: Some(12),
            technique: Some("52-17".into()),
            ..HoursOverride::default()
        };
        let (hours, technique) = partial.resolve(&cfg).unwrap();
        assert_eq!((hours.start(), hours.end()), (8, 12));
        assert_eq!(technique, Technique::FiftyTwoSeventeen);
    }

    #[test]
    fn bad_configured_hours_are_an_error() {
        let mut cfg = Config::default();
        cfg.schedule.work_start_hour = 20;
        assert!(HoursOverride::default().resolve(&cfg).is_err());
    }
}
