//! Weekly distributor: assigns tasks to days of a 7-day horizon, carves out
//! unavailable windows, then runs the daily layout per free segment.
//!
//! Assignment rules, in order:
//! - overdue tasks go to day 0;
//! - tasks due a week or more out go to the least-loaded day (by assigned
//!   effort, lowest index on ties);
//! - everything else lands the day before its deadline, clamped to 0..=6.
//!
//! Every free segment of a day is laid out from the day's full task list,
//! so a task that fits in the morning is laid out again after a midday
//! window. There is no carry-over between days: whatever a day's window
//! cannot hold is dropped from that day. Overdue tasks are not capped, so a large
//! backlog saturates day 0 and the lowest-priority ones fall off.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::block::{TimeBlock, unplaced_tasks};
use crate::config::PlannerConfig;
use crate::layout::{DailyLayoutEngine, WorkHours};
use crate::ranker::sort_by_priority;
use crate::risk::FALLBACK_DAYS_UNTIL_DEADLINE;
use crate::task::{Deadline, Task};
use crate::technique::Technique;
use crate::time::{at_hour, calendar_days_between};

pub const HORIZON_DAYS: usize = 7;

/// A caller-declared time range on one date that must stay free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableWindow {
    pub date: NaiveDate,
    /// Signed so out-of-range input still deserializes and can be dropped.
    pub start_hour: i32,
    pub end_hour: i32,
    #[serde(default)]
    pub reason: String,
}

impl UnavailableWindow {
    pub fn new(date: NaiveDate, start_hour: i32, end_hour: i32, reason: impl Into<String>) -> Self {
        Self {
            date,
            start_hour,
            end_hour,
            reason: reason.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        0 <= self.start_hour && self.start_hour < self.end_hour && self.end_hour <= 24
    }
}

/// Exactly seven consecutive days of blocks, keyed by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule {
    days: BTreeMap<NaiveDate, Vec<TimeBlock>>,
}

impl WeeklySchedule {
    pub fn days(&self) -> &BTreeMap<NaiveDate, Vec<TimeBlock>> {
        &self.days
    }

    pub fn day(&self, date: NaiveDate) -> Option<&[TimeBlock]> {
        self.days.get(&date).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Vec<TimeBlock>)> {
        self.days.iter()
    }

    pub fn into_days(self) -> BTreeMap<NaiveDate, Vec<TimeBlock>> {
        self.days
    }

    pub fn total_work_minutes(&self) -> i64 {
        self.days
            .values()
            .flatten()
            .filter(|b| b.is_work())
            .map(TimeBlock::minutes)
            .sum()
    }

    /// Schedulable tasks that got no work block anywhere in the week.
    pub fn unplaced(&self, tasks: &[Task]) -> Vec<String> {
        let all: Vec<TimeBlock> = self.days.values().flatten().cloned().collect();
        unplaced_tasks(tasks, &all)
    }
}

/// A merged, work-hour-clamped busy span.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BusySpan {
    start: u32,
    end: u32,
    reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct WeeklyDistributor {
    layout: DailyLayoutEngine,
}

impl WeeklyDistributor {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            layout: DailyLayoutEngine::new(config),
        }
    }

    pub fn generate_weekly_schedule(
        &self,
        tasks: &[Task],
        start_date: NaiveDate,
        hours: WorkHours,
        technique: Technique,
        unavailable_windows: &[UnavailableWindow],
    ) -> WeeklySchedule {
        let windows: Vec<&UnavailableWindow> = unavailable_windows
            .iter()
            .filter(|w| {
                let ok = w.is_valid();
                if !ok {
                    tracing::warn!(
                        date = %w.date,
                        start_hour = w.start_hour,
                        end_hour = w.end_hour,
                        "discarding invalid unavailable window"
                    );
                }
                ok
            })
            .collect();

        let assignments = self.assign_days(tasks, start_date);
        let mut days = BTreeMap::new();

        for (offset, day_tasks) in assignments.iter().enumerate() {
            let date = start_date + Duration::days(offset as i64);
            let busy = busy_spans(
                windows.iter().copied().filter(|w| w.date == date),
                hours,
            );

            let blocks = if day_tasks.is_empty() && busy.is_empty() {
                Vec::new()
            } else {
                self.lay_out_day(day_tasks, date, hours, technique, &busy)
            };
            days.insert(date, blocks);
        }

        tracing::debug!(
            days_with_work = assignments.iter().filter(|d| !d.is_empty()).count(),
            "distributed tasks across the week"
        );
        WeeklySchedule { days }
    }

    /// Bucket schedulable tasks into the seven days of the horizon.
    pub fn assign_days<'a>(
        &self,
        tasks: &'a [Task],
        start_date: NaiveDate,
    ) -> [Vec<&'a Task>; HORIZON_DAYS] {
        let mut buckets: [Vec<&'a Task>; HORIZON_DAYS] = std::array::from_fn(|_| Vec::new());
        let mut loads = [0.0_f64; HORIZON_DAYS];

        let mut sorted: Vec<&Task> = tasks.iter().filter(|t| t.is_schedulable()).collect();
        sorted.sort_by(|a, b| {
            effective_deadline(a, start_date)
                .cmp(&effective_deadline(b, start_date))
                .then_with(|| b.score_or_zero().total_cmp(&a.score_or_zero()))
        });

        for task in sorted {
            let due = effective_deadline(task, start_date).date_naive();
            let days_until = calendar_days_between(start_date, due);

            let day = if days_until < 0 {
                0
            } else if days_until >= HORIZON_DAYS as i64 {
                least_loaded(&loads)
            } else {
                (days_until - 1).clamp(0, HORIZON_DAYS as i64 - 1) as usize
            };

            loads[day] += task.estimated_effort;
            buckets[day].push(task);
        }

        buckets
    }

    fn lay_out_day(
        &self,
        day_tasks: &[&Task],
        date: NaiveDate,
        hours: WorkHours,
        technique: Technique,
        busy: &[BusySpan],
    ) -> Vec<TimeBlock> {
        let mut blocks: Vec<TimeBlock> = busy
            .iter()
            .map(|span| {
                TimeBlock::unavailable(at_hour(date, span.start), at_hour(date, span.end), &span.reason)
            })
            .collect();

        let segments = available_segments(hours, busy);
        tracing::debug!(%date, tasks = day_tasks.len(), ?segments, "available segments");

        let mut ordered: Vec<&Task> = day_tasks.to_vec();
        sort_by_priority(&mut ordered);

        // Each free segment gets the day's full task list; effort is not
        // carried from one segment to the next.
        for segment in segments {
            blocks.extend(self.layout.lay_out(&ordered, date, segment, technique));
        }

        blocks.sort_by_key(|b| b.start_time);
        tracing::debug!(%date, blocks = blocks.len(), "generated day");
        blocks
    }
}

/// Deadline used for ordering and bucketing; unreadable deadlines sit 30
/// days past the start of the horizon.
fn effective_deadline(task: &Task, start_date: NaiveDate) -> DateTime<Utc> {
    task.deadline
        .as_ref()
        .and_then(Deadline::instant)
        .unwrap_or_else(|| {
            at_hour(start_date, 0) + Duration::days(FALLBACK_DAYS_UNTIL_DEADLINE as i64)
        })
}

fn least_loaded(loads: &[f64; HORIZON_DAYS]) -> usize {
    loads
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(idx, _)| idx)
}

/// Clamp windows to the work hours, drop the ones that miss it entirely,
/// and merge overlaps so the resulting blocks never collide.
fn busy_spans<'a>(
    windows: impl Iterator<Item = &'a UnavailableWindow>,
    hours: WorkHours,
) -> Vec<BusySpan> {
    let (lo, hi) = (hours.start() as i32, hours.end() as i32);
    let mut clamped: Vec<BusySpan> = windows
        .filter_map(|w| {
            let start = w.start_hour.max(lo);
            let end = w.end_hour.min(hi);
            (start < end).then(|| BusySpan {
                start: start as u32,
                end: end as u32,
                reason: w.reason.trim().to_string(),
            })
        })
        .collect();
    clamped.sort_by_key(|s| s.start);

    let mut merged: Vec<BusySpan> = Vec::new();
    for span in clamped {
        match merged.last_mut() {
            Some(last) if span.start < last.end => {
                last.end = last.end.max(span.end);
                if !span.reason.is_empty() && last.reason != span.reason {
                    if last.reason.is_empty() {
                        last.reason = span.reason;
                    } else {
                        last.reason = format!("{}; {}", last.reason, span.reason);
                    }
                }
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// Complement of the busy spans within the work hours, left to right.
fn available_segments(hours: WorkHours, busy: &[BusySpan]) -> Vec<WorkHours> {
    let mut segments = Vec::new();
    let mut cursor = hours.start();
    for span in busy {
        if cursor < span.start {
            segments.extend(WorkHours::new(cursor, span.start).ok());
        }
        cursor = cursor.max(span.end);
    }
    if cursor < hours.end() {
        segments.extend(WorkHours::new(cursor, hours.end()).ok());
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockKind, validate_day};
    use chrono::TimeZone;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
    }

    fn due_in(id: &str, days: i64, effort: f64) -> Task {
        Task::new(id, id.to_uppercase())
            .with_deadline(at_hour(start(), 18) + Duration::days(days))
            .with_effort(effort)
    }

    fn day_of<'a>(assign: &[Vec<&'a Task>; HORIZON_DAYS], id: &str) -> usize {
        assign
            .iter()
            .position(|d| d.iter().any(|t| t.id == id))
            .unwrap()
    }

    #[test]
    fn always_seven_days() {
        let dist = WeeklyDistributor::default();
        let week =
            dist.generate_weekly_schedule(&[], start(), WorkHours::default(), Technique::Pomodoro, &[]);
        assert_eq!(week.len(), 7);
        assert!(week.iter().all(|(_, blocks)| blocks.is_empty()));
        assert_eq!(week.days().keys().next(), Some(&start()));
    }

    #[test]
    fn bucketing_rules() {
        let dist = WeeklyDistributor::default();
        let tasks = vec![
            due_in("overdue", -3, 1.0),
            due_in("today", 0, 1.0),
            due_in("thursday", 3, 1.0),
            due_in("sunday", 6, 1.0),
            due_in("far", 20, 1.0),
        ];
        let assign = dist.assign_days(&tasks, start());
        assert_eq!(day_of(&assign, "overdue"), 0);
        assert_eq!(day_of(&assign, "today"), 0);
        assert_eq!(day_of(&assign, "thursday"), 2);
        assert_eq!(day_of(&assign, "sunday"), 5);
        // days 1, 3, 4 and 6 are empty; lowest index wins.
        assert_eq!(day_of(&assign, "far"), 1);
    }

    #[test]
    fn unreadable_deadline_is_treated_as_far_out() {
        let dist = WeeklyDistributor::default();
        let mut odd = Task::new("odd", "ODD");
        odd.deadline = Some(Deadline::Unparseable("whenever".into()));
        let tasks = vec![due_in("a", 1, 3.0), odd];
        let assign = dist.assign_days(&tasks, start());
        assert_eq!(day_of(&assign, "a"), 0);
        assert_eq!(day_of(&assign, "odd"), 1);
    }

    #[test]
    fn same_deadline_higher_priority_first() {
        let dist = WeeklyDistributor::default();
        let tasks = vec![
            due_in("low", 2, 1.0).with_priority_score(10.0),
            due_in("high", 2, 1.0).with_priority_score(80.0),
        ];
        let assign = dist.assign_days(&tasks, start());
        let ids: Vec<&str> = assign[1].iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "low"]);
    }

    #[test]
    fn lunch_window_splits_the_day() {
        let dist = WeeklyDistributor::default();
        let tasks = vec![due_in("essay", 1, 6.0)];
        let windows = vec![UnavailableWindow::new(start(), 12, 14, "Lunch with advisor")];
        let week = dist.generate_weekly_schedule(
            &tasks,
            start(),
            WorkHours::default(),
            Technique::None,
            &windows,
        );

        let blocks = week.day(start()).unwrap();
        validate_day(blocks).unwrap();
        let unavailable: Vec<&TimeBlock> =
            blocks.iter().filter(|b| b.kind == BlockKind::Unavailable).collect();
        assert_eq!(unavailable.len(), 1);
        assert_eq!(unavailable[0].start_time, Utc.with_ymd_and_hms(2026, 2, 16, 12, 0, 0).unwrap());
        assert_eq!(unavailable[0].end_time, Utc.with_ymd_and_hms(2026, 2, 16, 14, 0, 0).unwrap());
        assert_eq!(unavailable[0].description, "Lunch with advisor");

        // Both segments restart the essay and each is clipped to 3h.
        let work: Vec<(u32, i64)> = blocks
            .iter()
            .filter(|b| b.is_work())
            .map(|b| (chrono::Timelike::hour(&b.start_time), b.minutes()))
            .collect();
        assert_eq!(work, vec![(9, 180), (14, 180)]);
    }

    #[test]
    fn short_task_repeats_in_every_free_segment() {
        let dist = WeeklyDistributor::default();
        let windows = vec![UnavailableWindow::new(start(), 12, 14, "Lunch")];
        let week = dist.generate_weekly_schedule(
            &[due_in("quiz", -1, 1.0)],
            start(),
            WorkHours::default(),
            Technique::Pomodoro,
            &windows,
        );

        let blocks = week.day(start()).unwrap();
        validate_day(blocks).unwrap();
        let spans: Vec<(BlockKind, u32, i64)> = blocks
            .iter()
            .map(|b| (b.kind, chrono::Timelike::hour(&b.start_time), b.minutes()))
            .collect();
        let cycle = |h: u32| {
            vec![
                (BlockKind::Work, h, 25),
                (BlockKind::Break, h, 5),
                (BlockKind::Work, h, 25),
                (BlockKind::Break, h, 5),
                (BlockKind::Work, h + 1, 10),
            ]
        };
        let mut expected = cycle(9);
        expected.push((BlockKind::Unavailable, 12, 120));
        expected.extend(cycle(14));
        assert_eq!(spans, expected);
    }

    #[test]
    fn invalid_and_outside_windows_are_ignored() {
        let dist = WeeklyDistributor::default();
        let windows = vec![
            UnavailableWindow::new(start(), 15, 13, "backwards"),
            UnavailableWindow::new(start(), -1, 3, "negative"),
            UnavailableWindow::new(start(), 18, 20, "evening"),
        ];
        let week = dist.generate_weekly_schedule(
            &[due_in("a", 1, 2.0)],
            start(),
            WorkHours::default(),
            Technique::None,
            &windows,
        );
        let blocks = week.day(start()).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].minutes(), 120);
    }

    #[test]
    fn overlapping_windows_merge() {
        let windows = [
            UnavailableWindow::new(start(), 10, 12, "class"),
            UnavailableWindow::new(start(), 11, 13, "lab"),
            UnavailableWindow::new(start(), 13, 14, "gym"),
        ];
        let spans = busy_spans(windows.iter(), WorkHours::default());
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].end), (10, 13));
        assert_eq!(spans[0].reason, "class; lab");

        let segments = available_segments(WorkHours::default(), &spans);
        let bounds: Vec<(u32, u32)> = segments.iter().map(|s| (s.start(), s.end())).collect();
        assert_eq!(bounds, vec![(9, 10), (14, 17)]);
    }

    #[test]
    fn far_tasks_are_load_balanced() {
        let dist = WeeklyDistributor::default();
        let efforts = [3.0, 1.0, 2.0, 4.0, 1.5, 2.5, 0.5, 3.5, 1.0, 2.0];
        let tasks: Vec<Task> = efforts
            .iter()
            .enumerate()
            .map(|(i, e)| due_in(&format!("t{i}"), 10 + i as i64, *e))
            .collect();
        let assign = dist.assign_days(&tasks, start());

        let loads: Vec<f64> = assign
            .iter()
            .map(|d| d.iter().map(|t| t.estimated_effort).sum())
            .collect();
        let max = loads.iter().cloned().fold(f64::MIN, f64::max);
        let min = loads.iter().cloned().fold(f64::MAX, f64::min);
        let biggest = efforts.iter().cloned().fold(f64::MIN, f64::max);
        assert!(max - min <= biggest, "loads {loads:?}");
        assert_eq!(assign.iter().map(Vec::len).sum::<usize>(), 10);
    }
}
