//! Daily layout engine: turns a priority-ordered task list into a run of
//! work/break blocks inside one working-hour window.
//!
//! The cursor only ever moves forward and every block is clipped to the
//! window boundary, so output is start-ordered, non-overlapping and
//! contained by construction.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::block::TimeBlock;
use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::ranker::sort_by_priority;
use crate::task::Task;
use crate::technique::Technique;
use crate::time::at_hour;

/// Validated `[start, end)` working window in hours of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkHours {
    start: u32,
    end: u32,
}

impl WorkHours {
    pub fn new(start: u32, end: u32) -> Result<Self, PlanError> {
        if start < end && end <= 24 {
            Ok(Self { start, end })
        } else {
            Err(PlanError::InvalidWorkHours { start, end })
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        (at_hour(date, self.start), at_hour(date, self.end))
    }
}

impl Default for WorkHours {
    fn default() -> Self {
        Self { start: 9, end: 17 }
    }
}

#[derive(Debug, Clone)]
pub struct DailyLayoutEngine {
    description_limit: usize,
}

impl Default for DailyLayoutEngine {
    fn default() -> Self {
        Self::new(&PlannerConfig::default())
    }
}

impl DailyLayoutEngine {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            description_limit: config.description_limit,
        }
    }

    /// Lay out one day. Tasks without a deadline or already completed are
    /// skipped; the rest go in descending `priority_score` order (scores are
    /// used as stored). Whatever does not fit before `hours.end()` is
    /// dropped for the day.
    pub fn generate_daily_schedule(
        &self,
        tasks: &[Task],
        target_date: NaiveDate,
        hours: WorkHours,
        technique: Technique,
    ) -> Vec<TimeBlock> {
        let mut pending: Vec<&Task> = tasks.iter().filter(|t| t.is_schedulable()).collect();

        tracing::debug!(
            total = tasks.len(),
            valid = pending.len(),
            %technique,
            "laying out daily schedule"
        );
        if pending.is_empty() {
            return Vec::new();
        }

        sort_by_priority(&mut pending);
        let blocks = self.lay_out(&pending, target_date, hours, technique);
        tracing::debug!(blocks = blocks.len(), "generated time blocks");
        blocks
    }

    /// Core placement loop over tasks already in the order they should run.
    pub(crate) fn lay_out(
        &self,
        tasks: &[&Task],
        date: NaiveDate,
        hours: WorkHours,
        technique: Technique,
    ) -> Vec<TimeBlock> {
        let (mut cursor, boundary) = hours.bounds(date);
        let mut blocks = Vec::new();

        for task in tasks {
            if cursor >= boundary {
                break;
            }
            let minutes = task.effort_minutes();
            if minutes <= 0 {
                continue;
            }

            let place = |start: DateTime<Utc>, minutes: i64, blocks: &mut Vec<TimeBlock>| {
                let end = clip(start, minutes, boundary);
                blocks.push(TimeBlock::work(task, start, end, self.description_limit));
                end
            };

            match technique.cadence() {
                Some(cadence) => {
                    let sessions = minutes / cadence.work_minutes;
                    let remaining = minutes % cadence.work_minutes;

                    for _ in 0..sessions {
                        if cursor >= boundary {
                            break;
                        }
                        cursor = place(cursor, cadence.work_minutes, &mut blocks);

                        if cursor < boundary && cadence.break_minutes > 0 {
                            let end = clip(cursor, cadence.break_minutes, boundary);
                            blocks.push(TimeBlock::rest(cursor, end));
                            cursor = end;
                        }
                    }

                    if remaining > 0 && cursor < boundary {
                        cursor = place(cursor, remaining, &mut blocks);
                    }
                }
                None => {
                    cursor = place(cursor, minutes, &mut blocks);
                }
            }
        }

        blocks
    }
}

/// End of a block of `minutes` starting at `start`, never past `boundary`.
fn clip(start: DateTime<Utc>, minutes: i64, boundary: DateTime<Utc>) -> DateTime<Utc> {
    let room = (boundary - start).num_minutes().max(0);
    start + Duration::minutes(minutes.clamp(0, room))
}
