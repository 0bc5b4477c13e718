//! planwise-core: task prioritization, procrastination risk and schedule synthesis

pub mod error;
pub mod time;
pub mod task;
pub mod config;
pub mod priority;
pub mod risk;
pub mod ranker;
pub mod technique;
pub mod block;
pub mod layout;
pub mod weekly;
pub mod preferences;
pub mod kernel;
pub mod memory;

pub use error::PlanError;
pub use task::{Deadline, Task, TaskRecord, TaskStatus, TaskUpdate, DEFAULT_EFFORT_HOURS};
pub use config::{PlannerConfig, PriorityConfig, RiskConfig};
pub use priority::{PriorityBreakdown, PriorityLabel, PriorityModel};
pub use risk::{RiskAssessment, RiskLevel, RiskModel};
pub use ranker::{sort_by_priority, TaskRanker};
pub use technique::{Cadence, Technique};
pub use block::{unplaced_tasks, validate_day, BlockKind, TimeBlock};
pub use layout::{DailyLayoutEngine, WorkHours};
pub use weekly::{UnavailableWindow, WeeklyDistributor, WeeklySchedule, HORIZON_DAYS};
pub use preferences::RulePreferenceParser;
pub use kernel::{
    DayRequest, PlanningKernel, PreferenceParser, ScheduleStore, TaskStore, WeekRequest,
};
pub use memory::{InMemoryScheduleStore, InMemoryTaskStore};
