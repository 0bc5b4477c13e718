use anyhow::{Context, Result};
use chrono_tz::Tz;
use planwise_core::{PlannerConfig, Technique, WorkHours};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_planwise_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schedule: ScheduleSection,
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSection {
    /// Owner id written to tasks created elsewhere; records without one
    /// are treated as ours.
    pub user_id: String,
    /// UTC hour-of-day.
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    pub technique: Technique,
    /// IANA zone used to read naive deadline strings.
    pub timezone: String,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            user_id: "me".to_string(),
            work_start_hour: 9,
            work_end_hour: 17,
            technique: Technique::Pomodoro,
            timezone: "UTC".to_string(),
        }
    }
}

impl ScheduleSection {
    pub fn work_hours(&self) -> Result<WorkHours> {
        Ok(WorkHours::new(self.work_start_hour, self.work_end_hour)?)
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid timezone {:?}: {e}", self.timezone))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_planwise_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).context("parse config.toml")?;
    cfg.planner.validate().context("invalid [planner] section")?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
