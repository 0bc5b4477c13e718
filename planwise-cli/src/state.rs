use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// `$PLANWISE_HOME`, or `~/.planwise`.
pub fn planwise_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("PLANWISE_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".planwise"))
}

pub fn ensure_planwise_home() -> Result<PathBuf> {
    let dir = planwise_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn tasks_path() -> Result<PathBuf> {
    Ok(ensure_planwise_home()?.join("tasks.json"))
}

pub fn history_path() -> Result<PathBuf> {
    Ok(ensure_planwise_home()?.join("history.json"))
}

pub fn schedules_dir() -> Result<PathBuf> {
    let dir = ensure_planwise_home()?.join("schedules");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn schedule_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{date}.json"))
}

/// Read a JSON file, or `T::default()` when it does not exist yet.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
