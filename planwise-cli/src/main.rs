use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod calendar;
mod commands;
mod config;
mod state;
mod store;

use commands::HoursOverride;

#[derive(Parser, Debug)]
#[command(
    name = "planwise",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PLANWISE_BUILD_SHA"), ")"),
    about = "Rank coursework and lay it out into days"
)]
struct Cli {
    /// Debug logging (otherwise RUST_LOG is honoured)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write ~/.planwise/config.toml and an empty tasks.json
    Init,

    /// Rank pending tasks by priority score
    Prioritize {
        /// Store the fresh scores back into tasks.json
        #[arg(long)]
        write: bool,
    },

    /// Procrastination risk for one task
    Risk {
        task_id: String,
    },

    /// Build time-blocked schedules
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ScheduleCommand {
    /// Lay out a single day
    Day {
        /// YYYY-MM-DD (default: today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[command(flatten)]
        hours: HoursArgs,

        /// Also export the blocks as an .ics file
        #[arg(long)]
        ics: Option<PathBuf>,
    },

    /// Spread tasks over the next seven days
    Week {
        /// First day of the horizon (default: today, UTC)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        #[command(flatten)]
        hours: HoursArgs,

        /// Busy time, e.g. "friday 13-15 lab" (repeatable)
        #[arg(long)]
        unavailable: Vec<String>,

        /// Also export the week as an .ics file
        #[arg(long)]
        ics: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct HoursArgs {
    /// Work start hour, UTC (default from config)
    #[arg(long)]
    start: Option<u32>,

    /// Work end hour, UTC (default from config)
    #[arg(long)]
    end: Option<u32>,

    /// pomodoro | timeblocking | 52-17 | none
    #[arg(long)]
    technique: Option<String>,
}

impl From<HoursArgs> for HoursOverride {
    fn from(args: HoursArgs) -> Self {
        Self {
            start: args.start,
            end: args.end,
            technique: args.technique,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Command::Init => commands::init()?,
        Command::Prioritize { write } => commands::prioritize(write)?,
        Command::Risk { task_id } => commands::risk(&task_id)?,
        Command::Schedule { command } => match command {
            ScheduleCommand::Day { date, hours, ics } => {
                commands::schedule_day(date, &hours.into(), ics)?;
            }
            ScheduleCommand::Week {
                start_date,
                hours,
                unavailable,
                ics,
            } => {
                commands::schedule_week(start_date, &hours.into(), &unavailable, ics)?;
            }
        },
    }

    Ok(())
}
