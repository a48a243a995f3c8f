// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use regex::Regex;

use crate::config::default_tasks_path;
use crate::task::TaskId;

/// Command-line arguments for `taskshift`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskshift",
    version,
    about = "Move a task's due date and push its dependents forward.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the task file (TOML).
    ///
    /// Default: `Tasks.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_tasks_path())]
    pub tasks: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKSHIFT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate the task file and list edges whose dependent starts too early.
    Check,
    /// Print every task with its dates and prerequisites.
    List,
    /// Change a task's due date and cascade the shift to its dependents.
    SetDue {
        /// Task id.
        id: TaskId,
        /// New due date: `YYYY-MM-DD`, or `+Nd` / `-Nd` relative to the
        /// current due date.
        due: DueDateArg,
        /// Save the resulting tasks back to the task file.
        #[arg(long)]
        write: bool,
    },
    /// List tasks whose title overlaps the given one.
    Similar { title: String },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Due date given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDateArg {
    Absolute(NaiveDate),
    /// Signed number of days added to the current due date.
    Relative(i64),
}

static RELATIVE_DAYS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])(\d+)d$").expect("relative day pattern is valid")
});

impl FromStr for DueDateArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(caps) = RELATIVE_DAYS.captures(s) {
            let days: i64 = caps[2]
                .parse()
                .map_err(|_| format!("day offset out of range: {s}"))?;
            let days = if &caps[1] == "-" { -days } else { days };
            return Ok(DueDateArg::Relative(days));
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(DueDateArg::Absolute)
            .map_err(|_| format!("invalid due date: {s} (expected YYYY-MM-DD, +Nd or -Nd)"))
    }
}

impl DueDateArg {
    /// Resolve against the task's current due date.
    pub fn resolve(self, current: NaiveDate) -> Option<NaiveDate> {
        match self {
            DueDateArg::Absolute(date) => Some(date),
            DueDateArg::Relative(days) if days >= 0 => {
                current.checked_add_days(Days::new(days.unsigned_abs()))
            }
            DueDateArg::Relative(days) => {
                current.checked_sub_days(Days::new(days.unsigned_abs()))
            }
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
