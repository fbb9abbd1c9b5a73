//! Habit CLI - Command-line interface for Habitline
//!
//! Commands:
//! - analyze: Full tracker report (summary, timeline, chart, calendar)
//! - streak: Current streak
//! - forecast: Trend projection toward the target
//! - timeline: Dense day-by-day series
//! - calendar: One month of judged days
//! - normalize: Turn dates into `YYYY-MM-DD` keys
//! - validate: Check a tracker file without analyzing it

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Datelike, Duration, Local, NaiveDateTime};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use habitline::calendar::{calendar_month, parse_month};
use habitline::day::{normalize_day, CalendarDay};
use habitline::pipeline::{TrackerAnalyzer, TrackerInput};
use habitline::streak::compute_streak_at;
use habitline::timeline::build_timeline;
use habitline::trend::project_trend_at;
use habitline::{TrackerError, HABITLINE_VERSION};

/// Habit - streaks, goals and forecasts for personal trackers
#[derive(Parser)]
#[command(name = "habit")]
#[command(version = HABITLINE_VERSION)]
#[command(about = "Analyze habit tracker entries", long_about = None)]
struct Cli {
    /// Pin "today" instead of reading the clock (YYYY-MM-DD, taken at noon)
    #[arg(long, global = true)]
    today: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full tracker report
    Analyze {
        /// Tracker input file (use - for stdin)
        input: PathBuf,

        /// Month to lay out as a calendar (YYYY-MM), overrides the input
        #[arg(long)]
        month: Option<String>,
    },

    /// Current streak of consecutive days
    Streak {
        /// Tracker input file (use - for stdin)
        input: PathBuf,
    },

    /// Projected date the target is reached
    Forecast {
        /// Tracker input file (use - for stdin)
        input: PathBuf,
    },

    /// One point per day from the first entry
    Timeline {
        /// Tracker input file (use - for stdin)
        input: PathBuf,

        /// Extend the timeline to the forecast date
        #[arg(long)]
        with_trend: bool,
    },

    /// One month of calendar cells
    Calendar {
        /// Tracker input file (use - for stdin)
        input: PathBuf,

        /// Month to lay out (YYYY-MM); defaults to the input's month, then the current one
        #[arg(long)]
        month: Option<String>,
    },

    /// Normalize dates to YYYY-MM-DD keys
    Normalize {
        /// Dates, timestamps (epoch ms) or date-times
        #[arg(required = true)]
        dates: Vec<String>,
    },

    /// Validate a tracker input file
    Validate {
        /// Tracker input file (use - for stdin)
        input: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), HabitCliError> {
    let now = resolve_now(cli.today.as_deref())?;
    let format = cli.format;

    match cli.command {
        Commands::Analyze { input, month } => cmd_analyze(&input, month, now, &format),
        Commands::Streak { input } => cmd_streak(&input, now, &format),
        Commands::Forecast { input } => cmd_forecast(&input, now, &format),
        Commands::Timeline { input, with_trend } => cmd_timeline(&input, with_trend, now, &format),
        Commands::Calendar { input, month } => cmd_calendar(&input, month, now, &format),
        Commands::Normalize { dates } => cmd_normalize(&dates, &format),
        Commands::Validate { input } => cmd_validate(&input, &format),
    }
}

fn resolve_now(today: Option<&str>) -> Result<NaiveDateTime, HabitCliError> {
    match today {
        Some(raw) => {
            let day: CalendarDay = raw.parse()?;
            Ok(day.start_of_day() + Duration::hours(12))
        }
        None => Ok(Local::now().naive_local()),
    }
}

fn cmd_analyze(
    input: &Path,
    month: Option<String>,
    now: NaiveDateTime,
    format: &OutputFormat,
) -> Result<(), HabitCliError> {
    let mut tracker = read_tracker(input)?;
    if month.is_some() {
        tracker.month = month;
    }

    let report = TrackerAnalyzer::at(now).analyze(&tracker)?;
    print_output(&report, format)
}

fn cmd_streak(input: &Path, now: NaiveDateTime, format: &OutputFormat) -> Result<(), HabitCliError> {
    let tracker = read_tracker(input)?;
    tracker.config.validate()?;

    let dates = tracker.entries.iter().map(|entry| entry.date.clone());
    let streak = compute_streak_at(dates, tracker.config.enable_streak, CalendarDay::new(now.date()))?;
    print_output(&streak, format)
}

fn cmd_forecast(input: &Path, now: NaiveDateTime, format: &OutputFormat) -> Result<(), HabitCliError> {
    let tracker = read_tracker(input)?;
    tracker.config.validate()?;

    // Asking for a forecast explicitly overrides the display toggle
    let trend = project_trend_at(&tracker.entries, &tracker.config, now)?;
    if trend.is_none() {
        info!("no forecast: too few entries, wrong direction or target already passed");
    }
    print_output(&trend, format)
}

fn cmd_timeline(
    input: &Path,
    with_trend: bool,
    now: NaiveDateTime,
    format: &OutputFormat,
) -> Result<(), HabitCliError> {
    let tracker = read_tracker(input)?;
    tracker.config.validate()?;

    let trend = if with_trend {
        project_trend_at(&tracker.entries, &tracker.config, now)?
    } else {
        None
    };
    let timeline = build_timeline(&tracker.entries, &tracker.config, trend.as_ref())?;
    print_output(&timeline, format)
}

fn cmd_calendar(
    input: &Path,
    month: Option<String>,
    now: NaiveDateTime,
    format: &OutputFormat,
) -> Result<(), HabitCliError> {
    let tracker = read_tracker(input)?;
    tracker.config.validate()?;

    let today = CalendarDay::new(now.date());
    let (year, month) = match month.or(tracker.month) {
        Some(raw) => parse_month(&raw)?,
        None => (today.date().year(), today.date().month()),
    };

    let trend = if tracker.config.show_trend_forecast {
        project_trend_at(&tracker.entries, &tracker.config, now)?
    } else {
        None
    };
    let calendar = calendar_month(&tracker.entries, &tracker.config, trend.as_ref(), year, month, today)?;
    print_output(&calendar, format)
}

fn cmd_normalize(dates: &[String], format: &OutputFormat) -> Result<(), HabitCliError> {
    let keys = dates
        .iter()
        .map(|raw| match raw.parse::<i64>() {
            Ok(millis) => normalize_day(millis),
            Err(_) => normalize_day(raw.as_str()),
        })
        .collect::<Result<Vec<CalendarDay>, TrackerError>>()?;
    print_output(&keys, format)
}

fn cmd_validate(input: &Path, format: &OutputFormat) -> Result<(), HabitCliError> {
    let tracker = read_tracker(input)?;

    let mut errors: Vec<ValidationErrorDetail> = Vec::new();
    if let Err(e) = tracker.config.validate() {
        errors.push(ValidationErrorDetail {
            index: None,
            error: e.to_string(),
        });
    }
    for (index, entry) in tracker.entries.iter().enumerate() {
        if let Err(e) = entry.date.to_day() {
            errors.push(ValidationErrorDetail {
                index: Some(index),
                error: e.to_string(),
            });
        }
    }
    if let Some(raw) = tracker.month.as_deref() {
        if let Err(e) = parse_month(raw) {
            errors.push(ValidationErrorDetail {
                index: None,
                error: e.to_string(),
            });
        }
    }

    let numeric_entries = tracker
        .entries
        .iter()
        .filter(|entry| entry.numeric_value().is_some())
        .count();
    let report = ValidationReport {
        total_entries: tracker.entries.len(),
        numeric_entries,
        invalid_entries: errors.iter().filter(|e| e.index.is_some()).count(),
        errors,
    };
    print_output(&report, format)?;

    if report.errors.is_empty() {
        Ok(())
    } else {
        Err(HabitCliError::ValidationFailed(report.errors.len()))
    }
}

// Helper functions

fn read_tracker(input: &Path) -> Result<TrackerInput, HabitCliError> {
    let data = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(HabitCliError::NoInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    if data.trim().is_empty() {
        return Err(HabitCliError::NoInput);
    }

    let tracker: TrackerInput = serde_json::from_str(&data)?;
    debug!(entries = tracker.entries.len(), "tracker input loaded");
    Ok(tracker)
}

fn print_output<T: Serialize>(value: &T, format: &OutputFormat) -> Result<(), HabitCliError> {
    let out = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    };
    println!("{}", out);
    Ok(())
}

// Error types

#[derive(Debug)]
enum HabitCliError {
    Io(io::Error),
    Tracker(TrackerError),
    Json(serde_json::Error),
    NoInput,
    ValidationFailed(usize),
}

impl From<io::Error> for HabitCliError {
    fn from(e: io::Error) -> Self {
        HabitCliError::Io(e)
    }
}

impl From<TrackerError> for HabitCliError {
    fn from(e: TrackerError) -> Self {
        HabitCliError::Tracker(e)
    }
}

impl From<serde_json::Error> for HabitCliError {
    fn from(e: serde_json::Error) -> Self {
        HabitCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HabitCliError> for CliError {
    fn from(e: HabitCliError) -> Self {
        match e {
            HabitCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HabitCliError::Tracker(TrackerError::InvalidConfig(msg)) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: msg,
                hint: Some("Run 'habit validate' for details".to_string()),
            },
            HabitCliError::Tracker(e @ (TrackerError::InvalidDate(_) | TrackerError::InvalidMonth { .. })) => {
                CliError {
                    code: "INVALID_DATE".to_string(),
                    message: e.to_string(),
                    hint: Some("Use YYYY-MM-DD for days and YYYY-MM for months".to_string()),
                }
            }
            HabitCliError::Tracker(e) => CliError {
                code: "TRACKER_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            HabitCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Input must be an object with \"config\" and \"entries\"".to_string()),
            },
            HabitCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "No tracker input provided".to_string(),
                hint: Some("Pass a file path or pipe JSON into '-'".to_string()),
            },
            HabitCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} problems found", count),
                hint: Some("Fix the reported problems and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationReport {
    total_entries: usize,
    numeric_entries: usize,
    invalid_entries: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    error: String,
}
