//! Habitline - Numeric core of a personal habit and goal tracker
//!
//! Habitline turns a tracker's configuration and its dated entries into the
//! numbers a tracker screen shows: day keys, per-day aggregates, streaks,
//! goal status, a linear forecast toward the target, dense timelines for
//! charts and a judged calendar month.
//!
//! ## Modules
//!
//! - **Core**: `day`, `aggregate`, `streak`, `goal`, `trend`, `timeline`
//! - **Views**: `chart`, `calendar`, `stats`
//! - **Pipeline**: JSON in, full report out, also exposed over C FFI

pub mod aggregate;
pub mod calendar;
pub mod chart;
pub mod day;
pub mod error;
pub mod goal;
pub mod pipeline;
pub mod stats;
pub mod streak;
pub mod timeline;
pub mod trend;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aggregate::{aggregate, daily_aggregates, group_by_day};
pub use calendar::{calendar_month, month_grid, CalendarCell, CalendarMonth, DayStatus, MonthGrid};
pub use chart::{chart_series, ChartSeries};
pub use day::{days_between, normalize_day, CalendarDay, DayInput};
pub use error::TrackerError;
pub use goal::{day_progress, evaluate_goal};
pub use pipeline::{analyze_tracker_json, TrackerAnalyzer, TrackerInput, TrackerReport};
pub use stats::{summarize, summarize_at, TrackerSummary};
pub use streak::{compute_streak, compute_streak_at};
pub use timeline::{build_timeline, sparse};
pub use trend::{project_trend, project_trend_at};
pub use types::{
    Aggregation, DailyAggregate, Entry, EntryValue, GoalDirection, GoalPeriod, GoalStatus,
    ListDisplay, StreakData, TimelinePoint, TrackerConfig, TrackerType, TrendProjection,
};

/// Habitline library version
pub const HABITLINE_VERSION: &str = env!("CARGO_PKG_VERSION");
