//! Analysis pipeline
//!
//! This module provides the JSON-facing API for Habitline. One call takes a
//! tracker configuration and its entries and returns every derived view the
//! client renders.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{calendar_month, parse_month, CalendarMonth};
use crate::chart::{chart_series, ChartSeries};
use crate::day::CalendarDay;
use crate::error::TrackerError;
use crate::stats::{summarize_at, TrackerSummary};
use crate::timeline::build_timeline;
use crate::types::{Entry, TimelinePoint, TrackerConfig};

/// Everything needed to analyze one tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerInput {
    pub config: TrackerConfig,
    #[serde(default)]
    pub entries: Vec<Entry>,
    /// `YYYY-MM` month to lay out as a calendar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
}

/// Derived views for one tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerReport {
    /// The day the report was computed for
    pub today: CalendarDay,
    pub summary: TrackerSummary,
    pub timeline: Vec<TimelinePoint>,
    pub chart: ChartSeries,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<CalendarMonth>,
}

/// Analyze a JSON-encoded [`TrackerInput`] against the local clock and return
/// the JSON-encoded [`TrackerReport`].
///
/// # Example
/// ```ignore
/// let report = analyze_tracker_json(r#"{
///     "config": { "goalDirection": "increase", "targetValue": 100, "showTrendForecast": true },
///     "entries": [ { "date": "2024-01-01", "value": 50 }, { "date": "2024-01-11", "value": 70 } ]
/// }"#.to_string())?;
/// ```
pub fn analyze_tracker_json(input_json: String) -> Result<String, TrackerError> {
    TrackerAnalyzer::new().analyze_json(&input_json)
}

#[derive(Debug, Clone, Copy, Default)]
enum Clock {
    #[default]
    Local,
    Fixed(NaiveDateTime),
}

/// Runs the full analysis with a chosen notion of "now".
///
/// The default reads the local clock on every call; [`TrackerAnalyzer::at`]
/// pins it, which is what tests and replays want.
#[derive(Debug, Clone, Default)]
pub struct TrackerAnalyzer {
    clock: Clock,
}

impl TrackerAnalyzer {
    /// Analyzer on the local clock
    pub fn new() -> Self {
        Self { clock: Clock::Local }
    }

    /// Analyzer pinned to a local wall-clock time
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            clock: Clock::Fixed(now),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        match self.clock {
            Clock::Local => Local::now().naive_local(),
            Clock::Fixed(now) => now,
        }
    }

    pub fn analyze(&self, input: &TrackerInput) -> Result<TrackerReport, TrackerError> {
        input.config.validate()?;

        let now = self.now();
        let today = CalendarDay::new(now.date());
        debug!(entries = input.entries.len(), %today, "analyzing tracker");

        let summary = summarize_at(&input.entries, &input.config, now)?;
        let trend = summary.trend.as_ref();

        let timeline = build_timeline(&input.entries, &input.config, trend)?;
        let chart = chart_series(&input.entries, &input.config, trend)?;

        let calendar = match input.month.as_deref() {
            Some(raw) => {
                let (year, month) = parse_month(raw)?;
                Some(calendar_month(&input.entries, &input.config, trend, year, month, today)?)
            }
            None => None,
        };

        Ok(TrackerReport {
            today,
            summary,
            timeline,
            chart,
            calendar,
        })
    }

    pub fn analyze_json(&self, input_json: &str) -> Result<String, TrackerError> {
        let input: TrackerInput = serde_json::from_str(input_json)?;
        let report = self.analyze(&input)?;
        Ok(serde_json::to_string(&report)?)
    }
}
