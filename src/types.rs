//! Core types for Habitline
//!
//! Entries and tracker configuration come in from the host application;
//! the remaining types are derived results handed back to it. Field names
//! serialize in camelCase to match the tracker documents the client stores.

use serde::{Deserialize, Serialize};

use crate::day::{CalendarDay, DayInput};
use crate::error::TrackerError;

/// What a tracker measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackerType {
    #[default]
    Numeric,
    Boolean,
    Percentage,
    Rating,
}

/// Which way counts as progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalDirection {
    Increase,
    Decrease,
    Target,
    #[default]
    None,
}

/// Whether the goal resets each day or accumulates over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalPeriod {
    #[default]
    Daily,
    LongTerm,
}

/// How several entries on one day collapse to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Aggregation {
    #[default]
    Average,
    Sum,
}

/// Value shown next to a tracker in the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListDisplay {
    #[default]
    None,
    Last,
    Average,
}

/// Tracker configuration, supplied whole by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerConfig {
    /// Display name (used as the chart series label)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: TrackerType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub goal_direction: GoalDirection,
    pub target_value: Option<f64>,
    /// Allowed distance from the target that still counts as a hit
    pub tolerance: f64,
    pub goal_period: GoalPeriod,
    pub aggregation: Aggregation,
    pub enable_streak: bool,
    pub show_trend_forecast: bool,
    pub list_display_value: ListDisplay,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            name: None,
            kind: TrackerType::Numeric,
            unit: None,
            goal_direction: GoalDirection::None,
            target_value: None,
            tolerance: 0.0,
            goal_period: GoalPeriod::Daily,
            aggregation: Aggregation::Average,
            enable_streak: false,
            show_trend_forecast: false,
            list_display_value: ListDisplay::None,
        }
    }
}

impl TrackerConfig {
    /// Long-term sums ("save $5000") track a running total rather than
    /// per-day values.
    pub fn is_cumulative(&self) -> bool {
        self.aggregation == Aggregation::Sum && self.goal_period != GoalPeriod::Daily
    }

    /// Per-day collapse used by the calendar: sum only for daily sum goals,
    /// otherwise the mean of the day.
    pub fn calendar_aggregation(&self) -> Aggregation {
        if self.aggregation == Aggregation::Sum && self.goal_period == GoalPeriod::Daily {
            Aggregation::Sum
        } else {
            Aggregation::Average
        }
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        if let Some(target) = self.target_value {
            if !target.is_finite() {
                return Err(TrackerError::InvalidConfig(format!(
                    "targetValue must be finite, got {target}"
                )));
            }
        }
        Ok(())
    }
}

/// A logged value: number, yes/no, or free text from older imports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl EntryValue {
    /// Numeric reading of the value; `None` when it is not a number
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            EntryValue::Number(n) => *n,
            EntryValue::Flag(true) => 1.0,
            EntryValue::Flag(false) => 0.0,
            EntryValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (!n.is_nan()).then_some(n)
    }
}

impl From<f64> for EntryValue {
    fn from(n: f64) -> Self {
        EntryValue::Number(n)
    }
}

impl From<bool> for EntryValue {
    fn from(flag: bool) -> Self {
        EntryValue::Flag(flag)
    }
}

/// One logged entry. A day may hold any number of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub date: DayInput,
    #[serde(default)]
    pub value: Option<EntryValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Entry {
    pub fn new(date: impl Into<DayInput>, value: impl Into<EntryValue>) -> Self {
        Self {
            date: date.into(),
            value: Some(value.into()),
            note: None,
        }
    }

    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_ref().and_then(EntryValue::as_number)
    }
}

/// One day's collapsed value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub day: CalendarDay,
    pub value: f64,
}

/// Result of checking a value against the goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalStatus {
    /// `None` when there is nothing to judge
    pub is_hit: Option<bool>,
    pub diff: f64,
    pub label: String,
}

impl GoalStatus {
    pub fn indeterminate(label: impl Into<String>) -> Self {
        Self {
            is_hit: None,
            diff: 0.0,
            label: label.into(),
        }
    }
}

/// Current streak and the most recent active day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakData {
    pub streak: u32,
    pub last_date: Option<CalendarDay>,
}

/// Projected day the target is reached
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendProjection {
    pub date: CalendarDay,
    pub days_left: i64,
    pub value: f64,
}

/// One day of a dense timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub day: CalendarDay,
    /// `None` marks a gap for the renderer to skip
    pub value: Option<f64>,
    /// Whether any entry fell on this day
    pub recorded: bool,
}

impl TimelinePoint {
    pub fn is_gap(&self) -> bool {
        !self.recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_sparse_json() {
        let config: TrackerConfig = serde_json::from_str(r#"{"goalDirection":"target","targetValue":2000}"#).unwrap();
        assert_eq!(config.kind, TrackerType::Numeric);
        assert_eq!(config.goal_direction, GoalDirection::Target);
        assert_eq!(config.target_value, Some(2000.0));
        assert_eq!(config.tolerance, 0.0);
        assert_eq!(config.goal_period, GoalPeriod::Daily);
        assert_eq!(config.aggregation, Aggregation::Average);
        assert!(!config.enable_streak);
    }

    #[test]
    fn test_config_reads_client_field_names() {
        let config: TrackerConfig = serde_json::from_str(
            r#"{
                "name": "Savings",
                "type": "numeric",
                "unit": "$",
                "goalDirection": "increase",
                "targetValue": 5000,
                "goalPeriod": "longTerm",
                "aggregation": "sum",
                "enableStreak": true,
                "showTrendForecast": true,
                "listDisplayValue": "last"
            }"#,
        )
        .unwrap();
        assert!(config.is_cumulative());
        assert_eq!(config.calendar_aggregation(), Aggregation::Average);
        assert_eq!(config.list_display_value, ListDisplay::Last);
    }

    #[test]
    fn test_calendar_aggregation_sums_daily_goals_only() {
        let config = TrackerConfig {
            aggregation: Aggregation::Sum,
            ..Default::default()
        };
        assert!(!config.is_cumulative());
        assert_eq!(config.calendar_aggregation(), Aggregation::Sum);
    }

    #[test]
    fn test_validate_rejects_bad_tolerance() {
        let config = TrackerConfig {
            tolerance: -1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TrackerError::InvalidConfig(_))));

        let config = TrackerConfig {
            target_value: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(TrackerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_entry_value_numeric_reading() {
        assert_eq!(EntryValue::Number(2.5).as_number(), Some(2.5));
        assert_eq!(EntryValue::Number(f64::NAN).as_number(), None);
        assert_eq!(EntryValue::Flag(true).as_number(), Some(1.0));
        assert_eq!(EntryValue::Flag(false).as_number(), Some(0.0));
        assert_eq!(EntryValue::Text(" 12 ".into()).as_number(), Some(12.0));
        assert_eq!(EntryValue::Text("lots".into()).as_number(), None);
    }

    #[test]
    fn test_entry_json_shapes() {
        let entries: Vec<Entry> = serde_json::from_str(
            r#"[
                {"date": "2024-01-05", "value": 3},
                {"date": 1704456000000, "value": true, "note": "gym"},
                {"date": "2024-01-06", "value": null}
            ]"#,
        )
        .unwrap();
        assert_eq!(entries[0].numeric_value(), Some(3.0));
        assert_eq!(entries[1].numeric_value(), Some(1.0));
        assert_eq!(entries[1].note.as_deref(), Some("gym"));
        assert_eq!(entries[2].numeric_value(), None);
    }
}
