//! Line-chart series
//!
//! The main series is the dense timeline. Two optional overlays ride on the
//! same labels: a constant target line, and a sparse trend line that joins
//! the last recorded value to the target on the projected day.

use serde::{Deserialize, Serialize};

use crate::day::CalendarDay;
use crate::error::TrackerError;
use crate::timeline::build_timeline;
use crate::types::{Entry, GoalDirection, TrackerConfig, TrendProjection};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub labels: Vec<CalendarDay>,
    pub values: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_line: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_line: Option<Vec<Option<f64>>>,
}

pub fn chart_series(
    entries: &[Entry],
    config: &TrackerConfig,
    trend: Option<&TrendProjection>,
) -> Result<ChartSeries, TrackerError> {
    let timeline = build_timeline(entries, config, trend)?;

    let labels: Vec<CalendarDay> = timeline.iter().map(|p| p.day).collect();
    let values: Vec<Option<f64>> = timeline.iter().map(|p| p.value).collect();

    let target_line = match (config.goal_direction, config.target_value) {
        (GoalDirection::Target, Some(target)) if !labels.is_empty() => {
            Some(vec![target; labels.len()])
        }
        _ => None,
    };

    let trend_line = trend.and_then(|projection| {
        let last_recorded = timeline.iter().rposition(|p| p.recorded)?;
        let end = timeline.len().checked_sub(1)?;
        if last_recorded >= end {
            return None;
        }
        let mut line = vec![None; timeline.len()];
        line[last_recorded] = values[last_recorded];
        line[end] = Some(projection.value);
        Some(line)
    });

    Ok(ChartSeries {
        label: config.name.clone(),
        labels,
        values,
        target_line,
        trend_line,
    })
}
