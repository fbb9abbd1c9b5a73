//! Trend forecasting
//!
//! Fits an ordinary least-squares line through a tracker's history and solves
//! it for the day the target value is reached.
//!
//! A forecast that cannot be made (too few points, every entry on one day, a
//! flat or unfavourable slope, a projected date already behind us) is
//! `Ok(None)`. That is an expected outcome, not a fault.

use chrono::{Duration, Local, NaiveDateTime};
use tracing::debug;

use crate::day::CalendarDay;
use crate::error::TrackerError;
use crate::types::{Entry, GoalDirection, TrackerConfig, TrendProjection};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Projections further out than this are past chrono's date range anyway
const MAX_PROJECTION_MS: f64 = 9.0e15;

/// `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    /// The `x` at which the line reaches `y`; `None` for a flat line
    pub fn solve_for(&self, y: f64) -> Option<f64> {
        if self.slope == 0.0 {
            return None;
        }
        let x = (y - self.intercept) / self.slope;
        x.is_finite().then_some(x)
    }
}

/// Least-squares fit. `None` when every `x` is identical.
pub fn fit_line(points: &[(f64, f64)]) -> Option<LineFit> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for &(x, y) in points {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some(LineFit { slope, intercept })
}

/// Forecast against the local clock
pub fn project_trend(
    entries: &[Entry],
    config: &TrackerConfig,
) -> Result<Option<TrendProjection>, TrackerError> {
    project_trend_at(entries, config, Local::now().naive_local())
}

/// Forecast as seen from the local wall-clock time `now`
pub fn project_trend_at(
    entries: &[Entry],
    config: &TrackerConfig,
    now: NaiveDateTime,
) -> Result<Option<TrendProjection>, TrackerError> {
    let Some(target) = config.target_value else {
        return Ok(None);
    };
    if config.goal_direction == GoalDirection::None {
        return Ok(None);
    }

    let mut history = Vec::with_capacity(entries.len());
    for entry in entries {
        let day = entry.date.to_day()?;
        if let Some(value) = entry.numeric_value() {
            history.push((day, value));
        }
    }
    if history.len() < 2 {
        return Ok(None);
    }

    // Stable, so same-day entries keep their input order for the running total
    history.sort_by_key(|(day, _)| *day);
    let start = history[0].0;

    let points = sample_points(&history, start, config.is_cumulative());

    let Some(fit) = fit_line(&points) else {
        debug!(entries = history.len(), "all entries share one day, no trend");
        return Ok(None);
    };

    let favourable = match config.goal_direction {
        GoalDirection::Increase => fit.slope > 0.0,
        GoalDirection::Decrease => fit.slope < 0.0,
        _ => fit.slope != 0.0,
    };
    if !favourable {
        debug!(slope = fit.slope, direction = ?config.goal_direction, "trend does not head toward target");
        return Ok(None);
    }

    let Some(days_to_target) = fit.solve_for(target) else {
        return Ok(None);
    };

    let offset_ms = days_to_target * MS_PER_DAY;
    if offset_ms.abs() >= MAX_PROJECTION_MS {
        debug!(days_to_target, "projection out of range");
        return Ok(None);
    }
    let Some(projected) = start
        .start_of_day()
        .checked_add_signed(Duration::milliseconds(offset_ms.round() as i64))
    else {
        return Ok(None);
    };

    let days_left = ((projected - now).num_milliseconds() as f64 / MS_PER_DAY).ceil() as i64;
    if days_left < 0 {
        debug!(%projected, days_left, "projected date already passed");
        return Ok(None);
    }

    Ok(Some(TrendProjection {
        date: CalendarDay::new(projected.date()),
        days_left,
        value: target,
    }))
}

/// `(days since start, y)` pairs; `y` is the running total in cumulative mode
fn sample_points(history: &[(CalendarDay, f64)], start: CalendarDay, cumulative: bool) -> Vec<(f64, f64)> {
    let mut running_total = 0.0;
    history
        .iter()
        .map(|&(day, value)| {
            let x = start.days_until(day) as f64;
            if cumulative {
                running_total += value;
                (x, running_total)
            } else {
                (x, value)
            }
        })
        .collect()
}
