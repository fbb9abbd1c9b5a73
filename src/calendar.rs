//! Calendar month view
//!
//! Grid geometry for a Sunday-first month layout, plus one cell per day with
//! its collapsed value and whether the day counts as progress.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::aggregate::{aggregate, group_by_day};
use crate::day::CalendarDay;
use crate::error::TrackerError;
use crate::goal::day_progress;
use crate::types::{Entry, TrackerConfig, TrendProjection};

/// Layout of a month on a Sunday-first grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    /// Empty cells before the 1st (0 = Sunday)
    pub leading_blanks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Good,
    Bad,
    /// Has data but nothing to judge it against
    Neutral,
    /// No entries
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCell {
    pub day: CalendarDay,
    pub value: Option<f64>,
    pub status: DayStatus,
    pub is_today: bool,
    pub is_projected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub grid: MonthGrid,
    pub cells: Vec<CalendarCell>,
}

pub fn month_grid(year: i32, month: u32) -> Result<MonthGrid, TrackerError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(TrackerError::InvalidMonth { year, month })?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or(TrackerError::InvalidMonth { year, month })?;

    Ok(MonthGrid {
        year,
        month,
        days_in_month: (next - first).num_days() as u32,
        leading_blanks: first.weekday().num_days_from_sunday(),
    })
}

/// Parse a `YYYY-MM` month selector
pub fn parse_month(raw: &str) -> Result<(i32, u32), TrackerError> {
    let invalid = || TrackerError::InvalidDate(raw.to_string());
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(TrackerError::InvalidMonth { year, month });
    }
    Ok((year, month))
}

/// One cell per day of `year`-`month`.
///
/// Each recorded day is judged against the previous recorded day, which may
/// fall in an earlier month.
pub fn calendar_month(
    entries: &[Entry],
    config: &TrackerConfig,
    trend: Option<&TrendProjection>,
    year: i32,
    month: u32,
    today: CalendarDay,
) -> Result<CalendarMonth, TrackerError> {
    let grid = month_grid(year, month)?;
    let method = config.calendar_aggregation();

    let mut judged: BTreeMap<CalendarDay, (f64, DayStatus)> = BTreeMap::new();
    let mut previous: Option<f64> = None;
    for (day, day_entries) in group_by_day(entries)? {
        let value = aggregate(day_entries.iter().map(|e| e.numeric_value()), method);
        let status = match day_progress(Some(value), config, previous) {
            Some(true) => DayStatus::Good,
            Some(false) => DayStatus::Bad,
            None => DayStatus::Neutral,
        };
        judged.insert(day, (value, status));
        previous = Some(value);
    }

    let projected = trend.map(|t| t.date);
    let cells = (1..=grid.days_in_month)
        .map(|d| -> Result<CalendarCell, TrackerError> {
            let day = CalendarDay::from_ymd(year, month, d)?;
            let (value, status) = match judged.get(&day) {
                Some(&(value, status)) => (Some(value), status),
                None => (None, DayStatus::Empty),
            };
            Ok(CalendarCell {
                day,
                value,
                status,
                is_today: day == today,
                is_projected: projected == Some(day),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    trace!(year, month, recorded = judged.len(), "calendar month built");
    Ok(CalendarMonth { grid, cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Aggregation, GoalDirection, GoalPeriod};
    use pretty_assertions::assert_eq;

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    #[test]
    fn test_month_grid() {
        // 2024-02-01 was a Thursday
        assert_eq!(
            month_grid(2024, 2).unwrap(),
            MonthGrid { year: 2024, month: 2, days_in_month: 29, leading_blanks: 4 }
        );
        assert_eq!(month_grid(2023, 2).unwrap().days_in_month, 28);
        assert_eq!(month_grid(2024, 12).unwrap().days_in_month, 31);
        // 2024-09-01 was a Sunday
        assert_eq!(month_grid(2024, 9).unwrap().leading_blanks, 0);
    }

    #[test]
    fn test_month_grid_rejects_bad_month() {
        assert!(matches!(month_grid(2024, 13), Err(TrackerError::InvalidMonth { .. })));
        assert!(matches!(month_grid(2024, 0), Err(TrackerError::InvalidMonth { .. })));
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-02").unwrap(), (2024, 2));
        assert!(parse_month("2024").is_err());
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("Feb 2024").is_err());
    }

    #[test]
    fn test_cells_carry_status() {
        let config = TrackerConfig {
            goal_direction: GoalDirection::Increase,
            ..Default::default()
        };
        let entries = vec![
            Entry::new("2024-01-31", 5.0),
            Entry::new("2024-02-01", 6.0),
            Entry::new("2024-02-02", 4.0),
            Entry::new("2024-02-02", 2.0),
        ];
        let trend = TrendProjection { date: day("2024-02-10"), days_left: 8, value: 10.0 };

        let month = calendar_month(&entries, &config, Some(&trend), 2024, 2, day("2024-02-02")).unwrap();
        assert_eq!(month.cells.len(), 29);

        // Judged against January 31st
        assert_eq!(month.cells[0].value, Some(6.0));
        assert_eq!(month.cells[0].status, DayStatus::Good);

        // Average of 4 and 2 is below 6
        assert_eq!(month.cells[1].value, Some(3.0));
        assert_eq!(month.cells[1].status, DayStatus::Bad);
        assert!(month.cells[1].is_today);

        assert_eq!(month.cells[2].status, DayStatus::Empty);
        assert!(month.cells[9].is_projected);
        assert_eq!(month.cells.iter().filter(|c| c.is_projected).count(), 1);
    }

    #[test]
    fn test_first_recorded_day_is_neutral_for_directional_goals() {
        let config = TrackerConfig {
            goal_direction: GoalDirection::Decrease,
            ..Default::default()
        };
        let entries = vec![Entry::new("2024-02-05", 80.0)];
        let month = calendar_month(&entries, &config, None, 2024, 2, day("2024-02-05")).unwrap();
        assert_eq!(month.cells[4].status, DayStatus::Neutral);
    }

    #[test]
    fn test_daily_sum_goal_sums_the_day() {
        let config = TrackerConfig {
            goal_direction: GoalDirection::Target,
            target_value: Some(2000.0),
            tolerance: 100.0,
            aggregation: Aggregation::Sum,
            goal_period: GoalPeriod::Daily,
            ..Default::default()
        };
        let entries = vec![
            Entry::new("2024-03-01", 500.0),
            Entry::new("2024-03-01", 1500.0),
            Entry::new("2024-03-02", 1000.0),
            Entry::new("2024-03-03", 1500.0),
        ];
        let month = calendar_month(&entries, &config, None, 2024, 3, day("2024-03-03")).unwrap();
        assert_eq!(month.cells[0].value, Some(2000.0));
        assert_eq!(month.cells[0].status, DayStatus::Good);
        // Further from target than the day before
        assert_eq!(month.cells[1].status, DayStatus::Bad);
        // Missed, but closer than yesterday
        assert_eq!(month.cells[2].status, DayStatus::Good);
    }

    #[test]
    fn test_long_term_sum_shows_day_average() {
        let config = TrackerConfig {
            aggregation: Aggregation::Sum,
            goal_period: GoalPeriod::LongTerm,
            ..Default::default()
        };
        let entries = vec![Entry::new("2024-03-01", 10.0), Entry::new("2024-03-01", 30.0)];
        let month = calendar_month(&entries, &config, None, 2024, 3, day("2024-03-01")).unwrap();
        assert_eq!(month.cells[0].value, Some(20.0));
        assert_eq!(month.cells[0].status, DayStatus::Neutral);
    }
}
