//! Tracker summary
//!
//! The headline numbers for one tracker: activity counts, the value the goal
//! is judged on, streak and forecast, and the value shown in the tracker list.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, group_by_day};
use crate::day::CalendarDay;
use crate::error::TrackerError;
use crate::goal::evaluate_goal;
use crate::streak::compute_streak_at;
use crate::trend::project_trend_at;
use crate::types::{
    Aggregation, Entry, GoalPeriod, GoalStatus, ListDisplay, StreakData, TrackerConfig,
    TrendProjection,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSummary {
    /// Distinct days with at least one entry
    pub active_days: usize,
    pub total_entries: usize,
    /// Latest value for long-term goals, today's aggregate for daily ones
    pub current_value: Option<f64>,
    pub goal: GoalStatus,
    pub streak: StreakData,
    pub trend: Option<TrendProjection>,
    pub list_value: Option<f64>,
}

pub fn summarize(entries: &[Entry], config: &TrackerConfig) -> Result<TrackerSummary, TrackerError> {
    summarize_at(entries, config, Local::now().naive_local())
}

pub fn summarize_at(
    entries: &[Entry],
    config: &TrackerConfig,
    now: NaiveDateTime,
) -> Result<TrackerSummary, TrackerError> {
    let today = CalendarDay::new(now.date());
    let groups = group_by_day(entries)?;

    // Latest day wins; within a day the later entry wins
    let latest_value = groups
        .values()
        .next_back()
        .and_then(|day_entries| day_entries.last())
        .and_then(|entry| entry.numeric_value());

    let current_value = if entries.is_empty() {
        None
    } else {
        match config.goal_period {
            GoalPeriod::LongTerm => latest_value,
            GoalPeriod::Daily => Some(match groups.get(&today) {
                Some(todays) => aggregate(todays.iter().map(|e| e.numeric_value()), config.aggregation),
                None => 0.0,
            }),
        }
    };

    let goal = evaluate_goal(current_value, config, None);

    let streak = compute_streak_at(groups.keys().rev().copied(), config.enable_streak, today)?;

    let trend = if config.show_trend_forecast {
        project_trend_at(entries, config, now)?
    } else {
        None
    };

    let list_value = match config.list_display_value {
        ListDisplay::None => None,
        ListDisplay::Last => latest_value,
        ListDisplay::Average => {
            let numeric: Vec<f64> = entries.iter().filter_map(Entry::numeric_value).collect();
            (!numeric.is_empty())
                .then(|| aggregate(numeric.into_iter().map(Some), Aggregation::Average))
        }
    };

    Ok(TrackerSummary {
        active_days: groups.len(),
        total_entries: entries.len(),
        current_value,
        goal,
        streak,
        trend,
        list_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GoalDirection;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn noon(s: &str) -> NaiveDateTime {
        s.parse::<CalendarDay>().unwrap().start_of_day() + Duration::hours(12)
    }

    fn water() -> TrackerConfig {
        TrackerConfig {
            name: Some("Water".to_string()),
            unit: Some("ml".to_string()),
            goal_direction: GoalDirection::Target,
            target_value: Some(2000.0),
            tolerance: 250.0,
            aggregation: Aggregation::Sum,
            enable_streak: true,
            list_display_value: ListDisplay::Average,
            ..Default::default()
        }
    }

    #[test]
    fn test_daily_goal_uses_todays_total() {
        let entries = vec![
            Entry::new("2024-05-10", 1000.0),
            Entry::new("2024-05-09", 2000.0),
            Entry::new("2024-05-10", 800.0),
            Entry::new("2024-05-08", 1500.0),
        ];
        let summary = summarize_at(&entries, &water(), noon("2024-05-10")).unwrap();

        assert_eq!(summary.active_days, 3);
        assert_eq!(summary.total_entries, 4);
        assert_eq!(summary.current_value, Some(1800.0));
        assert_eq!(summary.goal.is_hit, Some(true));
        assert_eq!(summary.goal.label, "Target Hit");
        assert_eq!(summary.streak.streak, 3);
        assert_eq!(summary.streak.last_date.unwrap().to_string(), "2024-05-10");
        assert_eq!(summary.trend, None);
        assert_eq!(summary.list_value, Some(1325.0));
    }

    #[test]
    fn test_daily_goal_resets_without_entries_today() {
        let entries = vec![Entry::new("2024-05-09", 2000.0)];
        let summary = summarize_at(&entries, &water(), noon("2024-05-10")).unwrap();
        assert_eq!(summary.current_value, Some(0.0));
        assert_eq!(summary.goal.is_hit, Some(false));
        assert_eq!(summary.goal.label, "2000.0 off");
        assert_eq!(summary.streak.streak, 1);
    }

    #[test]
    fn test_long_term_goal_uses_latest_entry() {
        let config = TrackerConfig {
            goal_direction: GoalDirection::Decrease,
            target_value: Some(70.0),
            goal_period: GoalPeriod::LongTerm,
            show_trend_forecast: true,
            list_display_value: ListDisplay::Last,
            ..Default::default()
        };
        let entries = vec![
            Entry::new("2024-03-05", 78.0),
            Entry::new("2024-03-01", 80.0),
        ];
        let summary = summarize_at(&entries, &config, noon("2024-03-05")).unwrap();

        assert_eq!(summary.current_value, Some(78.0));
        // Directional goals have no previous value on the summary card
        assert_eq!(summary.goal.label, "No prev data");
        assert_eq!(summary.list_value, Some(78.0));

        let trend = summary.trend.unwrap();
        assert_eq!(trend.date.to_string(), "2024-03-21");
        assert_eq!(trend.days_left, 16);
    }

    #[test]
    fn test_streak_disabled() {
        let config = TrackerConfig {
            enable_streak: false,
            ..water()
        };
        let entries = vec![Entry::new("2024-05-09", 1.0), Entry::new("2024-05-10", 1.0)];
        let summary = summarize_at(&entries, &config, noon("2024-05-10")).unwrap();
        assert_eq!(summary.streak.streak, 0);
        assert_eq!(summary.streak.last_date.unwrap().to_string(), "2024-05-10");
    }

    #[test]
    fn test_no_entries() {
        let summary = summarize_at(&[], &water(), noon("2024-05-10")).unwrap();
        assert_eq!(summary.current_value, None);
        assert_eq!(summary.goal, GoalStatus::indeterminate(""));
        assert_eq!(summary.streak, StreakData { streak: 0, last_date: None });
        assert_eq!(summary.list_value, None);
        assert_eq!(summary.active_days, 0);
    }
}
