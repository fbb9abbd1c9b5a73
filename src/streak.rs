//! Streak calculation
//!
//! A streak is the run of consecutive active days ending at the most recent
//! active day, and it only counts while that day is today or yesterday.

use tracing::trace;

use crate::day::{CalendarDay, DayInput};
use crate::error::TrackerError;
use crate::types::StreakData;

/// Current streak measured against the local clock
pub fn compute_streak<I>(dates: I, enabled: bool) -> Result<StreakData, TrackerError>
where
    I: IntoIterator,
    I::Item: Into<DayInput>,
{
    compute_streak_at(dates, enabled, CalendarDay::today())
}

/// Current streak as of `today`
pub fn compute_streak_at<I>(
    dates: I,
    enabled: bool,
    today: CalendarDay,
) -> Result<StreakData, TrackerError>
where
    I: IntoIterator,
    I::Item: Into<DayInput>,
{
    let mut dates = dates.into_iter();

    if !enabled {
        let last_date = dates.next().map(|d| d.into().to_day()).transpose()?;
        return Ok(StreakData { streak: 0, last_date });
    }

    let mut days = dates
        .map(|d| d.into().to_day())
        .collect::<Result<Vec<_>, _>>()?;
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let Some(&last) = days.first() else {
        return Ok(StreakData { streak: 0, last_date: None });
    };

    let gap = last.days_until(today);
    if gap > 1 {
        trace!(%last, %today, gap, "streak broken");
        return Ok(StreakData { streak: 0, last_date: Some(last) });
    }

    let run = days
        .windows(2)
        .take_while(|pair| pair[1].days_until(pair[0]) == 1)
        .count();

    Ok(StreakData {
        streak: run as u32 + 1,
        last_date: Some(last),
    })
}
