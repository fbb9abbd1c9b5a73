//! Daily aggregation
//!
//! Collapses the values logged on one calendar day into a single number and
//! groups entry lists by day.

use std::collections::BTreeMap;

use crate::day::CalendarDay;
use crate::error::TrackerError;
use crate::types::{Aggregation, DailyAggregate, Entry};

/// Reduce values to one number. Non-numeric values (NaN, missing) are dropped
/// first; nothing left gives `0`. Values are summed in the order given.
pub fn aggregate<I>(values: I, method: Aggregation) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values.into_iter().flatten().filter(|v| !v.is_nan()) {
        sum += value;
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }

    match method {
        Aggregation::Sum => sum,
        Aggregation::Average => sum / count as f64,
    }
}

/// Entries bucketed by calendar day, days ascending, entries in input order
pub fn group_by_day(entries: &[Entry]) -> Result<BTreeMap<CalendarDay, Vec<&Entry>>, TrackerError> {
    let mut groups: BTreeMap<CalendarDay, Vec<&Entry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.date.to_day()?).or_default().push(entry);
    }
    Ok(groups)
}

/// One aggregate per day that has entries, ascending by day
pub fn daily_aggregates(
    entries: &[Entry],
    method: Aggregation,
) -> Result<Vec<DailyAggregate>, TrackerError> {
    Ok(group_by_day(entries)?
        .into_iter()
        .map(|(day, day_entries)| DailyAggregate {
            day,
            value: aggregate(day_entries.iter().map(|e| e.numeric_value()), method),
        })
        .collect())
}
