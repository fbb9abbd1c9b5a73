//! Dense day-by-day timelines
//!
//! Expands sparse entries into one point per calendar day for chart and
//! calendar rendering. Days without entries are gaps, except in cumulative
//! mode where the running total carries forward through them.

use tracing::trace;

use crate::aggregate::{aggregate, group_by_day};
use crate::error::TrackerError;
use crate::types::{DailyAggregate, Entry, TimelinePoint, TrackerConfig, TrendProjection};

/// One point per day from the first entry through the later of the last
/// entry and the projected trend date, inclusive.
pub fn build_timeline(
    entries: &[Entry],
    config: &TrackerConfig,
    trend: Option<&TrendProjection>,
) -> Result<Vec<TimelinePoint>, TrackerError> {
    let groups = group_by_day(entries)?;

    let (Some((&first, _)), Some((&last, _))) = (groups.first_key_value(), groups.last_key_value())
    else {
        return Ok(Vec::new());
    };

    let end = match trend {
        Some(projection) if projection.date > last => projection.date,
        _ => last,
    };

    let mut timeline: Vec<TimelinePoint> = first
        .through(end)
        .map(|day| match groups.get(&day) {
            Some(day_entries) => TimelinePoint {
                day,
                value: Some(aggregate(
                    day_entries.iter().map(|e| e.numeric_value()),
                    config.aggregation,
                )),
                recorded: true,
            },
            None => TimelinePoint {
                day,
                value: None,
                recorded: false,
            },
        })
        .collect();

    if config.is_cumulative() {
        let mut running_total = 0.0;
        for point in &mut timeline {
            running_total += point.value.unwrap_or(0.0);
            point.value = Some(running_total);
        }
    }

    trace!(days = timeline.len(), recorded = groups.len(), %first, %end, "timeline built");
    Ok(timeline)
}

/// The recorded days of a timeline, in order
pub fn sparse(timeline: &[TimelinePoint]) -> Vec<DailyAggregate> {
    timeline
        .iter()
        .filter(|point| point.recorded)
        .filter_map(|point| {
            point.value.map(|value| DailyAggregate {
                day: point.day,
                value,
            })
        })
        .collect()
}
