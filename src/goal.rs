//! Goal evaluation
//!
//! Classifies a value against the tracker's goal direction:
//! - target: within `tolerance` of `targetValue`
//! - increase / decrease: compared to the previous value
//! - none: nothing to judge

use crate::types::{GoalDirection, GoalStatus, TrackerConfig};

pub const LABEL_TARGET_HIT: &str = "Target Hit";
pub const LABEL_IMPROVED: &str = "Improved";
pub const LABEL_DECREASED: &str = "Decreased";
pub const LABEL_INCREASED: &str = "Increased";
pub const LABEL_NO_PREVIOUS: &str = "No prev data";

/// Evaluate `value` against the goal in `config`
pub fn evaluate_goal(
    value: Option<f64>,
    config: &TrackerConfig,
    previous: Option<f64>,
) -> GoalStatus {
    let Some(value) = value else {
        return GoalStatus::indeterminate("");
    };

    match (config.goal_direction, config.target_value, previous) {
        (GoalDirection::Target, Some(target), _) => {
            let diff = (value - target).abs();
            let is_hit = diff <= config.tolerance;
            let label = if is_hit {
                LABEL_TARGET_HIT.to_string()
            } else {
                format!("{diff:.1} off")
            };
            GoalStatus { is_hit: Some(is_hit), diff, label }
        }
        (GoalDirection::Increase, _, Some(prev)) => {
            let is_hit = value >= prev;
            GoalStatus {
                is_hit: Some(is_hit),
                diff: value - prev,
                label: if is_hit { LABEL_IMPROVED } else { LABEL_DECREASED }.to_string(),
            }
        }
        (GoalDirection::Decrease, _, Some(prev)) => {
            let is_hit = value <= prev;
            GoalStatus {
                is_hit: Some(is_hit),
                diff: prev - value,
                label: if is_hit { LABEL_IMPROVED } else { LABEL_INCREASED }.to_string(),
            }
        }
        (GoalDirection::Increase | GoalDirection::Decrease, _, None) => {
            GoalStatus::indeterminate(LABEL_NO_PREVIOUS)
        }
        _ => GoalStatus::indeterminate(""),
    }
}

/// Whether a calendar day counts as progress.
///
/// A hit is good. A target miss that still landed closer to the target than
/// the previous day is also good. Any other miss is bad, and `None` means
/// the day could not be judged.
pub fn day_progress(
    value: Option<f64>,
    config: &TrackerConfig,
    previous: Option<f64>,
) -> Option<bool> {
    let status = evaluate_goal(value, config, previous);
    match status.is_hit {
        Some(true) => Some(true),
        Some(false) => match (config.goal_direction, previous) {
            (GoalDirection::Target, Some(prev)) => {
                let prev_status = evaluate_goal(Some(prev), config, None);
                Some(status.diff < prev_status.diff)
            }
            _ => Some(false),
        },
        None => None,
    }
}
