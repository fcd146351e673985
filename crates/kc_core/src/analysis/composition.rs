//! Time-bucketed cumulative unit composition.
//!
//! Bucket boundaries are every `snapshot_interval` seconds from zero
//! through the match duration, plus each resolved age click time, deduped
//! and sorted. Counts accumulate through a single forward pass over the
//! time-sorted event sequence; units are never removed once counted
//! (queued commands, not surviving units), so per-line totals are
//! monotonically non-decreasing across a player's snapshots.

use std::collections::BTreeMap;

use crate::data;
use crate::models::report::{AgeTimings, CompositionSnapshot};
use crate::time::format_seconds;

use super::config::AnalysisConfig;
use super::events::UnitEvent;

/// Bucket boundaries for one player: interval multiples in `[0, duration]`,
/// the duration itself, and every non-null age click time.
pub fn bucket_boundaries(duration: u64, ages: &AgeTimings, config: &AnalysisConfig) -> Vec<u64> {
    let interval = config.snapshot_interval.max(1);
    let mut buckets: Vec<u64> = (0..=duration).step_by(interval as usize).collect();
    if buckets.last() != Some(&duration) {
        buckets.push(duration);
    }
    for click in [
        ages.feudal.click_time,
        ages.castle.click_time,
        ages.imperial.click_time,
    ]
    .into_iter()
    .flatten()
    {
        buckets.push(click.min(duration));
    }
    buckets.sort_unstable();
    buckets.dedup();
    buckets
}

/// Build the composition snapshot sequence for one player.
///
/// `units` must already be sorted ascending by time (the classifier's
/// output invariant); the pass is O(events + buckets).
pub fn snapshot_composition(
    units: &[UnitEvent],
    duration: u64,
    ages: &AgeTimings,
    config: &AnalysisConfig,
) -> Vec<CompositionSnapshot> {
    let buckets = bucket_boundaries(duration, ages, config);
    let mut snapshots = Vec::with_capacity(buckets.len());
    let mut totals: BTreeMap<String, u32> = BTreeMap::new();
    let mut cursor = 0usize;

    for bucket in buckets {
        while cursor < units.len() && units[cursor].time <= bucket {
            *totals.entry(units[cursor].line.to_string()).or_insert(0) += 1;
            cursor += 1;
        }
        snapshots.push(snapshot_at(bucket, &totals));
    }
    snapshots
}

fn snapshot_at(time: u64, totals: &BTreeMap<String, u32>) -> CompositionSnapshot {
    let sum_where = |predicate: &dyn Fn(&str) -> bool| -> u32 {
        totals
            .iter()
            .filter(|(line, _)| predicate(line))
            .map(|(_, count)| *count)
            .sum()
    };
    let military_total = sum_where(&|line| !data::NON_MILITARY_LINES.contains(&line));
    let gold_units_total = sum_where(&|line| data::GOLD_LINES.contains(&line));
    let trash_units_total = sum_where(&|line| data::TRASH_LINES.contains(&line));
    let pct = |count: u32| {
        (military_total > 0).then(|| f64::from(count) / f64::from(military_total))
    };

    CompositionSnapshot {
        time,
        time_str: format_seconds(time),
        villagers_total_proxy: totals.get("villager").copied().unwrap_or(0),
        totals_by_line: totals.clone(),
        military_total,
        gold_units_total,
        trash_units_total,
        gold_pct: pct(gold_units_total),
        trash_pct: pct(trash_units_total),
    }
}

/// Whole-match queue totals by concrete unit name and by line.
pub fn aggregate_units(
    units: &[UnitEvent],
) -> (BTreeMap<String, u32>, BTreeMap<String, u32>) {
    let mut by_type: BTreeMap<String, u32> = BTreeMap::new();
    let mut by_line: BTreeMap<String, u32> = BTreeMap::new();
    for event in units {
        let name = event.unit.as_deref().unwrap_or(data::UNKNOWN_LINE);
        *by_type.entry(name.to_string()).or_insert(0) += 1;
        *by_line.entry(event.line.to_string()).or_insert(0) += 1;
    }
    (by_type, by_line)
}
