//! Opponent strategy-switch and counter-response detection.
//!
//! A switch is a sudden, sustained rise in opponent commitment to a unit
//! line between consecutive composition snapshots: the count must jump by
//! at least `switch_min_delta` from a prior count no higher than
//! `switch_max_prior` (new or resurgent commitment, not gradual
//! reinforcement). Each switch resolves to exactly one outcome: the first
//! qualifying counter response, or a missed-opportunity entry listing every
//! registered counter. Everything is tagged low confidence; these are
//! heuristic signals, not ground truth.

use tracing::debug;

use crate::data;
use crate::models::report::{
    CompositionSnapshot, Confidence, CounterReport, MissedCounter, ResponseRecord, SwitchEvent,
};
use crate::time::format_seconds;

use super::config::AnalysisConfig;

/// Detect opponent switches and correlate the viewer's counter responses.
///
/// `opponent_snapshots` and `viewer_snapshots` are the two players'
/// chronological snapshot sequences; this is the one pipeline stage with a
/// hard data dependency on both.
pub fn detect_switches(
    opponent_snapshots: &[CompositionSnapshot],
    viewer_snapshots: &[CompositionSnapshot],
    config: &AnalysisConfig,
) -> CounterReport {
    let switch_events = collect_switch_events(opponent_snapshots, config);
    debug!(count = switch_events.len(), "detected opponent switch events");

    let mut response_delay_vs_opponent = Vec::new();
    let mut missed_counter_opportunities = Vec::new();

    for event in &switch_events {
        let counters = data::counters_for(&event.opponent_line);
        match find_response(event, counters, viewer_snapshots, config) {
            Some(response) => response_delay_vs_opponent.push(response),
            None => missed_counter_opportunities.push(MissedCounter {
                opponent_line: event.opponent_line.clone(),
                suggested_counters: counters.to_vec(),
                confidence: Confidence::Low,
            }),
        }
    }

    CounterReport { switch_events, response_delay_vs_opponent, missed_counter_opportunities }
}

fn collect_switch_events(
    snapshots: &[CompositionSnapshot],
    config: &AnalysisConfig,
) -> Vec<SwitchEvent> {
    let mut events = Vec::new();
    for pair in snapshots.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        for (line, &count) in &current.totals_by_line {
            if data::SWITCH_EXCLUDED_LINES.contains(&line.as_str()) {
                continue;
            }
            let previous_count = previous.totals_by_line.get(line).copied().unwrap_or(0);
            let delta = count.saturating_sub(previous_count);
            if delta >= config.switch_min_delta && previous_count <= config.switch_max_prior {
                events.push(SwitchEvent {
                    time: current.time,
                    time_str: current.time_str.clone(),
                    opponent_line: line.clone(),
                    delta,
                    confidence: Confidence::Low,
                });
            }
        }
    }
    events
}

/// First qualifying counter: snapshots at or after the event in time order,
/// counter lines in table order within each snapshot.
fn find_response(
    event: &SwitchEvent,
    counters: &[String],
    viewer_snapshots: &[CompositionSnapshot],
    config: &AnalysisConfig,
) -> Option<ResponseRecord> {
    for snapshot in viewer_snapshots {
        if snapshot.time < event.time {
            continue;
        }
        for counter in counters {
            let count = snapshot.totals_by_line.get(counter).copied().unwrap_or(0);
            if count >= config.counter_min_count {
                let delay = snapshot.time - event.time;
                return Some(ResponseRecord {
                    opponent_line: event.opponent_line.clone(),
                    your_line: counter.clone(),
                    response_time: snapshot.time,
                    response_time_str: snapshot.time_str.clone(),
                    delay,
                    delay_str: format_seconds(delay),
                    confidence: Confidence::Low,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot(time: u64, counts: &[(&str, u32)]) -> CompositionSnapshot {
        let totals_by_line: BTreeMap<String, u32> =
            counts.iter().map(|(line, count)| (line.to_string(), *count)).collect();
        CompositionSnapshot {
            time,
            time_str: format_seconds(time),
            totals_by_line,
            military_total: 0,
            villagers_total_proxy: 0,
            gold_units_total: 0,
            trash_units_total: 0,
            gold_pct: None,
            trash_pct: None,
        }
    }

    #[test]
    fn test_knight_switch_answered_by_pikes() {
        // Opponent knight count 1 -> 7 at t=420; viewer pikes reach 3 at
        // t=480; pikeman_line is a registered counter to knight_line.
        let opponent = vec![
            snapshot(300, &[("knight_line", 1)]),
            snapshot(420, &[("knight_line", 7)]),
        ];
        let viewer = vec![
            snapshot(420, &[("pikeman_line", 1)]),
            snapshot(480, &[("pikeman_line", 3)]),
        ];
        let report = detect_switches(&opponent, &viewer, &AnalysisConfig::default());

        assert_eq!(report.switch_events.len(), 1);
        let event = &report.switch_events[0];
        assert_eq!(event.opponent_line, "knight_line");
        assert_eq!(event.delta, 6);
        assert_eq!(event.time, 420);
        assert_eq!(event.confidence, Confidence::Low);

        assert_eq!(report.response_delay_vs_opponent.len(), 1);
        let response = &report.response_delay_vs_opponent[0];
        assert_eq!(response.your_line, "pikeman_line");
        assert_eq!(response.response_time, 480);
        assert_eq!(response.delay, 60);
        assert!(report.missed_counter_opportunities.is_empty());
    }

    #[test]
    fn test_gradual_reinforcement_is_not_a_switch() {
        // Prior count above the baseline threshold: reinforcement, not pivot.
        let opponent = vec![
            snapshot(300, &[("archer_line", 4)]),
            snapshot(600, &[("archer_line", 12)]),
        ];
        let report = detect_switches(&opponent, &[], &AnalysisConfig::default());
        assert!(report.switch_events.is_empty());
    }

    #[test]
    fn test_small_delta_is_not_a_switch() {
        let opponent = vec![
            snapshot(300, &[("archer_line", 0)]),
            snapshot(600, &[("archer_line", 4)]),
        ];
        let report = detect_switches(&opponent, &[], &AnalysisConfig::default());
        assert!(report.switch_events.is_empty());
    }

    #[test]
    fn test_excluded_lines_never_switch() {
        let opponent = vec![
            snapshot(300, &[("villager", 2), ("unknown", 0)]),
            snapshot(600, &[("villager", 20), ("unknown", 9)]),
        ];
        let report = detect_switches(&opponent, &[], &AnalysisConfig::default());
        assert!(report.switch_events.is_empty());
    }

    #[test]
    fn test_unanswered_switch_lists_all_candidates() {
        let opponent = vec![
            snapshot(300, &[("knight_line", 0)]),
            snapshot(600, &[("knight_line", 8)]),
        ];
        let viewer = vec![snapshot(600, &[("pikeman_line", 2)])];
        let report = detect_switches(&opponent, &viewer, &AnalysisConfig::default());

        assert!(report.response_delay_vs_opponent.is_empty());
        assert_eq!(report.missed_counter_opportunities.len(), 1);
        let missed = &report.missed_counter_opportunities[0];
        assert_eq!(missed.opponent_line, "knight_line");
        assert_eq!(
            missed.suggested_counters,
            vec!["pikeman_line", "camel_line", "monk"]
        );
    }

    #[test]
    fn test_exactly_one_outcome_per_switch() {
        // Two switches, one answered and one missed; every switch resolves
        // to exactly one of the two lists.
        let opponent = vec![
            snapshot(300, &[("knight_line", 0), ("archer_line", 0)]),
            snapshot(600, &[("knight_line", 8), ("archer_line", 6)]),
        ];
        let viewer = vec![snapshot(700, &[("skirmisher_line", 5)])];
        let report = detect_switches(&opponent, &viewer, &AnalysisConfig::default());

        assert_eq!(report.switch_events.len(), 2);
        assert_eq!(
            report.response_delay_vs_opponent.len() + report.missed_counter_opportunities.len(),
            report.switch_events.len()
        );
    }

    #[test]
    fn test_viewer_snapshots_before_event_ignored() {
        // Counter count was high before the switch but collapsed after.
        let opponent = vec![
            snapshot(300, &[("knight_line", 0)]),
            snapshot(600, &[("knight_line", 8)]),
        ];
        let viewer = vec![snapshot(300, &[("pikeman_line", 6)])];
        let report = detect_switches(&opponent, &viewer, &AnalysisConfig::default());
        assert_eq!(report.missed_counter_opportunities.len(), 1);
    }

    #[test]
    fn test_counter_table_order_breaks_snapshot_tie() {
        // Both registered counters qualify in the same snapshot; table
        // order picks pikeman_line over camel_line.
        let opponent = vec![
            snapshot(300, &[("knight_line", 0)]),
            snapshot(600, &[("knight_line", 8)]),
        ];
        let viewer = vec![snapshot(600, &[("camel_line", 4), ("pikeman_line", 4)])];
        let report = detect_switches(&opponent, &viewer, &AnalysisConfig::default());
        assert_eq!(report.response_delay_vs_opponent[0].your_line, "pikeman_line");
    }

    #[test]
    fn test_earlier_snapshot_beats_table_order() {
        // A later snapshot has the first-table counter, but an earlier one
        // already qualifies with a lower-priority counter.
        let opponent = vec![
            snapshot(300, &[("knight_line", 0)]),
            snapshot(600, &[("knight_line", 8)]),
        ];
        let viewer = vec![
            snapshot(700, &[("camel_line", 3)]),
            snapshot(900, &[("pikeman_line", 9)]),
        ];
        let report = detect_switches(&opponent, &viewer, &AnalysisConfig::default());
        let response = &report.response_delay_vs_opponent[0];
        assert_eq!(response.your_line, "camel_line");
        assert_eq!(response.response_time, 700);
        assert_eq!(response.delay, 100);
    }

    #[test]
    fn test_resurgent_line_counts_as_switch() {
        // Count 2 -> 7: prior is at the baseline threshold, delta is 5.
        let opponent = vec![
            snapshot(300, &[("eagle_line", 2)]),
            snapshot(600, &[("eagle_line", 7)]),
        ];
        let report = detect_switches(&opponent, &[], &AnalysisConfig::default());
        assert_eq!(report.switch_events.len(), 1);
    }
}
