//! Idle detection: town-center production gaps and per-building production
//! idle flags.
//!
//! Both detectors correlate unit-queue events to building objects through
//! object ids. Ids are frequently absent from decoder output, so missing
//! ids select a coarser strategy up front (aggregate timeline, or skipping
//! the building) and raise a flag that the assembler turns into a report
//! warning. Degraded data never aborts the analysis.

use std::collections::{BTreeMap, BTreeSet};

use crate::data;
use crate::models::report::{AgeIdleBreakdown, AgeTimings, IdleFlag, TcIdleReport};
use crate::time::format_seconds;

use super::config::AnalysisConfig;
use super::events::{BuildEvent, UnitEvent};

/// The four age spans used for idle attribution, clipped to
/// `[0, duration]` wherever a boundary click is unresolved.
struct AgeSpans {
    dark: (u64, u64),
    feudal: (u64, u64),
    castle: (u64, u64),
    imperial: (u64, u64),
}

impl AgeSpans {
    fn new(ages: &AgeTimings, duration: u64) -> Self {
        let feudal = ages.feudal.click_time;
        let castle = ages.castle.click_time;
        let imperial = ages.imperial.click_time;
        Self {
            dark: (0, feudal.unwrap_or(duration)),
            feudal: (feudal.unwrap_or(0), castle.unwrap_or(duration)),
            castle: (castle.unwrap_or(0), imperial.unwrap_or(duration)),
            imperial: (imperial.unwrap_or(0), duration),
        }
    }
}

fn overlap(start: u64, end: u64, span: (u64, u64)) -> u64 {
    end.min(span.1).saturating_sub(start.max(span.0))
}

/// Running idle total with per-age attribution, threaded through the walk
/// over production timestamps.
struct IdleAccumulator {
    total: u64,
    by_age: AgeIdleBreakdown,
}

impl IdleAccumulator {
    fn new() -> Self {
        Self { total: 0, by_age: AgeIdleBreakdown::default() }
    }

    fn add(&mut self, start: u64, end: u64, spans: &AgeSpans) {
        self.total += end.saturating_sub(start);
        self.by_age.dark += overlap(start, end, spans.dark);
        self.by_age.feudal += overlap(start, end, spans.feudal);
        self.by_age.castle += overlap(start, end, spans.castle);
        self.by_age.imperial += overlap(start, end, spans.imperial);
    }
}

/// Walk one chronological villager-production timeline, counting gaps that
/// exceed the production cycle plus tolerance, including the tail before
/// the end of the match.
fn walk_villager_timeline(
    times: &[u64],
    duration: u64,
    spans: &AgeSpans,
    config: &AnalysisConfig,
    accumulator: &mut IdleAccumulator,
) {
    let cycle = config.tc_cycle_seconds;
    let tolerance = config.tc_idle_tolerance;
    let mut last = 0u64;
    for &time in times {
        if time > last + cycle + tolerance {
            accumulator.add(last + cycle, time, spans);
        }
        last = time;
    }
    if last > 0 && duration > last + cycle + tolerance {
        accumulator.add(last + cycle, duration, spans);
    }
}

/// Town-center idle time for one player.
///
/// When town-center build events carry object ids, each physical town
/// center gets its own villager timeline keyed by matching id; otherwise a
/// single aggregate timeline over all villager events is used and the
/// returned flag reports the degradation.
pub fn tc_idle(
    units: &[UnitEvent],
    builds: &[BuildEvent],
    duration: u64,
    ages: &AgeTimings,
    config: &AnalysisConfig,
) -> (TcIdleReport, bool) {
    let villager_events: Vec<&UnitEvent> =
        units.iter().filter(|event| event.line == "villager").collect();
    let tc_ids: BTreeSet<u64> = builds
        .iter()
        .filter(|build| build.building.as_deref() == Some(data::TOWN_CENTER))
        .flat_map(|build| build.object_ids.iter().copied())
        .collect();

    let spans = AgeSpans::new(ages, duration);
    let mut accumulator = IdleAccumulator::new();
    let missing_ids = tc_ids.is_empty();

    if missing_ids {
        let times: Vec<u64> = villager_events.iter().map(|event| event.time).collect();
        walk_villager_timeline(&times, duration, &spans, config, &mut accumulator);
    } else {
        for tc_id in &tc_ids {
            let mut times: Vec<u64> = villager_events
                .iter()
                .filter(|event| event.object_ids.contains(tc_id))
                .map(|event| event.time)
                .collect();
            times.sort_unstable();
            walk_villager_timeline(&times, duration, &spans, config, &mut accumulator);
        }
    }

    let report = TcIdleReport {
        total: accumulator.total,
        total_str: format_seconds(accumulator.total),
        by_age: accumulator.by_age,
    };
    (report, missing_ids)
}

/// Production idle flags for one player.
///
/// For each production building with known object ids, walks that object's
/// unit-queue timeline from construction onwards and flags every gap above
/// the threshold, plus the trailing gap to the end of the match. Builds
/// without ids are skipped and reported through the returned flag.
pub fn production_idle_flags(
    units: &[UnitEvent],
    builds: &[BuildEvent],
    duration: u64,
    config: &AnalysisConfig,
) -> (Vec<IdleFlag>, bool) {
    let mut events_by_id: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for event in units {
        for &object_id in &event.object_ids {
            events_by_id.entry(object_id).or_default().push(event.time);
        }
    }

    let threshold = config.production_idle_threshold as i64;
    let mut flags = Vec::new();
    let mut missing_ids = false;

    for build in builds {
        let Some(building) = build.building.as_deref() else { continue };
        if !data::PRODUCTION_BUILDINGS.contains(&building) {
            continue;
        }
        if build.object_ids.is_empty() {
            missing_ids = true;
            continue;
        }
        for &object_id in &build.object_ids {
            let mut times = events_by_id.get(&object_id).cloned().unwrap_or_default();
            times.sort_unstable();
            let mut last = build.time as i64;
            for &time in &times {
                let gap = time as i64 - last;
                if gap > threshold {
                    flags.push(make_flag(building, object_id, last as u64, gap as u64));
                }
                last = time as i64;
            }
            let tail = duration as i64 - last;
            if tail > threshold {
                flags.push(make_flag(building, object_id, last as u64, tail as u64));
            }
        }
    }
    (flags, missing_ids)
}

fn make_flag(building: &str, object_id: u64, start: u64, gap: u64) -> IdleFlag {
    IdleFlag {
        building: building.to_string(),
        object_id,
        start,
        start_str: format_seconds(start),
        duration: gap,
        duration_str: format_seconds(gap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::AgeTimingEntry;

    fn villager(time: u64, object_ids: Vec<u64>) -> UnitEvent {
        UnitEvent { time, unit: Some("Villager".into()), line: "villager", object_ids }
    }

    fn military(time: u64, object_ids: Vec<u64>) -> UnitEvent {
        UnitEvent { time, unit: Some("Archer".into()), line: "archer_line", object_ids }
    }

    fn build(time: u64, building: &str, object_ids: Vec<u64>) -> BuildEvent {
        BuildEvent { time, building: Some(building.to_string()), object_ids }
    }

    fn ages(feudal: Option<u64>, castle: Option<u64>, imperial: Option<u64>) -> AgeTimings {
        let entry = |click: Option<u64>| AgeTimingEntry { click_time: click, ..Default::default() };
        AgeTimings { feudal: entry(feudal), castle: entry(castle), imperial: entry(imperial) }
    }

    #[test]
    fn test_steady_production_then_trailing_gap() {
        // Production every 25s through t=300, then nothing until 900:
        // zero idle before 300, ~575s attributed to the trailing gap.
        let units: Vec<UnitEvent> =
            (0..=12).map(|i| villager(i * 25, vec![100])).collect();
        let builds = vec![build(0, data::TOWN_CENTER, vec![100])];
        let (report, missing) =
            tc_idle(&units, &builds, 900, &ages(None, None, None), &AnalysisConfig::default());

        assert!(!missing);
        assert_eq!(report.total, 575);
        assert_eq!(report.by_age.dark, 575);
    }

    #[test]
    fn test_gap_within_tolerance_not_idle() {
        // 30s between villagers = cycle + tolerance exactly; not idle.
        let units = vec![villager(0, vec![1]), villager(30, vec![1]), villager(60, vec![1])];
        let builds = vec![build(0, data::TOWN_CENTER, vec![1])];
        let (report, _) =
            tc_idle(&units, &builds, 85, &ages(None, None, None), &AnalysisConfig::default());
        assert_eq!(report.total, 0);
    }

    #[test]
    fn test_aggregate_fallback_raises_missing_flag() {
        let units = vec![villager(0, vec![]), villager(200, vec![])];
        let builds = vec![build(0, data::TOWN_CENTER, vec![])];
        let (report, missing) =
            tc_idle(&units, &builds, 300, &ages(None, None, None), &AnalysisConfig::default());

        assert!(missing);
        // Gap 0 -> 200 is idle from 25 to 200, tail from 225 to 300.
        assert_eq!(report.total, 175 + 75);
    }

    #[test]
    fn test_idle_attributed_across_age_spans() {
        // One idle interval [25, 200) against a Feudal click at 100:
        // 75s in Dark, 100s in Feudal. Castle/Imperial spans have null
        // boundaries and clip to [0, 200], so they absorb the whole interval.
        let units = vec![villager(0, vec![1]), villager(200, vec![1])];
        let builds = vec![build(0, data::TOWN_CENTER, vec![1])];
        let age_times = ages(Some(100), None, None);
        let (report, _) =
            tc_idle(&units, &builds, 200, &age_times, &AnalysisConfig::default());

        assert_eq!(report.by_age.dark, 75);
        assert_eq!(report.by_age.feudal, 100);
        assert_eq!(report.by_age.castle, 175);
        assert_eq!(report.by_age.imperial, 175);
        assert_eq!(report.total, 175);
    }

    #[test]
    fn test_per_age_idle_never_exceeds_span() {
        let units = vec![villager(0, vec![1]), villager(500, vec![1])];
        let builds = vec![build(0, data::TOWN_CENTER, vec![1])];
        let age_times = ages(Some(120), Some(400), Some(450));
        let duration = 500;
        let (report, _) =
            tc_idle(&units, &builds, duration, &age_times, &AnalysisConfig::default());

        assert!(report.by_age.dark <= 120);
        assert!(report.by_age.feudal <= 400 - 120);
        assert!(report.by_age.castle <= 450 - 400);
        assert!(report.by_age.imperial <= duration - 450);
    }

    #[test]
    fn test_two_town_centers_tracked_independently() {
        // TC 1 produces steadily; TC 2 goes quiet after t=50.
        let mut units: Vec<UnitEvent> = (0..=8).map(|i| villager(i * 25, vec![1])).collect();
        units.push(villager(25, vec![2]));
        units.push(villager(50, vec![2]));
        units.sort_by_key(|event| event.time);
        let builds =
            vec![build(0, data::TOWN_CENTER, vec![1]), build(0, data::TOWN_CENTER, vec![2])];
        let (report, missing) =
            tc_idle(&units, &builds, 200, &ages(None, None, None), &AnalysisConfig::default());

        assert!(!missing);
        // Only TC 2 idles: from 75 to 200.
        assert_eq!(report.total, 125);
    }

    #[test]
    fn test_no_villagers_means_no_idle() {
        // The walk never starts without a first production event.
        let (report, missing) =
            tc_idle(&[], &[], 900, &ages(None, None, None), &AnalysisConfig::default());
        assert!(missing);
        assert_eq!(report.total, 0);
    }

    #[test]
    fn test_production_flags_gap_and_tail() {
        let units = vec![
            military(100, vec![40]),
            military(130, vec![40]),
            military(300, vec![40]),
        ];
        let builds = vec![build(60, "Archery Range", vec![40])];
        let (flags, missing) =
            production_idle_flags(&units, &builds, 500, &AnalysisConfig::default());

        assert!(!missing);
        assert_eq!(flags.len(), 2);
        // Gap 130 -> 300 exceeds 60s.
        assert_eq!(flags[0].start, 130);
        assert_eq!(flags[0].duration, 170);
        // Tail 300 -> 500.
        assert_eq!(flags[1].start, 300);
        assert_eq!(flags[1].duration, 200);
        assert_eq!(flags[1].building, "Archery Range");
        assert_eq!(flags[1].object_id, 40);
    }

    #[test]
    fn test_production_build_without_ids_is_skipped() {
        let builds = vec![build(60, "Barracks", vec![])];
        let (flags, missing) =
            production_idle_flags(&[], &builds, 500, &AnalysisConfig::default());
        assert!(flags.is_empty());
        assert!(missing);
    }

    #[test]
    fn test_non_production_buildings_ignored() {
        let builds = vec![build(60, "House", vec![9])];
        let (flags, missing) =
            production_idle_flags(&[], &builds, 500, &AnalysisConfig::default());
        assert!(flags.is_empty());
        assert!(!missing);
    }
}
