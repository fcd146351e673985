//! Viewer selection and final report assembly.
//!
//! A pure composition step: runs the per-player pipeline for viewer and
//! opponent, merges the outputs into one `CoachReport`, and attaches the
//! warnings collected from degraded-data conditions. The per-player passes
//! are mutually independent; only switch detection needs both players'
//! snapshots.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::data;
use crate::error::{CoreError, Result};
use crate::models::record::{MatchRecord, PlayerRecord};
use crate::models::report::{
    ApmBin, CoachReport, CoachView, CompositionSnapshot, CounterReport, EcoHealth, FirstTimes,
    IdleFlag, MatchInfo, PlayerSummary, PlayerTimings, ProductionReport, RawSection, TechSection,
    UnitReport, ViewPair, SCHEMA_VERSION,
};
use crate::time::coerce_seconds;

use super::apm::actions_per_minute;
use super::composition::{aggregate_units, snapshot_composition};
use super::config::AnalysisConfig;
use super::counters::detect_switches;
use super::events::{
    collect_build_events, collect_unit_events, farm_summary, market_summary, player_actions,
};
use super::idle::{production_idle_flags, tc_idle};
use super::timings::{first_buildings, first_units, resolve_timings};

/// How the caller identifies the viewer and tunes the export.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Case-insensitive in-game name of the viewer.
    pub you_name: Option<String>,
    /// 1-based player position of the viewer.
    pub you_player: Option<usize>,
    /// Export level tag echoed into the report.
    pub export_level: Option<String>,
}

/// Select viewer and opponent indices from the player list.
///
/// Precedence: case-insensitive name match, then 1-based position, then
/// list order (first player as viewer, second as opponent). With a single
/// player the viewer is their own opponent.
pub fn find_players(
    players: &[PlayerRecord],
    you_name: Option<&str>,
    you_player: Option<usize>,
) -> (usize, usize) {
    let opponent_of = |you: usize| {
        players
            .iter()
            .enumerate()
            .find(|(index, _)| *index != you)
            .map(|(index, _)| index)
            .unwrap_or(you)
    };

    if let Some(name) = you_name {
        let found = players.iter().position(|player| {
            player
                .name
                .as_deref()
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
        });
        if let Some(you) = found {
            return (you, opponent_of(you));
        }
    }
    if let Some(position) = you_player {
        let you = position.saturating_sub(1);
        if you < players.len() {
            return (you, opponent_of(you));
        }
    }
    (0, if players.len() > 1 { 1 } else { 0 })
}

/// Analyze one match record into a coaching report.
///
/// Fails only on fatal input errors: an empty player list or an
/// unparseable duration. Everything else degrades into warnings.
pub fn analyze_replay(
    record: &MatchRecord,
    options: &AnalyzeOptions,
    config: &AnalysisConfig,
) -> Result<CoachReport> {
    if record.players.is_empty() {
        return Err(CoreError::NoPlayers);
    }
    let duration = match &record.duration {
        Some(value) => coerce_seconds(value)?,
        None => 0,
    };
    let (you_index, opponent_index) =
        find_players(&record.players, options.you_name.as_deref(), options.you_player);
    info!(you_index, opponent_index, duration, "analyzing replay");

    let you = analyze_player(record, you_index, duration, config);
    let opponent = analyze_player(record, opponent_index, duration, config);

    let counters = detect_switches(&opponent.snapshots, &you.snapshots, config);

    let mut warnings = vec!["Cancellations and build destructions are not tracked.".to_string()];
    if you.tc_missing_ids || opponent.tc_missing_ids {
        warnings.push(
            "Missing object IDs for some queue events; idle times estimated overall.".to_string(),
        );
    }
    if you.production_missing_ids || opponent.production_missing_ids {
        warnings.push(
            "Missing object IDs for some production buildings; idle flags may be incomplete."
                .to_string(),
        );
    }

    let coach_view = CoachView {
        timings: ViewPair { you: you.timings, opponent: opponent.timings },
        first_buildings: ViewPair {
            you: you.first_buildings,
            opponent: opponent.first_buildings,
        },
        first_units: ViewPair { you: you.first_units, opponent: opponent.first_units },
        units: ViewPair {
            you: UnitReport {
                created_totals_by_type: you.units_by_type,
                created_totals_by_line: you.units_by_line,
                composition_snapshots: you.snapshots,
            },
            opponent: UnitReport {
                created_totals_by_type: opponent.units_by_type,
                created_totals_by_line: opponent.units_by_line,
                composition_snapshots: opponent.snapshots,
            },
        },
        eco_health: ViewPair { you: you.eco, opponent: opponent.eco },
        production: ViewPair {
            you: ProductionReport { idle_flags: you.idle_flags },
            opponent: ProductionReport { idle_flags: opponent.idle_flags },
        },
        counters: ViewPair { you: counters, opponent: CounterReport::default() },
        tech: TechSection { categories: data::tech_categories(), ..Default::default() },
    };

    Ok(CoachReport {
        schema_version: SCHEMA_VERSION.to_string(),
        export_level: options.export_level.clone().unwrap_or_else(|| "coach".to_string()),
        match_info: MatchInfo {
            map: record.map.clone(),
            duration,
            timestamp: record.timestamp,
            version: record.version.clone(),
            build: record.build.clone(),
        },
        players: ViewPair {
            you: summarize_player(&record.players[you_index]),
            opponent: summarize_player(&record.players[opponent_index]),
        },
        coach_view,
        raw: RawSection {
            actions_per_minute: ViewPair { you: you.apm, opponent: opponent.apm },
        },
        warnings,
        notes: vec!["Queued units represent commands, not surviving units.".to_string()],
    })
}

/// Everything derived from one player's slice of the action stream.
struct PlayerAnalysis {
    timings: PlayerTimings,
    first_buildings: FirstTimes,
    first_units: FirstTimes,
    units_by_type: BTreeMap<String, u32>,
    units_by_line: BTreeMap<String, u32>,
    snapshots: Vec<CompositionSnapshot>,
    eco: EcoHealth,
    idle_flags: Vec<IdleFlag>,
    apm: Vec<ApmBin>,
    tc_missing_ids: bool,
    production_missing_ids: bool,
}

fn analyze_player(
    record: &MatchRecord,
    player_index: usize,
    duration: u64,
    config: &AnalysisConfig,
) -> PlayerAnalysis {
    let actions = player_actions(record, player_index);
    let units = collect_unit_events(&actions);
    let builds = collect_build_events(&actions);
    debug!(
        player_index,
        actions = actions.len(),
        unit_events = units.len(),
        build_events = builds.len(),
        "classified actions"
    );

    let timings = resolve_timings(record, player_index, &actions);
    let snapshots = snapshot_composition(&units, duration, &timings.ages, config);
    let (units_by_type, units_by_line) = aggregate_units(&units);
    let (tc_idle_time, tc_missing_ids) =
        tc_idle(&units, &builds, duration, &timings.ages, config);
    let (idle_flags, production_missing_ids) =
        production_idle_flags(&units, &builds, duration, config);

    PlayerAnalysis {
        first_buildings: first_buildings(&builds),
        first_units: first_units(&units),
        eco: EcoHealth {
            tc_idle_time,
            farms: farm_summary(&builds),
            market: market_summary(&actions),
        },
        apm: actions_per_minute(&actions, duration),
        timings,
        units_by_type,
        units_by_line,
        snapshots,
        idle_flags,
        tc_missing_ids,
        production_missing_ids,
    }
}

fn summarize_player(player: &PlayerRecord) -> PlayerSummary {
    PlayerSummary {
        name: player.name.clone(),
        civilization: player.civilization.clone(),
        winner: player.winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str) -> PlayerRecord {
        PlayerRecord {
            name: Some(name.to_string()),
            civilization: None,
            winner: false,
        }
    }

    #[test]
    fn test_find_players_by_name_case_insensitive() {
        let players = vec![player("Alice"), player("Bob")];
        assert_eq!(find_players(&players, Some("bob"), None), (1, 0));
    }

    #[test]
    fn test_name_beats_position() {
        let players = vec![player("Alice"), player("Bob")];
        assert_eq!(find_players(&players, Some("ALICE"), Some(2)), (0, 1));
    }

    #[test]
    fn test_find_players_by_position() {
        let players = vec![player("Alice"), player("Bob")];
        assert_eq!(find_players(&players, None, Some(2)), (1, 0));
        // Out-of-range position falls back to list order.
        assert_eq!(find_players(&players, None, Some(5)), (0, 1));
    }

    #[test]
    fn test_find_players_defaults_to_list_order() {
        let players = vec![player("Alice"), player("Bob")];
        assert_eq!(find_players(&players, Some("Nobody"), None), (0, 1));
    }

    #[test]
    fn test_single_player_is_own_opponent() {
        let players = vec![player("Alice")];
        assert_eq!(find_players(&players, None, None), (0, 0));
    }

    #[test]
    fn test_no_players_is_fatal() {
        let record = MatchRecord {
            map: None,
            duration: None,
            timestamp: None,
            version: None,
            build: None,
            players: vec![],
            actions: vec![],
            uptimes: vec![],
        };
        let result =
            analyze_replay(&record, &AnalyzeOptions::default(), &AnalysisConfig::default());
        assert!(matches!(result, Err(CoreError::NoPlayers)));
    }

    #[test]
    fn test_bad_duration_is_fatal() {
        let record = MatchRecord {
            map: None,
            duration: Some(crate::models::record::DurationValue::Clock("bogus".into())),
            timestamp: None,
            version: None,
            build: None,
            players: vec![player("Alice")],
            actions: vec![],
            uptimes: vec![],
        };
        let result =
            analyze_replay(&record, &AnalyzeOptions::default(), &AnalysisConfig::default());
        assert!(matches!(result, Err(CoreError::InvalidDuration(_))));
    }
}
