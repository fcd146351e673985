//! Action classification and event extraction.
//!
//! Filters a player's slice of the raw action stream into the derived
//! sequences everything downstream consumes: unit events, build events,
//! market summary, farm milestones. Each sequence is sorted ascending by
//! time with ties kept in original action order (stable sort). Actions
//! without a timestamp emit nothing; this is a tolerance policy, not an
//! error.

use crate::data;
use crate::models::record::{ActionRecord, MatchRecord};
use crate::models::report::{FarmMilestones, FarmMilestonesStr, FarmSummary, MarketSummary};
use crate::time::format_opt_seconds;

/// One qualifying unit-queue action.
#[derive(Debug, Clone)]
pub struct UnitEvent {
    pub time: u64,
    pub unit: Option<String>,
    /// Canonical category from the unit-line table; `unknown` when the name
    /// is absent or unmapped.
    pub line: &'static str,
    pub object_ids: Vec<u64>,
}

/// One construction action.
#[derive(Debug, Clone)]
pub struct BuildEvent {
    pub time: u64,
    pub building: Option<String>,
    pub object_ids: Vec<u64>,
}

/// A player's slice of the raw action stream, in stream order.
pub fn player_actions<'a>(record: &'a MatchRecord, player_index: usize) -> Vec<&'a ActionRecord> {
    record
        .actions
        .iter()
        .filter(|action| action.player == Some(player_index))
        .collect()
}

/// Extract unit-queue events, sorted ascending by time.
pub fn collect_unit_events(actions: &[&ActionRecord]) -> Vec<UnitEvent> {
    let mut events: Vec<UnitEvent> = actions
        .iter()
        .filter(|action| action.kind.is_unit_queue())
        .filter_map(|action| {
            let time = action.time()?;
            let unit = action.payload.unit_name();
            Some(UnitEvent {
                time,
                unit: unit.map(str::to_string),
                line: data::unit_line(unit),
                object_ids: action.object_ids.clone(),
            })
        })
        .collect();
    events.sort_by_key(|event| event.time);
    events
}

/// Extract construction events, sorted ascending by time.
pub fn collect_build_events(actions: &[&ActionRecord]) -> Vec<BuildEvent> {
    let mut builds: Vec<BuildEvent> = actions
        .iter()
        .filter(|action| action.kind == crate::models::record::ActionKind::Build)
        .filter_map(|action| {
            let time = action.time()?;
            Some(BuildEvent {
                time,
                building: action.payload.building_name().map(str::to_string),
                object_ids: action.object_ids.clone(),
            })
        })
        .collect();
    builds.sort_by_key(|build| build.time);
    builds
}

/// First buy/sell timestamps and total market command counts.
pub fn market_summary(actions: &[&ActionRecord]) -> MarketSummary {
    let mut summary = MarketSummary::default();
    for action in actions {
        if action.kind.is_buy() {
            if let Some(time) = action.time() {
                summary.first_buy.get_or_insert(time);
            }
            summary.buy_count += 1;
        }
        if action.kind.is_sell() {
            if let Some(time) = action.time() {
                summary.first_sell.get_or_insert(time);
            }
            summary.sell_count += 1;
        }
    }
    summary.first_buy_str = format_opt_seconds(summary.first_buy);
    summary.first_sell_str = format_opt_seconds(summary.first_sell);
    summary
}

/// Farm count and 1st/5th/10th farm timestamps.
pub fn farm_summary(builds: &[BuildEvent]) -> FarmSummary {
    let mut farm_times: Vec<u64> = builds
        .iter()
        .filter(|build| build.building.as_deref() == Some("Farm"))
        .map(|build| build.time)
        .collect();
    farm_times.sort_unstable();

    let milestone = |count: usize| farm_times.get(count - 1).copied();
    let milestones = FarmMilestones {
        first: milestone(1),
        five: milestone(5),
        ten: milestone(10),
    };
    FarmSummary {
        total: farm_times.len() as u32,
        milestones_str: FarmMilestonesStr {
            first: format_opt_seconds(milestones.first),
            five: format_opt_seconds(milestones.five),
            ten: format_opt_seconds(milestones.ten),
        },
        milestones,
    }
}
