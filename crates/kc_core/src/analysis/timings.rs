//! Age-up timing resolution and first-building/first-unit timestamps.
//!
//! Click times come from explicit age-up research actions when the action
//! stream has them, falling back to the decoder's match-level uptime record.
//! Completion is click plus a fixed research duration; actual completion can
//! be shifted by civilization bonuses the record does not carry, so it is a
//! documented approximation and never derived from observed gameplay. An
//! age with neither source stays null throughout.

use std::collections::BTreeMap;

use crate::data;
use crate::models::record::{ActionRecord, MatchRecord};
use crate::models::report::{AgeTimingEntry, AgeTimings, FirstTimes, PlayerTimings};
use crate::time::{format_opt_seconds, format_seconds};

use super::events::{BuildEvent, UnitEvent};

/// Fixed age-up research durations, seconds.
pub const FEUDAL_RESEARCH_SECS: u64 = 130;
pub const CASTLE_RESEARCH_SECS: u64 = 160;
pub const IMPERIAL_RESEARCH_SECS: u64 = 190;

struct AgeClicks {
    feudal: Option<u64>,
    castle: Option<u64>,
    imperial: Option<u64>,
}

/// Click times from explicit age-up research actions, if any.
fn derive_age_clicks(actions: &[&ActionRecord]) -> AgeClicks {
    let mut clicks = AgeClicks { feudal: None, castle: None, imperial: None };
    for action in actions {
        if !action.kind.is_research() {
            continue;
        }
        let Some(time) = action.time() else { continue };
        match action.payload.tech_name() {
            Some("Feudal Age") => clicks.feudal = Some(time),
            Some("Castle Age") => clicks.castle = Some(time),
            Some("Imperial Age") => clicks.imperial = Some(time),
            _ => {}
        }
    }
    clicks
}

fn timing_entry(click: Option<u64>, research_secs: u64) -> AgeTimingEntry {
    let completion = click.map(|start| start + research_secs);
    AgeTimingEntry {
        click_time: click,
        click_time_str: format_opt_seconds(click),
        completion_time: completion,
        completion_time_str: format_opt_seconds(completion),
    }
}

/// Resolve the three age transitions for one player.
pub fn resolve_timings(
    record: &MatchRecord,
    player_index: usize,
    actions: &[&ActionRecord],
) -> PlayerTimings {
    let clicks = derive_age_clicks(actions);
    let uptime = record.uptimes.get(player_index);
    let fallback = |direct: Option<u64>, recorded: Option<u64>| direct.or(recorded);

    PlayerTimings {
        ages: AgeTimings {
            feudal: timing_entry(
                fallback(clicks.feudal, uptime.and_then(|u| u.feudal)),
                FEUDAL_RESEARCH_SECS,
            ),
            castle: timing_entry(
                fallback(clicks.castle, uptime.and_then(|u| u.castle)),
                CASTLE_RESEARCH_SECS,
            ),
            imperial: timing_entry(
                fallback(clicks.imperial, uptime.and_then(|u| u.imperial)),
                IMPERIAL_RESEARCH_SECS,
            ),
        },
    }
}

/// First construction time per tracked building key.
pub fn first_buildings(builds: &[BuildEvent]) -> FirstTimes {
    let mut times: BTreeMap<String, u64> = BTreeMap::new();
    for build in builds {
        let Some(key) = build.building.as_deref().and_then(data::building_key) else {
            continue;
        };
        times.entry(key.to_string()).or_insert(build.time);
    }
    render_firsts(times)
}

/// First queue time per unit line; the `unknown` bucket is not reported.
pub fn first_units(units: &[UnitEvent]) -> FirstTimes {
    let mut times: BTreeMap<String, u64> = BTreeMap::new();
    for event in units {
        if event.line == data::UNKNOWN_LINE {
            continue;
        }
        times.entry(event.line.to_string()).or_insert(event.time);
    }
    render_firsts(times)
}

fn render_firsts(times: BTreeMap<String, u64>) -> FirstTimes {
    let times_str = times
        .iter()
        .map(|(key, time)| (key.clone(), format_seconds(*time)))
        .collect();
    FirstTimes { times, times_str }
}
