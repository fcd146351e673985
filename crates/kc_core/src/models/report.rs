//! Output boundary: the versioned coaching report.
//!
//! Consumers (report writers, prompt builders) depend on these field names
//! and shapes only, never on pipeline internals. Every `*_str` field is the
//! `M:SS` rendering of its numeric sibling; numeric fields stay authoritative.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Report schema tag. Bump on any field rename or shape change.
pub const SCHEMA_VERSION: &str = "0.4.0";

/// A pair of values keyed by viewer role.
///
/// The you/opponent distinction is a view computed once per analysis, not a
/// property of the players themselves.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViewPair<T> {
    pub you: T,
    pub opponent: T,
}

/// Top-level coaching report for one match.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CoachReport {
    pub schema_version: String,
    pub export_level: String,
    #[serde(rename = "match")]
    pub match_info: MatchInfo,
    pub players: ViewPair<PlayerSummary>,
    pub coach_view: CoachView,
    pub raw: RawSection,
    /// Human-readable degraded-data conditions encountered during analysis.
    pub warnings: Vec<String>,
    /// Standing disclaimers about what the metrics do and do not model.
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MatchInfo {
    pub map: Option<String>,
    /// Coerced match duration in whole seconds.
    pub duration: u64,
    pub timestamp: Option<i64>,
    pub version: Option<String>,
    pub build: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlayerSummary {
    pub name: Option<String>,
    pub civilization: Option<String>,
    pub winner: bool,
}

/// The coach-facing derived metrics, keyed by viewer role per section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CoachView {
    pub timings: ViewPair<PlayerTimings>,
    pub first_buildings: ViewPair<FirstTimes>,
    pub first_units: ViewPair<FirstTimes>,
    pub units: ViewPair<UnitReport>,
    pub eco_health: ViewPair<EcoHealth>,
    pub production: ViewPair<ProductionReport>,
    pub counters: ViewPair<CounterReport>,
    pub tech: TechSection,
}

// ---------------------------------------------------------------------------
// Timings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlayerTimings {
    pub ages: AgeTimings,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgeTimings {
    #[serde(rename = "Feudal")]
    pub feudal: AgeTimingEntry,
    #[serde(rename = "Castle")]
    pub castle: AgeTimingEntry,
    #[serde(rename = "Imperial")]
    pub imperial: AgeTimingEntry,
}

/// Resolved age-up timing. `completion_time` is click + fixed research
/// duration; both stay `None` when no click could be resolved. Never
/// defaulted to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AgeTimingEntry {
    pub click_time: Option<u64>,
    pub click_time_str: Option<String>,
    pub completion_time: Option<u64>,
    pub completion_time_str: Option<String>,
}

/// First occurrence timestamps keyed by building key or unit line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FirstTimes {
    pub times: BTreeMap<String, u64>,
    pub times_str: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Units / composition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UnitReport {
    /// Queue commands per concrete unit name over the whole match.
    pub created_totals_by_type: BTreeMap<String, u32>,
    /// Queue commands per unit line over the whole match.
    pub created_totals_by_line: BTreeMap<String, u32>,
    pub composition_snapshots: Vec<CompositionSnapshot>,
}

/// Cumulative unit composition at one bucket boundary.
///
/// Counts are queued/trained commands, never surviving units; they are
/// monotonically non-decreasing across a player's snapshot sequence.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompositionSnapshot {
    pub time: u64,
    pub time_str: String,
    pub totals_by_line: BTreeMap<String, u32>,
    pub military_total: u32,
    pub villagers_total_proxy: u32,
    pub gold_units_total: u32,
    pub trash_units_total: u32,
    /// `None` when there is no army yet; distinguishes "no army" from
    /// "0% gold army".
    pub gold_pct: Option<f64>,
    pub trash_pct: Option<f64>,
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EcoHealth {
    pub tc_idle_time: TcIdleReport,
    pub farms: FarmSummary,
    pub market: MarketSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TcIdleReport {
    pub total: u64,
    pub total_str: String,
    pub by_age: AgeIdleBreakdown,
}

/// Idle seconds attributed to each age span by interval overlap.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AgeIdleBreakdown {
    #[serde(rename = "Dark")]
    pub dark: u64,
    #[serde(rename = "Feudal")]
    pub feudal: u64,
    #[serde(rename = "Castle")]
    pub castle: u64,
    #[serde(rename = "Imperial")]
    pub imperial: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FarmSummary {
    pub total: u32,
    pub milestones: FarmMilestones,
    pub milestones_str: FarmMilestonesStr,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FarmMilestones {
    pub first: Option<u64>,
    pub five: Option<u64>,
    pub ten: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FarmMilestonesStr {
    pub first: Option<String>,
    pub five: Option<String>,
    pub ten: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MarketSummary {
    pub first_buy: Option<u64>,
    pub first_buy_str: Option<String>,
    pub first_sell: Option<u64>,
    pub first_sell_str: Option<String>,
    pub buy_count: u32,
    pub sell_count: u32,
}

// ---------------------------------------------------------------------------
// Production
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProductionReport {
    pub idle_flags: Vec<IdleFlag>,
}

/// An interval where a production building produced nothing for longer than
/// the configured threshold.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IdleFlag {
    pub building: String,
    pub object_id: u64,
    pub start: u64,
    pub start_str: String,
    pub duration: u64,
    pub duration_str: String,
}

// ---------------------------------------------------------------------------
// Switch / counter detection
// ---------------------------------------------------------------------------

/// All switch/counter detections are heuristic signals, never ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Confidence {
    #[serde(rename = "low")]
    Low,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CounterReport {
    pub switch_events: Vec<SwitchEvent>,
    pub response_delay_vs_opponent: Vec<ResponseRecord>,
    pub missed_counter_opportunities: Vec<MissedCounter>,
}

/// A sudden opponent composition jump interpreted as a strategy shift.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwitchEvent {
    pub time: u64,
    pub time_str: String,
    pub opponent_line: String,
    pub delta: u32,
    pub confidence: Confidence,
}

/// The viewer's first qualifying counter to a detected switch.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseRecord {
    pub opponent_line: String,
    pub your_line: String,
    pub response_time: u64,
    pub response_time_str: String,
    pub delay: u64,
    pub delay_str: String,
    pub confidence: Confidence,
}

/// A switch the viewer never answered within the remaining timeline.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MissedCounter {
    pub opponent_line: String,
    pub suggested_counters: Vec<String>,
    pub confidence: Confidence,
}

// ---------------------------------------------------------------------------
// Tech / raw sections
// ---------------------------------------------------------------------------

/// Research tracking is reserved; only the static category table ships today.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TechSection {
    pub you: BTreeMap<String, Vec<String>>,
    pub opponent: BTreeMap<String, Vec<String>>,
    pub categories: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawSection {
    pub actions_per_minute: ViewPair<Vec<ApmBin>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApmBin {
    pub minute: u32,
    pub actions: u32,
}
