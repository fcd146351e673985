//! Input boundary: the serialized match record supplied by the replay
//! decoder.
//!
//! Binary `.aoe2record` decoding is an external concern; this module only
//! defines the deserialization contract for the decoder's output. Every
//! field the pipeline does not strictly require is optional or defaulted so
//! that partial records from older decoder versions still analyze.

use serde::Deserialize;

/// Top-level record for one match.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchRecord {
    pub map: Option<String>,
    pub duration: Option<DurationValue>,
    /// Unix timestamp of the match start, when the decoder knows it.
    pub timestamp: Option<i64>,
    pub version: Option<String>,
    pub build: Option<String>,
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
    /// Match-level age-up records, indexed by player position.
    #[serde(default)]
    pub uptimes: Vec<UptimeRecord>,
}

/// Match duration as decoders emit it: seconds or a clock string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(f64),
    Clock(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRecord {
    pub name: Option<String>,
    pub civilization: Option<String>,
    #[serde(default)]
    pub winner: bool,
}

/// One raw action from the decoder's flat action stream.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRecord {
    /// Index into `MatchRecord::players`.
    pub player: Option<usize>,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Seconds from match start. Actions without a timestamp are dropped
    /// during classification, not rejected.
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub payload: ActionPayload,
    /// Game object ids the action refers to (e.g. the producing building).
    /// Often empty; idle detection degrades gracefully without them.
    #[serde(default)]
    pub object_ids: Vec<u64>,
}

impl ActionRecord {
    /// Timestamp truncated to whole seconds, when present.
    pub fn time(&self) -> Option<u64> {
        self.timestamp.map(|ts| ts.max(0.0) as u64)
    }
}

/// Decoder action types the pipeline understands.
///
/// The `DE_*` variants are the Definitive Edition spellings of the same
/// commands. Anything unrecognized maps to `Other` and is ignored by the
/// classifiers rather than failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "TRAIN")]
    Train,
    #[serde(rename = "DE_QUEUE")]
    DeQueue,
    #[serde(rename = "CREATE")]
    Create,
    #[serde(rename = "BUILD")]
    Build,
    #[serde(rename = "RESEARCH")]
    Research,
    #[serde(rename = "DE_RESEARCH")]
    DeResearch,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "DE_BUY")]
    DeBuy,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "DE_SELL")]
    DeSell,
    #[serde(other)]
    Other,
}

impl ActionKind {
    /// Commands that queue a unit.
    pub fn is_unit_queue(self) -> bool {
        matches!(self, ActionKind::Train | ActionKind::DeQueue | ActionKind::Create)
    }

    pub fn is_research(self) -> bool {
        matches!(self, ActionKind::Research | ActionKind::DeResearch)
    }

    pub fn is_buy(self) -> bool {
        matches!(self, ActionKind::Buy | ActionKind::DeBuy)
    }

    pub fn is_sell(self) -> bool {
        matches!(self, ActionKind::Sell | ActionKind::DeSell)
    }
}

/// Action payload; which field is populated depends on the action type and
/// the decoder version, so lookups fall back from the specific field to the
/// generic `name`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionPayload {
    pub unit: Option<String>,
    pub building: Option<String>,
    pub tech: Option<String>,
    pub name: Option<String>,
}

impl ActionPayload {
    pub fn unit_name(&self) -> Option<&str> {
        self.unit.as_deref().or(self.name.as_deref())
    }

    pub fn building_name(&self) -> Option<&str> {
        self.building.as_deref().or(self.name.as_deref())
    }

    pub fn tech_name(&self) -> Option<&str> {
        self.tech.as_deref().or(self.name.as_deref())
    }
}

/// Age-up completion times recorded at match level, per player.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UptimeRecord {
    pub feudal: Option<u64>,
    pub castle: Option<u64>,
    pub imperial: Option<u64>,
}
