//! Central tuning configuration for the analysis heuristics.
//!
//! The detection thresholds are heuristic reference values with no derived
//! ground truth behind them; they are grouped here so nothing else in the
//! tree hard-codes them.

use serde::{Deserialize, Serialize};

/// Tunable thresholds for the analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Composition snapshot bucket interval in seconds.
    pub snapshot_interval: u64,
    /// Nominal villager production cycle at a town center, seconds.
    pub tc_cycle_seconds: u64,
    /// Slack on top of the cycle before a gap counts as idle, seconds.
    pub tc_idle_tolerance: u64,
    /// Production gap flagged as idle for military buildings, seconds.
    pub production_idle_threshold: u64,
    /// Minimum count increase between consecutive opponent snapshots for a
    /// strategy switch.
    pub switch_min_delta: u32,
    /// Maximum prior count for the increase to read as "new or resurgent"
    /// rather than gradual reinforcement.
    pub switch_max_prior: u32,
    /// Counter-line count that qualifies as a response.
    pub counter_min_count: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 300,
            tc_cycle_seconds: 25,
            tc_idle_tolerance: 5,
            production_idle_threshold: 60,
            switch_min_delta: 5,
            switch_max_prior: 2,
            counter_min_count: 3,
        }
    }
}
