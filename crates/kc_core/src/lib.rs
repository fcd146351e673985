//! # kc_core - AoE2 Replay Coaching Analytics
//!
//! Turns a serialized Age of Empires II match record (produced by an
//! external replay decoder) into time-indexed coaching metrics: age-up
//! timings, first building/unit timestamps, unit-composition snapshots,
//! town-center and production idle detection, and opponent strategy-switch
//! / counter-response detection.
//!
//! ## Pipeline
//! 1. Classify raw actions into unit/build events (`analysis::events`)
//! 2. Resolve age-up and first-building/unit timings (`analysis::timings`)
//! 3. Snapshot unit composition over the match timeline (`analysis::composition`)
//! 4. Detect town-center and production idle time (`analysis::idle`)
//! 5. Correlate opponent switches with counter responses (`analysis::counters`)
//! 6. Assemble everything into one `CoachReport` (`analysis::assemble`)
//!
//! The pipeline is a pure function of the input record: synchronous,
//! single-threaded, no state kept between runs. Degraded input (missing
//! object ids, unknown unit names, timestampless actions) never aborts an
//! analysis; it is surfaced through report warnings instead.

pub mod analysis;
pub mod data;
pub mod error;
pub mod models;
pub mod time;

pub use analysis::assemble::{analyze_replay, find_players, AnalyzeOptions};
pub use analysis::config::AnalysisConfig;
pub use error::{CoreError, Result};
pub use models::record::MatchRecord;
pub use models::report::CoachReport;
