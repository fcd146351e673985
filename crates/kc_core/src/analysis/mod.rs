//! # Analysis Pipeline
//!
//! The coaching analytics pipeline, leaves first:
//!
//! - `events` - action classification into unit/build events, market and farm summaries
//! - `timings` - age-up click/completion resolution, first buildings/units
//! - `composition` - time-bucketed cumulative unit composition snapshots
//! - `idle` - town-center idle time and per-building production idle flags
//! - `counters` - opponent strategy-switch and counter-response detection
//! - `apm` - raw per-minute action histogram
//! - `assemble` - viewer selection and final report composition
//!
//! Control flow is strictly sequential; no module depends on a later one.

pub mod apm;
pub mod assemble;
pub mod composition;
pub mod config;
pub mod counters;
pub mod events;
pub mod idle;
pub mod timings;
