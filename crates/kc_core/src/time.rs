//! Clock coercion and formatting helpers.
//!
//! Replay decoders are inconsistent about time representation: some emit
//! whole seconds, some fractional seconds, some `"H:MM:SS"` / `"M:SS"`
//! strings. Everything downstream works in whole seconds.

use crate::error::{CoreError, Result};
use crate::models::record::DurationValue;

/// Coerce a decoder-supplied duration into whole seconds.
///
/// Accepts numeric values (truncated, clamped at zero), numeric strings,
/// and `M:SS` / `H:MM:SS` clock strings. An empty string coerces to zero.
/// Any other format is a fatal input error.
pub fn coerce_seconds(value: &DurationValue) -> Result<u64> {
    match value {
        DurationValue::Seconds(secs) => Ok(secs.max(0.0) as u64),
        DurationValue::Clock(text) => coerce_clock(text),
    }
}

fn coerce_clock(text: &str) -> Result<u64> {
    let stripped = text.trim();
    if stripped.is_empty() {
        return Ok(0);
    }
    if let Ok(secs) = stripped.parse::<f64>() {
        return Ok(secs.max(0.0) as u64);
    }
    let parts: Vec<&str> = stripped.split(':').collect();
    let parsed: Option<u64> = match parts.as_slice() {
        [minutes, seconds] => clock_parts(0, minutes, seconds),
        [hours, minutes, seconds] => {
            let hours = hours.parse::<u64>().ok();
            hours.and_then(|h| clock_parts(h, minutes, seconds))
        }
        _ => None,
    };
    parsed.ok_or_else(|| CoreError::InvalidDuration(text.to_string()))
}

fn clock_parts(hours: u64, minutes: &str, seconds: &str) -> Option<u64> {
    let minutes = minutes.parse::<u64>().ok()?;
    let seconds = seconds.parse::<f64>().ok()?;
    if seconds < 0.0 {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds as u64)
}

/// Format whole seconds as `M:SS` for human-facing report fields.
pub fn format_seconds(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// `format_seconds` lifted over optional values.
pub fn format_opt_seconds(seconds: Option<u64>) -> Option<String> {
    seconds.map(format_seconds)
}
