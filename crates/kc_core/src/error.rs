use thiserror::Error;

/// Errors that abort an analysis outright.
///
/// Degraded-data conditions (missing object ids, unknown unit names,
/// timestampless actions) are deliberately not represented here; they are
/// tolerated by the pipeline and surfaced as report warnings.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No players found in replay data")]
    NoPlayers,

    #[error("Unsupported time format: {0:?}")]
    InvalidDuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
