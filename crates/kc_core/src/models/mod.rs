//! Boundary data models.
//!
//! `record` mirrors the shape the external replay decoder hands us and is
//! read-only to the pipeline; `report` is the versioned structure consumers
//! (report writers, prompt builders) depend on.

pub mod record;
pub mod report;
