use crate::ingest::error::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No readings were supplied, at least one reading is required")]
    EmptyInput,

    #[error(transparent)]
    InvalidTimeBound(#[from] TimeBoundError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Reasons a `[start, end]` time window is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TimeBoundError {
    #[error("Time bound is missing or not a number")]
    Missing,

    #[error("Time bound {0} is not a finite number")]
    NotFinite(f64),

    #[error("Invalid time bounds: start {start} is after end {end}")]
    Reversed { start: f64, end: f64 },
}
