//! Error types for the fallible seams (startup, storage, tuning)
//!
//! The simulation itself never fails; everything here is either surfaced to
//! the host at startup or swallowed by the persistence layer.

use thiserror::Error;

/// Fatal startup errors surfaced to the hosting process
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("rendering surface `{0}` not found")]
    SurfaceMissing(String),
    #[error("2D context unavailable on `{0}`")]
    ContextUnavailable(String),
    #[error("no browser window")]
    NoWindow,
    #[error("invalid tuning: {0}")]
    Tuning(#[from] TuningError),
}

/// Raw storage backend failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage quota exceeded writing `{0}`")]
    QuotaExceeded(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Rejected tuning values
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` out of range (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("grid must be at least 2x2 (got {w}x{h})")]
    GridTooSmall { w: i32, h: i32 },
}
