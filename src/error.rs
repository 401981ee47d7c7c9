//! Error type for contour construction and updates.
//!
//! Out-of-range indices are clamped, never reported. The only failure a
//! well-formed caller can hit is a range whose end precedes its start.

use thiserror::Error;

/// Errors produced by the contour engine.
#[derive(Debug, Error)]
pub enum ContourError {
    /// Converted end index precedes the converted start index.
    #[error("start index {start} of line is greater than the end index {end}")]
    RangeOrder { start: i64, end: i64 },

    /// Engraving rules that cannot drive a sampling grid.
    #[error("invalid engraving rules: {0}")]
    InvalidRules(String),

    /// Fixture or rules JSON could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ContourError>;
