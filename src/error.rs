//! Unified error handling for the trail engine.
//!
//! Point-local problems (a trkpt missing its coordinates, a malformed
//! elevation) are recovered during parsing and never surface here; this module
//! covers the failures a caller must branch on.

use thiserror::Error;

/// Unified error type for trail engine operations.
#[derive(Debug, Clone, Error)]
pub enum TrailError {
    /// The whole document could not be read as GPX. Distinct from a
    /// successfully parsed trail with zero valid points.
    #[error("Unreadable track document '{source_id}': {message}")]
    UnreadableDocument { source_id: String, message: String },

    /// A session-lifecycle call arrived in the wrong state.
    #[error("Cannot {operation} while session is {state}")]
    InvalidSessionState {
        operation: &'static str,
        state: String,
    },

    /// A navigation session cannot start without a planned route.
    #[error("Planned route has no points")]
    EmptyRoute,
}

/// Result type alias for trail engine operations.
pub type Result<T> = std::result::Result<T, TrailError>;
