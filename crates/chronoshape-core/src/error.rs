//! Error types for the chronoshape core data model.

use thiserror::Error;

use crate::types::{Timestamp, VertexId};

/// Errors produced by the core data model.
///
/// All errors surface synchronously to the caller; nothing is retried
/// internally.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// A `TimeInterval` was constructed with `end <= start`.
    #[error("invalid interval: end {end} is not after start {start}")]
    InvalidInterval {
        /// Requested interval start.
        start: Timestamp,
        /// Requested (rejected) interval end.
        end: Timestamp,
    },

    /// Geometric validation rejected a polygon at creation.
    ///
    /// Carries every reason found, not just the first: fewer than three
    /// vertices, a consecutive collinear triple, or a self-intersection.
    #[error("invalid polygon: {}", .reasons.join("; "))]
    InvalidPolygon {
        /// All validation failures, in detection order.
        reasons: Vec<String>,
    },

    /// Reconstruction was requested at a time not covered by at least one
    /// vertex history.
    #[error("no state covers {time} for vertex {vertex_id}")]
    MissingState {
        /// The vertex whose history has no containing state.
        vertex_id: VertexId,
        /// The requested reconstruction time.
        time: Timestamp,
    },

    /// A state was evaluated at a time outside its validity interval.
    #[error("time {time} outside state interval [{start}, {})", .end.map(|e| e.to_string()).unwrap_or_else(|| "open".into()))]
    TimeOutOfRange {
        /// The requested evaluation time.
        time: Timestamp,
        /// Interval start of the state.
        start: Timestamp,
        /// Interval end of the state, if closed.
        end: Option<Timestamp>,
    },

    /// Input data failed a structural check (duplicate vertex ids,
    /// non-finite coordinates, mismatched lengths).
    #[error("validation error: {0}")]
    Validation(String),
}

impl CoreError {
    /// Create a validation error from a message.
    #[inline]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
