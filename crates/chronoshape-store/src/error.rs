//! Error types for the store layer.

use thiserror::Error;

use chronoshape_core::{CoreError, PolygonId, VertexId};

/// Errors surfaced by store operations.
///
/// Core model errors pass through transparently; the store adds lookup
/// failures, argument validation and serialization.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No polygon registered under the id.
    #[error("polygon not found: {0}")]
    PolygonNotFound(PolygonId),

    /// The polygon exists but has no vertex with the id.
    #[error("vertex {vertex_id} not found in polygon {polygon_id}")]
    VertexNotFound {
        polygon_id: PolygonId,
        vertex_id: VertexId,
    },

    /// Caller-supplied input rejected before touching any state:
    /// empty id lists, reversed time ranges, non-positive cache
    /// capacity, non-finite thresholds.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Document encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Error from the core data model.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    /// Create an invalid-argument error from a message.
    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a serialization error from a message.
    #[inline]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
