//! Chronoshape Core Library
//!
//! Data model for temporal polygons: two-dimensional polygons whose
//! topology is fixed at creation but whose vertex positions evolve over
//! time. Each vertex carries an ordered history of position states valid
//! over half-open time intervals; the polygon's shape at any instant is
//! reconstructed by resolving every vertex history at that instant.
//!
//! # Architecture
//!
//! This crate defines:
//! - Value types (`Point`, `TimeInterval`, `TemporalFunction`)
//! - The state model (`VertexState`, delta-encoded with absolute anchors)
//! - Vertex histories with binary-search lookup and cumulative delta
//!   resolution (`Vertex`)
//! - The polygon aggregate and whole-shape reconstruction
//!   (`TemporalPolygon`)
//! - Geometry utilities and local coordinate conversion
//! - Error types and result alias
//!
//! Storage, caching, querying and serialization live in
//! `chronoshape-store`; this crate stays synchronous and lock-light (the
//! only lock is the per-vertex state mutex).

pub mod coords;
pub mod error;
pub mod geometry;
pub mod types;

// Re-exports for convenience
pub use error::{CoreError, CoreResult};
pub use types::{
    CoordinateFn, CoordinateSystem, Point, PolygonId, StateKind, TemporalFunction,
    TemporalPolygon, TimeInterval, Timestamp, Vertex, VertexId, VertexState,
};
