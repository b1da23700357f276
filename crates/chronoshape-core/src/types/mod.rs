//! Core domain types for temporal polygons.

mod function;
mod interval;
mod point;
mod polygon;
mod state;
mod vertex;

pub use function::{CoordinateFn, TemporalFunction};
pub use interval::TimeInterval;
pub use point::Point;
pub use polygon::{CoordinateSystem, PolygonId, TemporalPolygon};
pub use state::{StateKind, VertexState};
pub use vertex::Vertex;

use chrono::{DateTime, Utc};

/// Instant on the shared timeline. All histories, intervals and queries
/// use UTC wall-clock timestamps.
pub type Timestamp = DateTime<Utc>;

/// Identifier of a vertex within one polygon. Unique per polygon, not
/// globally.
pub type VertexId = u32;
