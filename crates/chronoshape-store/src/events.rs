//! Change notifications.
//!
//! Listeners run synchronously on the writer's thread, after the state
//! is committed and the caches for the affected polygon are
//! invalidated. Handlers must not call back into mutating operations on
//! the same polygon; reentrancy is not supported.

use std::fmt;
use std::sync::Arc;

use chronoshape_core::{Point, PolygonId, TemporalPolygon, Timestamp, VertexId};

/// What kind of change a [`PolygonChanged`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The polygon was created.
    Created,
    /// The polygon changed in a way not tied to a single vertex
    /// (batch updates).
    Updated,
    /// A single vertex history gained a state; a matching
    /// [`VertexChanged`] is emitted alongside.
    VertexChanged,
    /// The polygon was removed; `polygon` carries its last snapshot.
    Deleted,
}

/// Polygon-level change notification.
#[derive(Clone)]
pub struct PolygonChanged {
    pub polygon_id: PolygonId,
    pub kind: ChangeKind,
    /// The polygon after the change; for `Deleted`, its last snapshot.
    pub polygon: Option<Arc<TemporalPolygon>>,
}

impl fmt::Debug for PolygonChanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolygonChanged")
            .field("polygon_id", &self.polygon_id)
            .field("kind", &self.kind)
            .field("polygon", &self.polygon.as_ref().map(|p| p.id()))
            .finish()
    }
}

/// Vertex-level change notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexChanged {
    pub polygon_id: PolygonId,
    pub vertex_id: VertexId,
    /// Effective time of the appended state.
    pub change_time: Timestamp,
    /// The vertex position at `change_time` after the update.
    pub new_position: Point,
}

/// Observer of store mutations. Default implementations ignore the
/// events, so listeners implement only what they care about.
pub trait ChangeListener: Send + Sync {
    fn on_polygon_changed(&self, _event: &PolygonChanged) {}
    fn on_vertex_changed(&self, _event: &VertexChanged) {}
}
