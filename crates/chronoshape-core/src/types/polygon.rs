//! The temporal polygon aggregate.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::geometry;
use crate::types::{Point, TimeInterval, Timestamp, Vertex, VertexId, VertexState};

/// Identifier of a polygon (UUID v4).
pub type PolygonId = Uuid;

/// Coordinate system the polygon's points live in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// Plain planar coordinates.
    #[default]
    Cartesian,
    /// Points are (longitude, latitude) degrees; conversion to local
    /// Cartesian goes through [`crate::coords`].
    Geographic,
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cartesian => write!(f, "Cartesian"),
            Self::Geographic => write!(f, "Geographic"),
        }
    }
}

/// A polygon whose vertex-id sequence is fixed at creation while every
/// vertex's position history evolves independently.
///
/// The id sequence is the single source of vertex order; the id→vertex
/// map holds exactly the ids in that sequence. Only vertex histories
/// mutate after creation (through the interior mutex each [`Vertex`]
/// carries), so the polygon itself can be shared freely behind an `Arc`.
#[derive(Debug)]
pub struct TemporalPolygon {
    id: PolygonId,
    vertex_ids: Vec<VertexId>,
    vertices: HashMap<VertexId, Vertex>,
    coordinate_system: CoordinateSystem,
}

impl TemporalPolygon {
    /// Create a polygon with natural vertex ids `0..n` and an absolute
    /// initial state at `t_init` per vertex.
    ///
    /// Runs geometric validation on the initial ring: at least three
    /// vertices, no consecutive collinear triple, no self-intersection.
    pub fn new(
        id: PolygonId,
        points: &[Point],
        t_init: Timestamp,
        coordinate_system: CoordinateSystem,
    ) -> CoreResult<Self> {
        let ids: Vec<VertexId> = (0..points.len() as u32).collect();
        Self::with_vertex_ids(id, ids, points, t_init, coordinate_system)
    }

    /// Create a polygon with an explicit id sequence.
    pub fn with_vertex_ids(
        id: PolygonId,
        vertex_ids: Vec<VertexId>,
        points: &[Point],
        t_init: Timestamp,
        coordinate_system: CoordinateSystem,
    ) -> CoreResult<Self> {
        if vertex_ids.len() != points.len() {
            return Err(CoreError::validation(format!(
                "{} vertex ids for {} points",
                vertex_ids.len(),
                points.len()
            )));
        }
        let reasons = geometry::validate_ring(points);
        if !reasons.is_empty() {
            return Err(CoreError::InvalidPolygon { reasons });
        }

        let mut vertices = HashMap::with_capacity(vertex_ids.len());
        for (vid, point) in vertex_ids.iter().zip(points) {
            let state = VertexState::absolute(*point, TimeInterval::open_ended(t_init));
            if vertices
                .insert(*vid, Vertex::with_initial_state(*vid, state))
                .is_some()
            {
                return Err(CoreError::validation(format!("duplicate vertex id {vid}")));
            }
        }
        Ok(Self {
            id,
            vertex_ids,
            vertices,
            coordinate_system,
        })
    }

    /// Rebuild a polygon from already-shaped vertex histories (the
    /// persistence path). Checks the structural invariants (≥ 3
    /// vertices, id sequence ↔ vertex map bijection) but not geometry:
    /// the shape varies with time, so the initial-ring validation does
    /// not apply to a restored history.
    pub fn from_parts(
        id: PolygonId,
        vertex_ids: Vec<VertexId>,
        vertices: HashMap<VertexId, Vertex>,
        coordinate_system: CoordinateSystem,
    ) -> CoreResult<Self> {
        if vertex_ids.len() < 3 {
            return Err(CoreError::InvalidPolygon {
                reasons: vec![format!(
                    "polygon needs at least 3 vertices, got {}",
                    vertex_ids.len()
                )],
            });
        }
        let mut seen = std::collections::HashSet::with_capacity(vertex_ids.len());
        for vid in &vertex_ids {
            if !seen.insert(*vid) {
                return Err(CoreError::validation(format!("duplicate vertex id {vid}")));
            }
            if !vertices.contains_key(vid) {
                return Err(CoreError::validation(format!(
                    "vertex id {vid} listed but carries no history"
                )));
            }
        }
        if vertices.len() != vertex_ids.len() {
            return Err(CoreError::validation(format!(
                "{} vertex histories for {} listed ids",
                vertices.len(),
                vertex_ids.len()
            )));
        }
        Ok(Self {
            id,
            vertex_ids,
            vertices,
            coordinate_system,
        })
    }

    #[inline]
    pub fn id(&self) -> PolygonId {
        self.id
    }

    /// The immutable vertex order.
    #[inline]
    pub fn vertex_ids(&self) -> &[VertexId] {
        &self.vertex_ids
    }

    #[inline]
    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_ids.len()
    }

    #[inline]
    pub fn contains_vertex(&self, vertex_id: VertexId) -> bool {
        self.vertices.contains_key(&vertex_id)
    }

    /// Look up a vertex by id.
    #[inline]
    pub fn vertex(&self, vertex_id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&vertex_id)
    }

    /// Vertices in id-sequence order.
    pub fn vertices_in_order(&self) -> impl Iterator<Item = &Vertex> {
        self.vertex_ids.iter().map(move |vid| &self.vertices[vid])
    }

    /// Resolve every vertex at `t`, in id-sequence order.
    ///
    /// Fails with [`CoreError::MissingState`] naming the first vertex
    /// whose history does not cover `t`. The returned ring is open; the
    /// GeoJSON emitter appends the closing vertex.
    pub fn reconstruct_at(&self, t: Timestamp) -> CoreResult<Vec<Point>> {
        let mut points = Vec::with_capacity(self.vertex_ids.len());
        for vid in &self.vertex_ids {
            let vertex = &self.vertices[vid];
            match vertex.position_at(t) {
                Some(p) => points.push(p),
                None => {
                    return Err(CoreError::MissingState {
                        vertex_id: *vid,
                        time: t,
                    })
                }
            }
        }
        Ok(points)
    }
}

// Equality compares identity, topology, coordinate system and history
// content; used by round-trip tests.
impl PartialEq for TemporalPolygon {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.vertex_ids == other.vertex_ids
            && self.coordinate_system == other.coordinate_system
            && self.vertices == other.vertices
    }
}
