//! Vertex position states: absolute anchors, relative deltas, and
//! temporal functions.

use crate::error::{CoreError, CoreResult};
use crate::types::{Point, TemporalFunction, TimeInterval, Timestamp, VertexId};

/// How a state encodes its position.
#[derive(Debug, Clone, PartialEq)]
pub enum StateKind {
    /// The vertex sits at `point` across the whole interval. Acts as a
    /// checkpoint that resets delta accumulation.
    Absolute(Point),

    /// The vertex sits at the previously-resolved position plus
    /// `(dx, dy)` across the interval.
    Delta { dx: f64, dy: f64 },

    /// The vertex follows a closed-form function of time across the
    /// interval. Self-contained, so it also anchors later deltas.
    Function(TemporalFunction),
}

/// One entry in a vertex history: a position encoding valid over a
/// half-open time interval, optionally tagged with the other vertices
/// that received the same change in a batch update.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexState {
    pub interval: TimeInterval,
    pub kind: StateKind,
    /// For the owner of a batch update: the remaining vertex ids that
    /// received an equivalent state. Not part of state equivalence.
    pub grouped_vertex_ids: Option<Vec<VertexId>>,
}

impl VertexState {
    /// An absolute anchor state.
    #[inline]
    pub fn absolute(point: Point, interval: TimeInterval) -> Self {
        Self {
            interval,
            kind: StateKind::Absolute(point),
            grouped_vertex_ids: None,
        }
    }

    /// A relative delta state.
    #[inline]
    pub fn delta(dx: f64, dy: f64, interval: TimeInterval) -> Self {
        Self {
            interval,
            kind: StateKind::Delta { dx, dy },
            grouped_vertex_ids: None,
        }
    }

    /// A function state.
    #[inline]
    pub fn function(function: TemporalFunction, interval: TimeInterval) -> Self {
        Self {
            interval,
            kind: StateKind::Function(function),
            grouped_vertex_ids: None,
        }
    }

    /// Attach the grouped-vertex tag (builder style).
    pub fn with_group(mut self, vertex_ids: Vec<VertexId>) -> Self {
        self.grouped_vertex_ids = Some(vertex_ids);
        self
    }

    #[inline]
    pub fn is_absolute(&self) -> bool {
        matches!(self.kind, StateKind::Absolute(_))
    }

    #[inline]
    pub fn is_delta(&self) -> bool {
        matches!(self.kind, StateKind::Delta { .. })
    }

    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self.kind, StateKind::Function(_))
    }

    /// Copy of this state with its interval closed at `end`, preserving
    /// flavor, payload and group tag.
    pub fn close_at(&self, end: Timestamp) -> Self {
        Self {
            interval: self.interval.close_at(end),
            kind: self.kind.clone(),
            grouped_vertex_ids: self.grouped_vertex_ids.clone(),
        }
    }

    /// Self-resolved position at `t` for states that carry one.
    ///
    /// Absolute and function states resolve directly; delta states
    /// return `Ok(None)` because they only resolve against the history
    /// they live in. Evaluation outside the validity interval is
    /// `TimeOutOfRange`.
    pub fn position_at(&self, t: Timestamp) -> CoreResult<Option<Point>> {
        if !self.interval.contains(t) {
            return Err(CoreError::TimeOutOfRange {
                time: t,
                start: self.interval.start,
                end: self.interval.end,
            });
        }
        Ok(match &self.kind {
            StateKind::Absolute(point) => Some(*point),
            StateKind::Function(function) => Some(function.position_at(t)),
            StateKind::Delta { .. } => None,
        })
    }

    /// Equivalence for identical-change grouping: same flavor, same
    /// interval, same absolute point or same delta. Function states are
    /// never equivalent, and the group tag is ignored.
    pub fn equivalent_to(&self, other: &VertexState) -> bool {
        if self.interval != other.interval {
            return false;
        }
        match (&self.kind, &other.kind) {
            (StateKind::Absolute(a), StateKind::Absolute(b)) => a == b,
            (StateKind::Delta { dx: ax, dy: ay }, StateKind::Delta { dx: bx, dy: by }) => {
                ax == bx && ay == by
            }
            _ => false,
        }
    }
}
