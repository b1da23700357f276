//! State management: the update policy, batch updates with a shared
//! delta, identical-change grouping, and linear-pattern detection.

use chrono::Duration;
use tracing::{debug, trace};

use chronoshape_core::{
    Point, TemporalFunction, TemporalPolygon, TimeInterval, Timestamp, Vertex, VertexId,
    VertexState,
};

use crate::config::defaults;
use crate::error::{StoreError, StoreResult};

/// Decides how a vertex update is encoded.
///
/// Small moves compress: a delta's magnitude is small and quantizable.
/// Large moves re-anchor with an absolute state, bounding accumulated
/// drift and shortening future resolution walks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdatePolicy {
    /// Whether deltas are considered at all.
    pub use_delta: bool,
    /// Chebyshev distance up to which a move is stored as a delta.
    pub delta_threshold: f64,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self {
            use_delta: true,
            delta_threshold: defaults::DELTA_THRESHOLD,
        }
    }
}

/// Applies the update policy and the history-shaping operations on
/// vertex histories.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateManager {
    policy: UpdatePolicy,
}

impl StateManager {
    pub fn new(policy: UpdatePolicy) -> Self {
        Self { policy }
    }

    #[inline]
    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    /// Move `vertex` to `new_point` effective from `t_change`, encoding
    /// the change per the manager's policy. Returns the appended state.
    pub fn update_vertex(
        &self,
        vertex: &Vertex,
        new_point: Point,
        t_change: Timestamp,
    ) -> VertexState {
        self.update_vertex_with_policy(vertex, new_point, t_change, self.policy)
    }

    /// Move `vertex` to `new_point` with an explicit policy.
    ///
    /// The current position is resolved at `t_change`; when `t_change`
    /// precedes all history the first state's resolved position stands
    /// in. A resolvable position within the delta threshold appends a
    /// delta state, anything else an absolute one. Either way the
    /// appended interval is `[t_change, ∞)` and the previously open
    /// state is closed at `t_change`.
    pub fn update_vertex_with_policy(
        &self,
        vertex: &Vertex,
        new_point: Point,
        t_change: Timestamp,
        policy: UpdatePolicy,
    ) -> VertexState {
        let current = vertex
            .position_at(t_change)
            .or_else(|| vertex.first_position());
        let interval = TimeInterval::open_ended(t_change);

        let state = match current {
            Some(current)
                if policy.use_delta
                    && new_point.chebyshev_distance(&current) <= policy.delta_threshold =>
            {
                trace!(
                    vertex_id = vertex.id(),
                    dx = new_point.x - current.x,
                    dy = new_point.y - current.y,
                    "encoding update as delta"
                );
                VertexState::delta(new_point.x - current.x, new_point.y - current.y, interval)
            }
            _ => {
                trace!(
                    vertex_id = vertex.id(),
                    x = new_point.x,
                    y = new_point.y,
                    "encoding update as absolute anchor"
                );
                VertexState::absolute(new_point, interval)
            }
        };

        vertex.add_state(state.clone());
        state
    }

    /// Apply one shared delta to several vertices at once.
    ///
    /// The first listed vertex owns the group: its state carries the
    /// remaining ids as `grouped_vertex_ids`. The other vertices receive
    /// equivalent delta states without the tag, avoiding redundant
    /// bookkeeping. All intervals are `[t_change, ∞)`.
    pub fn apply_shared_delta(
        &self,
        polygon: &TemporalPolygon,
        vertex_ids: &[VertexId],
        delta: (f64, f64),
        t_change: Timestamp,
    ) -> StoreResult<()> {
        if vertex_ids.is_empty() {
            return Err(StoreError::invalid_argument(
                "batch update needs at least one vertex id",
            ));
        }
        // Validate every id before mutating anything.
        for vid in vertex_ids {
            if !polygon.contains_vertex(*vid) {
                return Err(StoreError::VertexNotFound {
                    polygon_id: polygon.id(),
                    vertex_id: *vid,
                });
            }
        }

        let interval = TimeInterval::open_ended(t_change);
        let (owner, members) = vertex_ids.split_first().expect("non-empty checked above");

        let owner_state = if members.is_empty() {
            VertexState::delta(delta.0, delta.1, interval)
        } else {
            VertexState::delta(delta.0, delta.1, interval).with_group(members.to_vec())
        };
        polygon
            .vertex(*owner)
            .expect("validated above")
            .add_state(owner_state);

        for vid in members {
            polygon
                .vertex(*vid)
                .expect("validated above")
                .add_state(VertexState::delta(delta.0, delta.1, interval));
        }

        debug!(
            polygon_id = %polygon.id(),
            owner = *owner,
            members = members.len(),
            "applied shared delta"
        );
        Ok(())
    }

    /// Group vertices whose states at `t` are equivalent (same flavor,
    /// interval and payload; function states never group). Only groups
    /// of two or more are reported, ordered by the polygon's vertex-id
    /// sequence. Reporting only; histories are not rewritten.
    pub fn detect_identical_changes(
        &self,
        polygon: &TemporalPolygon,
        t: Timestamp,
    ) -> Vec<Vec<VertexId>> {
        let sampled: Vec<(VertexId, VertexState)> = polygon
            .vertex_ids()
            .iter()
            .filter_map(|vid| polygon.vertex(*vid)?.state_at(t).map(|s| (*vid, s)))
            .collect();

        let mut grouped = vec![false; sampled.len()];
        let mut groups = Vec::new();
        for i in 0..sampled.len() {
            if grouped[i] {
                continue;
            }
            let mut group = vec![sampled[i].0];
            for j in (i + 1)..sampled.len() {
                if !grouped[j] && sampled[i].1.equivalent_to(&sampled[j].1) {
                    grouped[j] = true;
                    group.push(sampled[j].0);
                }
            }
            if group.len() >= 2 {
                groups.push(group);
            }
        }
        groups
    }

    /// Check whether a vertex moved linearly across `[t_start, t_end]`.
    ///
    /// Samples `max(3, range / 10 s)` evenly spaced instants, derives a
    /// velocity from the first and last sample, and accepts when no
    /// sample deviates from the implied line by more than `tolerance`
    /// on either axis. Returns the matching closed-form function, or
    /// `None` when any sample is unresolvable or deviates.
    pub fn detect_linear_pattern(
        &self,
        vertex: &Vertex,
        t_start: Timestamp,
        t_end: Timestamp,
        tolerance: f64,
    ) -> Option<TemporalFunction> {
        if t_end <= t_start {
            return None;
        }
        let range = t_end - t_start;
        let sample_count = (range.num_seconds() / defaults::PATTERN_SAMPLE_SPACING_SECS).max(3);

        let mut samples = Vec::with_capacity(sample_count as usize);
        for i in 0..sample_count {
            let offset_ms = range.num_milliseconds() * i / (sample_count - 1);
            let t = t_start + Duration::milliseconds(offset_ms);
            samples.push((t, vertex.position_at(t)?));
        }

        let (t0, p0) = samples[0];
        let (tn, pn) = *samples.last().expect("at least 3 samples");
        let total_secs = (tn - t0).num_milliseconds() as f64 / 1000.0;
        let velocity_x = (pn.x - p0.x) / total_secs;
        let velocity_y = (pn.y - p0.y) / total_secs;

        for (t, p) in &samples {
            let dt = (*t - t0).num_milliseconds() as f64 / 1000.0;
            let predicted = Point::new(p0.x + velocity_x * dt, p0.y + velocity_y * dt);
            if (p.x - predicted.x).abs() > tolerance || (p.y - predicted.y).abs() > tolerance {
                return None;
            }
        }

        debug!(
            vertex_id = vertex.id(),
            velocity_x, velocity_y, "detected linear movement pattern"
        );
        Some(TemporalFunction::Linear {
            reference_point: p0,
            reference_time: t0,
            velocity_x,
            velocity_y,
        })
    }
}
