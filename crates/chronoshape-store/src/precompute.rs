//! Precomputation table: explicitly marked reconstruction times and
//! their materialized results.
//!
//! First tier consulted on the read path. Marks survive invalidation so
//! a polygon's interesting instants stay registered across updates;
//! only the materialized reconstructions are dropped and re-requested.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, warn};

use chronoshape_core::{CoreResult, Point, PolygonId, Timestamp};

/// A materialized reconstruction with its computation wall-clock time
/// for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputedPolygon {
    pub polygon_id: PolygonId,
    pub time: Timestamp,
    pub points: Vec<Point>,
    pub computed_at: Timestamp,
}

#[derive(Debug, Default)]
struct TableInner {
    /// Times flagged for future materialization, per polygon.
    marks: HashMap<PolygonId, BTreeSet<Timestamp>>,
    /// Materialized reconstructions.
    computed: HashMap<(PolygonId, Timestamp), PrecomputedPolygon>,
}

/// Thread-safe mark/materialize/invalidate table.
///
/// Long work never runs under the write lock: bulk materialization
/// snapshots the mark set first and computes outside, then writes
/// results back one short lock at a time.
#[derive(Debug, Default)]
pub struct PrecomputationTable {
    inner: RwLock<TableInner>,
}

impl PrecomputationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag `t` for future materialization.
    pub fn mark(&self, polygon_id: PolygonId, t: Timestamp) {
        self.inner
            .write()
            .marks
            .entry(polygon_id)
            .or_default()
            .insert(t);
    }

    /// Remove a mark and any materialization for it.
    pub fn unmark(&self, polygon_id: PolygonId, t: Timestamp) {
        let mut inner = self.inner.write();
        if let Some(marks) = inner.marks.get_mut(&polygon_id) {
            marks.remove(&t);
            if marks.is_empty() {
                inner.marks.remove(&polygon_id);
            }
        }
        inner.computed.remove(&(polygon_id, t));
    }

    /// The marked times for a polygon, ascending.
    pub fn marked_times(&self, polygon_id: PolygonId) -> Vec<Timestamp> {
        self.inner
            .read()
            .marks
            .get(&polygon_id)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Store a materialized reconstruction for `(polygon_id, t)`.
    pub fn precompute(&self, polygon_id: PolygonId, t: Timestamp, points: Vec<Point>) {
        let entry = PrecomputedPolygon {
            polygon_id,
            time: t,
            points,
            computed_at: Utc::now(),
        };
        self.inner.write().computed.insert((polygon_id, t), entry);
    }

    /// Copy of the materialized points for `(polygon_id, t)`, if any.
    /// The copy keeps callers from aliasing the stored buffer.
    pub fn try_get(&self, polygon_id: PolygonId, t: Timestamp) -> Option<Vec<Point>> {
        self.inner
            .read()
            .computed
            .get(&(polygon_id, t))
            .map(|entry| entry.points.clone())
    }

    /// Materialize every marked time using `reconstruct`, returning how
    /// many succeeded. Per-time failures are logged and skipped; the
    /// sweep continues. The mark set is snapshotted up front so the
    /// reconstruction work runs without holding any table lock.
    pub fn precompute_all_marked<F>(&self, polygon_id: PolygonId, reconstruct: F) -> usize
    where
        F: Fn(Timestamp) -> CoreResult<Vec<Point>>,
    {
        let marks = self.marked_times(polygon_id);
        let mut materialized = 0;
        for t in marks {
            match reconstruct(t) {
                Ok(points) => {
                    self.precompute(polygon_id, t, points);
                    materialized += 1;
                }
                Err(err) => {
                    warn!(
                        polygon_id = %polygon_id,
                        time = %t,
                        error = %err,
                        "skipping unmaterializable precomputation mark"
                    );
                }
            }
        }
        debug!(
            polygon_id = %polygon_id,
            materialized,
            "precomputation sweep finished"
        );
        materialized
    }

    /// Drop every materialized entry for the polygon, keeping marks.
    pub fn invalidate(&self, polygon_id: PolygonId) -> usize {
        let mut inner = self.inner.write();
        let before = inner.computed.len();
        inner.computed.retain(|(pid, _), _| *pid != polygon_id);
        before - inner.computed.len()
    }

    /// Drop both marks and materialized entries for the polygon.
    pub fn clear(&self, polygon_id: PolygonId) {
        let mut inner = self.inner.write();
        inner.marks.remove(&polygon_id);
        inner.computed.retain(|(pid, _), _| *pid != polygon_id);
    }

    /// Number of materialized entries across all polygons.
    pub fn computed_count(&self) -> usize {
        self.inner.read().computed.len()
    }
}
