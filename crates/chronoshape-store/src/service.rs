//! The service facade: public operations over the polygon registry,
//! orchestrating state management, queries, the precomputation table
//! and the LRU cache, with synchronous change notifications.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use parking_lot::RwLock;
use tracing::{debug, info, trace};
use uuid::Uuid;

use chronoshape_core::{
    CoordinateSystem, Point, PolygonId, TemporalFunction, TemporalPolygon, Timestamp, VertexId,
};

use crate::cache::{CacheKey, CacheStats, ReconstructionCache};
use crate::codec;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::events::{ChangeKind, ChangeListener, PolygonChanged, VertexChanged};
use crate::geojson::{self, Feature, FeatureCollection, Geometry};
use crate::manager::{StateManager, UpdatePolicy};
use crate::precompute::PrecomputationTable;
use crate::query;

/// In-memory temporal polygon store.
///
/// # Read path
///
/// `get_polygon_at` consults the precomputation table, then the LRU
/// cache, and only then reconstructs: the registry read lock is held
/// just long enough to clone the polygon's `Arc`, so reconstruction
/// runs without blocking writers.
///
/// # Write path
///
/// Creation and removal take the registry write lock. Vertex updates
/// take the read lock (the per-vertex mutex serializes same-vertex
/// writers), mutate the history, invalidate both cache tiers for that
/// polygon only, and then notify listeners on the calling thread.
///
/// Multiple service instances are independent; nothing is global.
pub struct TemporalPolygonService {
    registry: RwLock<HashMap<PolygonId, Arc<TemporalPolygon>>>,
    cache: ReconstructionCache,
    precomputed: PrecomputationTable,
    listeners: RwLock<Vec<Arc<dyn ChangeListener>>>,
    manager: StateManager,
    config: StoreConfig,
}

impl TemporalPolygonService {
    /// Create a service with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default()).expect("default config is valid")
    }

    /// Create a service with an explicit configuration.
    pub fn with_config(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self {
            registry: RwLock::new(HashMap::new()),
            cache: ReconstructionCache::new(config.cache_capacity)?,
            precomputed: PrecomputationTable::new(),
            listeners: RwLock::new(Vec::new()),
            manager: StateManager::new(config.update_policy),
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Register a change listener. Listeners run synchronously on the
    /// writer's thread and must not mutate the same polygon reentrantly.
    pub fn add_listener(&self, listener: Arc<dyn ChangeListener>) {
        self.listeners.write().push(listener);
    }

    // ------------------------------------------------------------------
    // Creation / removal
    // ------------------------------------------------------------------

    /// Create a polygon from its initial ring, assigning natural vertex
    /// ids `0..n` and an absolute state at `t_init` per vertex.
    pub fn create_polygon(
        &self,
        points: &[Point],
        t_init: Timestamp,
        coordinate_system: CoordinateSystem,
    ) -> StoreResult<PolygonId> {
        let polygon = Arc::new(TemporalPolygon::new(
            Uuid::new_v4(),
            points,
            t_init,
            coordinate_system,
        )?);
        let id = polygon.id();
        self.registry.write().insert(id, polygon.clone());

        info!(polygon_id = %id, vertices = points.len(), "created polygon");
        self.notify_polygon(PolygonChanged {
            polygon_id: id,
            kind: ChangeKind::Created,
            polygon: Some(polygon),
        });
        Ok(id)
    }

    /// Import a polygon from its persisted JSON document.
    pub fn import_polygon(&self, json: &str) -> StoreResult<PolygonId> {
        let polygon = Arc::new(codec::from_json_str(json)?);
        let id = polygon.id();
        if self.registry.read().contains_key(&id) {
            return Err(StoreError::invalid_argument(format!(
                "polygon {id} already registered"
            )));
        }
        self.registry.write().insert(id, polygon.clone());

        info!(polygon_id = %id, "imported polygon");
        self.notify_polygon(PolygonChanged {
            polygon_id: id,
            kind: ChangeKind::Created,
            polygon: Some(polygon),
        });
        Ok(id)
    }

    /// Serialize a registered polygon to its JSON document.
    pub fn export_polygon(&self, polygon_id: PolygonId) -> StoreResult<String> {
        let polygon = self.get_polygon(polygon_id)?;
        codec::to_json_string(&polygon)
    }

    /// Remove a polygon, dropping its cache and precomputation entries.
    pub fn remove_polygon(&self, polygon_id: PolygonId) -> StoreResult<()> {
        let removed = self
            .registry
            .write()
            .remove(&polygon_id)
            .ok_or(StoreError::PolygonNotFound(polygon_id))?;

        self.cache.invalidate_polygon(polygon_id);
        self.precomputed.clear(polygon_id);

        info!(polygon_id = %polygon_id, "removed polygon");
        self.notify_polygon(PolygonChanged {
            polygon_id,
            kind: ChangeKind::Deleted,
            polygon: Some(removed),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// The registered polygon behind `polygon_id`.
    pub fn get_polygon(&self, polygon_id: PolygonId) -> StoreResult<Arc<TemporalPolygon>> {
        self.registry
            .read()
            .get(&polygon_id)
            .cloned()
            .ok_or(StoreError::PolygonNotFound(polygon_id))
    }

    /// All registered polygons, unordered.
    pub fn get_all_polygons(&self) -> Vec<Arc<TemporalPolygon>> {
        self.registry.read().values().cloned().collect()
    }

    /// The polygon's reconstruction at `t`: precomputation table first,
    /// then the LRU cache, then a fresh reconstruction that backfills
    /// the cache.
    pub fn get_polygon_at(&self, polygon_id: PolygonId, t: Timestamp) -> StoreResult<Vec<Point>> {
        if let Some(points) = self.precomputed.try_get(polygon_id, t) {
            trace!(polygon_id = %polygon_id, time = %t, "precomputation hit");
            return Ok(points);
        }
        let key = CacheKey { polygon_id, time: t };
        if let Some(points) = self.cache.get(&key) {
            trace!(polygon_id = %polygon_id, time = %t, "reconstruction cache hit");
            return Ok(points);
        }

        let polygon = self.get_polygon(polygon_id)?;
        let points = polygon.reconstruct_at(t)?;
        self.cache.put(key, points.clone());
        trace!(polygon_id = %polygon_id, time = %t, "reconstructed and cached");
        Ok(points)
    }

    /// One vertex's resolved position at `t`.
    pub fn get_vertex_position(
        &self,
        polygon_id: PolygonId,
        vertex_id: VertexId,
        t: Timestamp,
    ) -> StoreResult<Point> {
        let polygon = self.get_polygon(polygon_id)?;
        let vertex = polygon.vertex(vertex_id).ok_or(StoreError::VertexNotFound {
            polygon_id,
            vertex_id,
        })?;
        vertex
            .position_at(t)
            .ok_or_else(|| StoreError::Core(chronoshape_core::CoreError::MissingState {
                vertex_id,
                time: t,
            }))
    }

    // ------------------------------------------------------------------
    // Vertex updates
    // ------------------------------------------------------------------

    /// Move one vertex using the configured update policy.
    pub fn update_vertex(
        &self,
        polygon_id: PolygonId,
        vertex_id: VertexId,
        new_point: Point,
        t_change: Timestamp,
    ) -> StoreResult<()> {
        self.update_vertex_with_policy(
            polygon_id,
            vertex_id,
            new_point,
            t_change,
            self.manager.policy(),
        )
    }

    /// Move one vertex with an explicit delta-vs-absolute policy.
    pub fn update_vertex_with_policy(
        &self,
        polygon_id: PolygonId,
        vertex_id: VertexId,
        new_point: Point,
        t_change: Timestamp,
        policy: UpdatePolicy,
    ) -> StoreResult<()> {
        if !new_point.is_finite() {
            return Err(StoreError::invalid_argument(format!(
                "vertex position must be finite, got {new_point}"
            )));
        }
        let polygon = self.get_polygon(polygon_id)?;
        let vertex = polygon.vertex(vertex_id).ok_or(StoreError::VertexNotFound {
            polygon_id,
            vertex_id,
        })?;

        self.manager
            .update_vertex_with_policy(vertex, new_point, t_change, policy);
        self.invalidate_tiers(polygon_id);

        debug!(
            polygon_id = %polygon_id,
            vertex_id,
            time = %t_change,
            "updated vertex"
        );
        self.notify_vertex(VertexChanged {
            polygon_id,
            vertex_id,
            change_time: t_change,
            new_position: new_point,
        });
        self.notify_polygon(PolygonChanged {
            polygon_id,
            kind: ChangeKind::VertexChanged,
            polygon: Some(polygon),
        });
        Ok(())
    }

    /// Apply one delta to several vertices at `t_change`. The first
    /// listed vertex's state carries the remaining ids as its group.
    pub fn update_vertices_with_same_delta(
        &self,
        polygon_id: PolygonId,
        vertex_ids: &[VertexId],
        delta: (f64, f64),
        t_change: Timestamp,
    ) -> StoreResult<()> {
        if !(delta.0.is_finite() && delta.1.is_finite()) {
            return Err(StoreError::invalid_argument(format!(
                "delta must be finite, got ({}, {})",
                delta.0, delta.1
            )));
        }
        let polygon = self.get_polygon(polygon_id)?;
        self.manager
            .apply_shared_delta(&polygon, vertex_ids, delta, t_change)?;
        self.invalidate_tiers(polygon_id);

        debug!(
            polygon_id = %polygon_id,
            vertices = vertex_ids.len(),
            time = %t_change,
            "applied batch delta"
        );
        for vertex_id in vertex_ids {
            let new_position = polygon
                .vertex(*vertex_id)
                .and_then(|v| v.position_at(t_change));
            if let Some(new_position) = new_position {
                self.notify_vertex(VertexChanged {
                    polygon_id,
                    vertex_id: *vertex_id,
                    change_time: t_change,
                    new_position,
                });
            }
        }
        self.notify_polygon(PolygonChanged {
            polygon_id,
            kind: ChangeKind::Updated,
            polygon: Some(polygon),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Temporal queries
    // ------------------------------------------------------------------

    /// Polygons with at least one state interval intersecting
    /// `[t1, t2]` on every vertex.
    pub fn polygons_in_time_range(
        &self,
        t1: Timestamp,
        t2: Timestamp,
    ) -> StoreResult<Vec<Arc<TemporalPolygon>>> {
        validate_range(t1, t2)?;
        Ok(self
            .get_all_polygons()
            .into_iter()
            .filter(|p| query::exists_in_range(p, t1, t2))
            .collect())
    }

    /// Polygons that resolve at both range endpoints. Interior gaps are
    /// not detected (endpoint check by design).
    pub fn polygons_for_entire_time_range(
        &self,
        t1: Timestamp,
        t2: Timestamp,
    ) -> StoreResult<Vec<Arc<TemporalPolygon>>> {
        validate_range(t1, t2)?;
        Ok(self
            .get_all_polygons()
            .into_iter()
            .filter(|p| query::exists_for_entire_range(p, t1, t2))
            .collect())
    }

    /// Sampled reconstructions across `[t1, t2]`: fixed-step when
    /// `step` is given, change-time driven otherwise. Unresolvable
    /// sample times are omitted.
    pub fn polygon_history(
        &self,
        polygon_id: PolygonId,
        t1: Timestamp,
        t2: Timestamp,
        step: Option<Duration>,
    ) -> StoreResult<Vec<(Timestamp, Vec<Point>)>> {
        validate_range(t1, t2)?;
        if let Some(step) = step {
            if step <= Duration::zero() {
                return Err(StoreError::invalid_argument(
                    "history step must be positive",
                ));
            }
        }
        let polygon = self.get_polygon(polygon_id)?;
        Ok(query::history(&polygon, t1, t2, step))
    }

    /// The change times of a polygon within `[t1, t2]`, bounds included.
    pub fn change_times_in_range(
        &self,
        polygon_id: PolygonId,
        t1: Timestamp,
        t2: Timestamp,
    ) -> StoreResult<Vec<Timestamp>> {
        validate_range(t1, t2)?;
        let polygon = self.get_polygon(polygon_id)?;
        Ok(query::change_times_in_range(&polygon, t1, t2))
    }

    // ------------------------------------------------------------------
    // Precomputation
    // ------------------------------------------------------------------

    /// Flag `t` for precomputation of the polygon's reconstruction.
    pub fn mark_time_for_precomputation(
        &self,
        polygon_id: PolygonId,
        t: Timestamp,
    ) -> StoreResult<()> {
        self.get_polygon(polygon_id)?;
        self.precomputed.mark(polygon_id, t);
        Ok(())
    }

    /// Flag several times at once.
    pub fn mark_times_for_precomputation(
        &self,
        polygon_id: PolygonId,
        times: &[Timestamp],
    ) -> StoreResult<()> {
        if times.is_empty() {
            return Err(StoreError::invalid_argument(
                "no times given to mark for precomputation",
            ));
        }
        self.get_polygon(polygon_id)?;
        for t in times {
            self.precomputed.mark(polygon_id, *t);
        }
        Ok(())
    }

    /// Remove a precomputation mark (and its materialization, if any).
    pub fn unmark_time_for_precomputation(
        &self,
        polygon_id: PolygonId,
        t: Timestamp,
    ) -> StoreResult<()> {
        self.get_polygon(polygon_id)?;
        self.precomputed.unmark(polygon_id, t);
        Ok(())
    }

    /// Materialize every marked time for the polygon, returning how
    /// many succeeded. Per-time reconstruction failures are skipped.
    pub fn precompute_marked_times(&self, polygon_id: PolygonId) -> StoreResult<usize> {
        let polygon = self.get_polygon(polygon_id)?;
        Ok(self
            .precomputed
            .precompute_all_marked(polygon_id, |t| polygon.reconstruct_at(t)))
    }

    /// Materialize one reconstruction immediately, without a mark.
    pub fn precompute_polygon_at(&self, polygon_id: PolygonId, t: Timestamp) -> StoreResult<()> {
        let polygon = self.get_polygon(polygon_id)?;
        let points = polygon.reconstruct_at(t)?;
        self.precomputed.precompute(polygon_id, t, points);
        Ok(())
    }

    /// The times currently marked for precomputation, ascending.
    pub fn get_precomputation_times(&self, polygon_id: PolygonId) -> StoreResult<Vec<Timestamp>> {
        self.get_polygon(polygon_id)?;
        Ok(self.precomputed.marked_times(polygon_id))
    }

    /// Drop the polygon's marks and materializations.
    pub fn clear_precomputations(&self, polygon_id: PolygonId) -> StoreResult<()> {
        self.get_polygon(polygon_id)?;
        self.precomputed.clear(polygon_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Analysis
    // ------------------------------------------------------------------

    /// Group vertices whose states at `t` are equivalent; only groups
    /// of two or more are reported.
    pub fn detect_identical_changes(
        &self,
        polygon_id: PolygonId,
        t: Timestamp,
    ) -> StoreResult<Vec<Vec<VertexId>>> {
        let polygon = self.get_polygon(polygon_id)?;
        Ok(self.manager.detect_identical_changes(&polygon, t))
    }

    /// Fit a linear movement function to a vertex across `[t1, t2]`
    /// using the configured tolerance.
    pub fn detect_linear_pattern(
        &self,
        polygon_id: PolygonId,
        vertex_id: VertexId,
        t1: Timestamp,
        t2: Timestamp,
    ) -> StoreResult<Option<TemporalFunction>> {
        validate_range(t1, t2)?;
        let polygon = self.get_polygon(polygon_id)?;
        let vertex = polygon.vertex(vertex_id).ok_or(StoreError::VertexNotFound {
            polygon_id,
            vertex_id,
        })?;
        Ok(self
            .manager
            .detect_linear_pattern(vertex, t1, t2, self.config.pattern_tolerance))
    }

    // ------------------------------------------------------------------
    // GeoJSON
    // ------------------------------------------------------------------

    /// The polygon at `t` as a bare GeoJSON geometry.
    pub fn to_geojson(&self, polygon_id: PolygonId, t: Timestamp) -> StoreResult<Geometry> {
        let ring = self.get_polygon_at(polygon_id, t)?;
        geojson::geometry_from_ring(&ring)
    }

    /// The polygon at `t` as a GeoJSON feature tagged with its id and
    /// the reconstruction time.
    pub fn to_geojson_feature(&self, polygon_id: PolygonId, t: Timestamp) -> StoreResult<Feature> {
        let ring = self.get_polygon_at(polygon_id, t)?;
        geojson::feature_from_ring(&ring, polygon_id, t)
    }

    /// Several `(polygon, time)` reconstructions as one GeoJSON
    /// feature collection.
    pub fn to_geojson_feature_collection(
        &self,
        pairs: &[(PolygonId, Timestamp)],
    ) -> StoreResult<FeatureCollection> {
        let features = pairs
            .iter()
            .map(|(pid, t)| self.to_geojson_feature(*pid, *t))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(geojson::feature_collection(features))
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Counters and occupancy of the LRU reconstruction cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Integrity findings (gaps, overlaps, inverted intervals) across
    /// every vertex of the polygon. Empty means seamless histories.
    pub fn validate_polygon_integrity(&self, polygon_id: PolygonId) -> StoreResult<Vec<String>> {
        let polygon = self.get_polygon(polygon_id)?;
        Ok(polygon
            .vertices_in_order()
            .flat_map(|v| v.integrity_report())
            .collect())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Drop both cache tiers' entries for one polygon. Marks survive so
    /// re-materialization can be re-requested.
    fn invalidate_tiers(&self, polygon_id: PolygonId) {
        let cached = self.cache.invalidate_polygon(polygon_id);
        let precomputed = self.precomputed.invalidate(polygon_id);
        trace!(
            polygon_id = %polygon_id,
            cached,
            precomputed,
            "invalidated cache tiers"
        );
    }

    fn notify_polygon(&self, event: PolygonChanged) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener.on_polygon_changed(&event);
        }
    }

    fn notify_vertex(&self, event: VertexChanged) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener.on_vertex_changed(&event);
        }
    }
}

impl Default for TemporalPolygonService {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_range(t1: Timestamp, t2: Timestamp) -> StoreResult<()> {
    if t2 < t1 {
        return Err(StoreError::invalid_argument(format!(
            "reversed time range: {t2} precedes {t1}"
        )));
    }
    Ok(())
}
