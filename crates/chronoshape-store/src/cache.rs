//! Bounded LRU cache for reconstructions, with a reverse index for
//! per-polygon invalidation.
//!
//! Second tier on the read path. Reconstruction is the hot read;
//! writes are rare but must not leak stale entries for the mutated
//! polygon, so invalidation drops exactly that polygon's keys and
//! leaves cached reads for unrelated polygons intact.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use linked_hash_map::LinkedHashMap;
use parking_lot::Mutex;
use tracing::trace;

use chronoshape_core::{Point, PolygonId, Timestamp};

use crate::error::{StoreError, StoreResult};

/// Key of one cached reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub polygon_id: PolygonId,
    pub time: Timestamp,
}

/// Thread-safe cache counters with relaxed ordering; exact consistency
/// is not required for monitoring.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
    pub invalidations: AtomicU64,
}

impl CacheMetrics {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    fn record_invalidations(&self, n: u64) {
        self.invalidations.fetch_add(n, Ordering::Relaxed);
    }
}

/// Point-in-time snapshot of the metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub invalidations: u64,
    pub len: usize,
    pub capacity: usize,
}

/// LRU map `(polygon_id, time) → reconstruction`.
///
/// The [`LinkedHashMap`] is the hash index over a recency list: a hit
/// refreshes the entry to the back, inserts evict from the front on
/// overflow. A reverse index `polygon_id → keys` makes invalidation of
/// one polygon O(entries for that polygon) instead of a full scan.
///
/// # Locking
///
/// The entry map and the reverse index have separate mutexes; the
/// reverse index lock is only ever taken inside the entry lock's scope,
/// so the order is fixed and cannot deadlock.
#[derive(Debug)]
pub struct ReconstructionCache {
    entries: Mutex<LinkedHashMap<CacheKey, Vec<Point>>>,
    by_polygon: Mutex<HashMap<PolygonId, HashSet<CacheKey>>>,
    capacity: usize,
    metrics: CacheMetrics,
}

impl ReconstructionCache {
    /// Create a cache holding at most `capacity` reconstructions.
    pub fn new(capacity: usize) -> StoreResult<Self> {
        if capacity == 0 {
            return Err(StoreError::invalid_argument(
                "cache capacity must be positive",
            ));
        }
        Ok(Self {
            entries: Mutex::new(LinkedHashMap::new()),
            by_polygon: Mutex::new(HashMap::new()),
            capacity,
            metrics: CacheMetrics::default(),
        })
    }

    /// Cached reconstruction for the key, refreshing its recency.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<Point>> {
        let mut entries = self.entries.lock();
        match entries.get_refresh(key) {
            Some(points) => {
                self.metrics.record_hit();
                Some(points.clone())
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    /// Insert a reconstruction, evicting least-recently-used entries on
    /// overflow.
    pub fn put(&self, key: CacheKey, points: Vec<Point>) {
        let mut entries = self.entries.lock();
        let mut by_polygon = self.by_polygon.lock();

        if entries.insert(key, points).is_none() {
            by_polygon.entry(key.polygon_id).or_default().insert(key);
        }
        while entries.len() > self.capacity {
            if let Some((evicted, _)) = entries.pop_front() {
                self.metrics.record_eviction();
                if let Some(keys) = by_polygon.get_mut(&evicted.polygon_id) {
                    keys.remove(&evicted);
                    if keys.is_empty() {
                        by_polygon.remove(&evicted.polygon_id);
                    }
                }
                trace!(
                    polygon_id = %evicted.polygon_id,
                    time = %evicted.time,
                    "evicted least-recently-used reconstruction"
                );
            }
        }
    }

    /// Drop every entry belonging to `polygon_id`, returning how many
    /// were removed. Entries for other polygons are untouched.
    pub fn invalidate_polygon(&self, polygon_id: PolygonId) -> usize {
        let mut entries = self.entries.lock();
        let mut by_polygon = self.by_polygon.lock();

        let Some(keys) = by_polygon.remove(&polygon_id) else {
            return 0;
        };
        let removed = keys.len();
        for key in keys {
            entries.remove(&key);
        }
        self.metrics.record_invalidations(removed as u64);
        trace!(polygon_id = %polygon_id, removed, "invalidated cached reconstructions");
        removed
    }

    /// Drop everything.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let mut by_polygon = self.by_polygon.lock();
        entries.clear();
        by_polygon.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the counters and occupancy.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.metrics.hits.load(Ordering::Relaxed),
            misses: self.metrics.misses.load(Ordering::Relaxed),
            evictions: self.metrics.evictions.load(Ordering::Relaxed),
            invalidations: self.metrics.invalidations.load(Ordering::Relaxed),
            len: self.len(),
            capacity: self.capacity,
        }
    }
}
