//! Store configuration.

use crate::error::{StoreError, StoreResult};
use crate::manager::UpdatePolicy;

/// Default values shared by configuration and tests.
pub mod defaults {
    /// LRU reconstruction cache capacity.
    pub const CACHE_CAPACITY: usize = 100;

    /// Chebyshev distance up to which an update is stored as a delta
    /// rather than a re-anchoring absolute state.
    pub const DELTA_THRESHOLD: f64 = 100.0;

    /// Per-axis deviation tolerated by linear-pattern detection.
    pub const PATTERN_TOLERANCE: f64 = 1e-6;

    /// Sample spacing driving the linear-pattern sample count:
    /// `max(3, range / spacing)` samples across the inspected range.
    pub const PATTERN_SAMPLE_SPACING_SECS: i64 = 10;
}

/// Configuration for a [`crate::TemporalPolygonService`] instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreConfig {
    /// Capacity of the LRU reconstruction cache. Must be positive.
    pub cache_capacity: usize,
    /// Default update policy applied by `update_vertex`.
    pub update_policy: UpdatePolicy,
    /// Tolerance for linear-pattern detection.
    pub pattern_tolerance: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_capacity: defaults::CACHE_CAPACITY,
            update_policy: UpdatePolicy::default(),
            pattern_tolerance: defaults::PATTERN_TOLERANCE,
        }
    }
}

impl StoreConfig {
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    pub fn with_pattern_tolerance(mut self, tolerance: f64) -> Self {
        self.pattern_tolerance = tolerance;
        self
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> StoreResult<()> {
        if self.cache_capacity == 0 {
            return Err(StoreError::invalid_argument(
                "cache capacity must be positive",
            ));
        }
        if !self.update_policy.delta_threshold.is_finite() || self.update_policy.delta_threshold < 0.0
        {
            return Err(StoreError::invalid_argument(format!(
                "delta threshold must be finite and non-negative, got {}",
                self.update_policy.delta_threshold
            )));
        }
        if !self.pattern_tolerance.is_finite() || self.pattern_tolerance < 0.0 {
            return Err(StoreError::invalid_argument(format!(
                "pattern tolerance must be finite and non-negative, got {}",
                self.pattern_tolerance
            )));
        }
        Ok(())
    }
}
