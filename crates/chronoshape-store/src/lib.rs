//! Chronoshape Store Library
//!
//! The in-memory temporal polygon store built on `chronoshape-core`:
//!
//! - State management (delta-vs-absolute update policy, batch updates,
//!   identical-change grouping, linear-pattern detection)
//! - The temporal query engine (range existence, change-time
//!   enumeration, history sampling)
//! - Two cache tiers consulted before reconstruction: an explicit
//!   precomputation table and a bounded LRU with per-polygon
//!   invalidation
//! - The service facade orchestrating the above under a reader/writer
//!   registry lock, with synchronous change notifications
//! - The JSON persistence codec and GeoJSON emission
//!
//! # Concurrency
//!
//! Many readers, few writers. The polygon registry takes a reader lock
//! for every query and a writer lock only for creation and removal;
//! vertex writes go through each vertex's own mutex, so writers of
//! different polygons (or different vertices) do not serialize. Cache
//! and precomputation locks are independent of the registry.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod geojson;
pub mod manager;
pub mod precompute;
pub mod query;
pub mod service;

pub use cache::{CacheStats, ReconstructionCache};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use events::{ChangeKind, ChangeListener, PolygonChanged, VertexChanged};
pub use manager::{StateManager, UpdatePolicy};
pub use precompute::{PrecomputationTable, PrecomputedPolygon};
pub use service::TemporalPolygonService;
