//! Integration tests for the temporal polygon service.
//!
//! Each module exercises one slice of the public surface end to end:
//! lifecycle (create/update/remove), batch updates, the two cache
//! tiers, temporal queries, persistence and GeoJSON, and concurrent
//! access.

mod common;

mod batch;
mod caching;
mod lifecycle;
mod serialization;
