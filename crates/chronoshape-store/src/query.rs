//! Temporal queries over a single polygon: existence, change-time
//! enumeration and history sampling.

use std::collections::BTreeSet;

use chrono::Duration;

use chronoshape_core::{Point, TemporalPolygon, Timestamp};

/// Whether every vertex resolves to a position at `t`.
pub fn exists_at(polygon: &TemporalPolygon, t: Timestamp) -> bool {
    polygon
        .vertices_in_order()
        .all(|v| v.position_at(t).is_some())
}

/// Whether every vertex has at least one state whose interval
/// intersects the inclusive range `[t1, t2]`.
pub fn exists_in_range(polygon: &TemporalPolygon, t1: Timestamp, t2: Timestamp) -> bool {
    polygon.vertices_in_order().all(|v| {
        v.history_snapshot()
            .iter()
            .any(|s| s.interval.intersects_range(t1, t2))
    })
}

/// Whether the polygon exists across the whole range.
///
/// Simplification by design: only the two endpoints are checked, so an
/// interior gap between them goes undetected. Callers needing gap
/// detection should walk [`change_times_in_range`] and probe each.
pub fn exists_for_entire_range(polygon: &TemporalPolygon, t1: Timestamp, t2: Timestamp) -> bool {
    exists_at(polygon, t1) && exists_at(polygon, t2)
}

/// The sorted, deduplicated set of instants at which the polygon's
/// shape may change within `[t1, t2]`: both range bounds plus every
/// state interval boundary falling inside the range.
pub fn change_times_in_range(
    polygon: &TemporalPolygon,
    t1: Timestamp,
    t2: Timestamp,
) -> Vec<Timestamp> {
    let mut times = BTreeSet::new();
    times.insert(t1);
    times.insert(t2);
    for vertex in polygon.vertices_in_order() {
        for state in vertex.history_snapshot() {
            let start = state.interval.start;
            if t1 <= start && start <= t2 {
                times.insert(start);
            }
            if let Some(end) = state.interval.end {
                if t1 <= end && end <= t2 {
                    times.insert(end);
                }
            }
        }
    }
    times.into_iter().collect()
}

/// Sample the polygon's reconstruction across `[t1, t2]`.
///
/// With a `step`, samples run `t1, t1+step, …` up to and including
/// `t2`'s side of the range; without one, every change time in the
/// range is sampled. Instants where reconstruction fails are silently
/// omitted.
pub fn history(
    polygon: &TemporalPolygon,
    t1: Timestamp,
    t2: Timestamp,
    step: Option<Duration>,
) -> Vec<(Timestamp, Vec<Point>)> {
    let times: Vec<Timestamp> = match step {
        Some(step) => {
            let mut times = Vec::new();
            let mut t = t1;
            while t <= t2 {
                times.push(t);
                t = t + step;
            }
            times
        }
        None => change_times_in_range(polygon, t1, t2),
    };

    times
        .into_iter()
        .filter_map(|t| polygon.reconstruct_at(t).ok().map(|ring| (t, ring)))
        .collect()
}
