//! Shared helpers for the service integration suite.

use chrono::{TimeZone, Utc};

use chronoshape_core::{CoordinateSystem, Point, PolygonId, Timestamp};
use chronoshape_store::TemporalPolygonService;

/// Timestamp `secs` seconds after the epoch.
pub fn t(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// One hour in seconds, for readable offsets.
pub const HOUR: i64 = 3600;

pub fn square_points() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
    ]
}

pub fn triangle_points() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(5.0, 10.0),
    ]
}

/// A service holding one unit square created at `t(0)`.
pub fn service_with_square() -> (TemporalPolygonService, PolygonId) {
    let service = TemporalPolygonService::new();
    let pid = service
        .create_polygon(&square_points(), t(0), CoordinateSystem::Cartesian)
        .expect("square is a valid polygon");
    (service, pid)
}

/// A service holding one triangle created at `t(0)`.
pub fn service_with_triangle() -> (TemporalPolygonService, PolygonId) {
    let service = TemporalPolygonService::new();
    let pid = service
        .create_polygon(&triangle_points(), t(0), CoordinateSystem::Cartesian)
        .expect("triangle is a valid polygon");
    (service, pid)
}
