//! Local geographic/Cartesian conversion.
//!
//! Uses an equirectangular approximation anchored on an origin
//! latitude/longitude: metres east/north of the origin map to degree
//! offsets through the Earth radius and the origin's latitude cosine.
//! Accurate for the local extents temporal polygons cover; no real
//! projection is attempted.

use crate::types::Point;

/// Earth radius used by the local approximation, in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Anchor for the local conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoOrigin {
    /// Origin latitude in degrees.
    pub latitude: f64,
    /// Origin longitude in degrees.
    pub longitude: f64,
}

impl GeoOrigin {
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Convert local Cartesian metres (x east, y north) to geographic
/// degrees. Returns a point with `x = longitude`, `y = latitude`.
pub fn cartesian_to_geographic(p: Point, origin: GeoOrigin) -> Point {
    let lat0 = origin.latitude.to_radians();
    let dlat = p.y / EARTH_RADIUS_M;
    let dlon = p.x / (EARTH_RADIUS_M * lat0.cos());
    Point::new(
        origin.longitude + dlon.to_degrees(),
        origin.latitude + dlat.to_degrees(),
    )
}

/// Convert geographic degrees (`x = longitude`, `y = latitude`) to
/// local Cartesian metres relative to the origin.
pub fn geographic_to_cartesian(p: Point, origin: GeoOrigin) -> Point {
    let lat0 = origin.latitude.to_radians();
    let dlat = (p.y - origin.latitude).to_radians();
    let dlon = (p.x - origin.longitude).to_radians();
    Point::new(dlon * EARTH_RADIUS_M * lat0.cos(), dlat * EARTH_RADIUS_M)
}

/// Great-circle distance in metres between two geographic points
/// (`x = longitude`, `y = latitude`, degrees).
pub fn haversine_distance_m(a: Point, b: Point) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlat = (b.y - a.y).to_radians();
    let dlon = (b.x - a.x).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
