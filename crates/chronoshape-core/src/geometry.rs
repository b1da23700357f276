//! Planar geometry over point rings.
//!
//! All functions take the ring as an open point list (first vertex not
//! repeated at the end). Degenerate inputs beyond what
//! [`validate_ring`] rejects produce best-effort answers, not errors.

use crate::types::Point;

/// Area below which three consecutive vertices count as collinear.
pub const COLLINEARITY_AREA_EPSILON: f64 = 1e-10;

/// Winding of a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
    /// Zero signed area: all vertices collinear or coincident.
    Degenerate,
}

/// Signed shoelace area: positive for counter-clockwise rings.
pub fn signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Absolute enclosed area.
#[inline]
pub fn area(ring: &[Point]) -> f64 {
    signed_area(ring).abs()
}

/// Total boundary length, closing edge included.
pub fn perimeter(ring: &[Point]) -> f64 {
    if ring.len() < 2 {
        return 0.0;
    }
    (0..ring.len())
        .map(|i| ring[i].distance_to(&ring[(i + 1) % ring.len()]))
        .sum()
}

/// Area-weighted centroid. Falls back to the vertex mean for rings with
/// (near-)zero area.
pub fn centroid(ring: &[Point]) -> Option<Point> {
    if ring.is_empty() {
        return None;
    }
    let a = signed_area(ring);
    if a.abs() < COLLINEARITY_AREA_EPSILON {
        let n = ring.len() as f64;
        let (sx, sy) = ring
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        return Some(Point::new(sx / n, sy / n));
    }
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..ring.len() {
        let p = ring[i];
        let q = ring[(i + 1) % ring.len()];
        let cross = p.x * q.y - q.x * p.y;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    Some(Point::new(cx / (6.0 * a), cy / (6.0 * a)))
}

/// Axis-aligned bounding box as `(min, max)` corners.
pub fn bounding_box(ring: &[Point]) -> Option<(Point, Point)> {
    let first = ring.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &ring[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

/// Winding direction from the signed area.
pub fn orientation(ring: &[Point]) -> Orientation {
    let a = signed_area(ring);
    if a.abs() < COLLINEARITY_AREA_EPSILON {
        Orientation::Degenerate
    } else if a > 0.0 {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

/// Even-odd ray cast. Boundary points may land on either side.
pub fn contains_point(ring: &[Point], p: Point) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Twice the signed area of triangle `abc`.
#[inline]
fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Area of triangle `abc`.
#[inline]
pub fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    cross(a, b, c).abs() / 2.0
}

/// Whether `c` lies on segment `ab`, assuming the three are collinear.
fn on_segment(a: Point, b: Point, c: Point) -> bool {
    c.x >= a.x.min(b.x) && c.x <= a.x.max(b.x) && c.y >= a.y.min(b.y) && c.y <= a.y.max(b.y)
}

/// Proper or touching intersection of segments `p1p2` and `p3p4`.
pub fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(p3, p4, p1))
        || (d2 == 0.0 && on_segment(p3, p4, p2))
        || (d3 == 0.0 && on_segment(p1, p2, p3))
        || (d4 == 0.0 && on_segment(p1, p2, p4))
}

/// Pairwise test of non-adjacent boundary segments.
pub fn self_intersects(ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let (a1, a2) = (ring[i], ring[(i + 1) % n]);
        for j in (i + 1)..n {
            // Skip the segment itself and the two sharing an endpoint
            // with it (including the first/last wrap-around pair).
            if j == i || (j + 1) % n == i || (i + 1) % n == j {
                continue;
            }
            let (b1, b2) = (ring[j], ring[(j + 1) % n]);
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// Validation run at polygon creation. Returns every reason found:
/// fewer than three vertices, non-finite coordinates, a consecutive
/// collinear triple, or a self-intersecting boundary.
pub fn validate_ring(ring: &[Point]) -> Vec<String> {
    let mut reasons = Vec::new();
    if ring.len() < 3 {
        reasons.push(format!(
            "polygon needs at least 3 vertices, got {}",
            ring.len()
        ));
        return reasons;
    }
    if let Some(p) = ring.iter().find(|p| !p.is_finite()) {
        reasons.push(format!("non-finite coordinate at {p}"));
        return reasons;
    }
    let n = ring.len();
    for i in 0..n {
        let (a, b, c) = (ring[i], ring[(i + 1) % n], ring[(i + 2) % n]);
        if triangle_area(a, b, c) < COLLINEARITY_AREA_EPSILON {
            reasons.push(format!(
                "consecutive vertices {}, {}, {} are collinear",
                i,
                (i + 1) % n,
                (i + 2) % n
            ));
        }
    }
    if self_intersects(ring) {
        reasons.push("boundary is self-intersecting".to_string());
    }
    reasons
}
