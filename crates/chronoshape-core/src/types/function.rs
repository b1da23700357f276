//! Closed-form position-versus-time functions.

use std::fmt;
use std::sync::Arc;

use crate::types::{Point, Timestamp};

/// Callback type for one coordinate of an opaque temporal function.
///
/// Receives the elapsed time in seconds since the function's reference
/// time (negative before it) and returns an offset from the reference
/// point along its axis.
pub type CoordinateFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A parametric position function over time.
///
/// Function states self-contain their absolute positions: unlike delta
/// states they need no resolution walk, and they double as anchor
/// checkpoints for deltas appended after them.
///
/// The `Opaque` variant captures arbitrary closures. It is excluded
/// from persistence; the codec stores a sampled absolute fallback next
/// to it and deserializes to that.
#[derive(Clone)]
pub enum TemporalFunction {
    /// Uniform straight-line motion from `reference_point` at
    /// `reference_time`, in units per second.
    Linear {
        reference_point: Point,
        reference_time: Timestamp,
        velocity_x: f64,
        velocity_y: f64,
    },

    /// Circular motion around `center`: at elapsed time `dt` the
    /// position is
    /// `center + radius * (cos(w*dt + phase), sin(w*dt + phase))`,
    /// with `w` in radians per second.
    Circular {
        center: Point,
        reference_time: Timestamp,
        radius: f64,
        angular_velocity: f64,
        phase: f64,
    },

    /// Arbitrary captured motion; `fx`/`fy` give offsets from
    /// `reference_point` as functions of elapsed seconds.
    Opaque {
        reference_point: Point,
        reference_time: Timestamp,
        fx: CoordinateFn,
        fy: CoordinateFn,
    },
}

/// Elapsed seconds from `reference` to `t`, negative when `t` precedes
/// it. Millisecond precision, matching what the persistence timestamps
/// round-trip.
#[inline]
fn elapsed_seconds(reference: Timestamp, t: Timestamp) -> f64 {
    (t - reference).num_milliseconds() as f64 / 1000.0
}

impl TemporalFunction {
    /// Evaluate the absolute position at `t`. Total for every `t`;
    /// interval clipping is the owning state's concern.
    pub fn position_at(&self, t: Timestamp) -> Point {
        match self {
            Self::Linear {
                reference_point,
                reference_time,
                velocity_x,
                velocity_y,
            } => {
                let dt = elapsed_seconds(*reference_time, t);
                Point::new(
                    reference_point.x + velocity_x * dt,
                    reference_point.y + velocity_y * dt,
                )
            }
            Self::Circular {
                center,
                reference_time,
                radius,
                angular_velocity,
                phase,
            } => {
                let dt = elapsed_seconds(*reference_time, t);
                let angle = angular_velocity * dt + phase;
                Point::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            }
            Self::Opaque {
                reference_point,
                reference_time,
                fx,
                fy,
            } => {
                let dt = elapsed_seconds(*reference_time, t);
                Point::new(reference_point.x + fx(dt), reference_point.y + fy(dt))
            }
        }
    }

    /// Discriminator name as written by the persistence codec.
    #[inline]
    pub fn function_type(&self) -> &'static str {
        match self {
            Self::Linear { .. } => "Linear",
            Self::Circular { .. } => "Circular",
            Self::Opaque { .. } => "Opaque",
        }
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque { .. })
    }

    /// Reference time the function is anchored on.
    #[inline]
    pub fn reference_time(&self) -> Timestamp {
        match self {
            Self::Linear { reference_time, .. }
            | Self::Circular { reference_time, .. }
            | Self::Opaque { reference_time, .. } => *reference_time,
        }
    }
}

// Parametric variants compare by their parameters; opaque closures are
// never equal, not even to themselves.
impl PartialEq for TemporalFunction {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Linear {
                    reference_point: p1,
                    reference_time: t1,
                    velocity_x: vx1,
                    velocity_y: vy1,
                },
                Self::Linear {
                    reference_point: p2,
                    reference_time: t2,
                    velocity_x: vx2,
                    velocity_y: vy2,
                },
            ) => p1 == p2 && t1 == t2 && vx1 == vx2 && vy1 == vy2,
            (
                Self::Circular {
                    center: c1,
                    reference_time: t1,
                    radius: r1,
                    angular_velocity: w1,
                    phase: ph1,
                },
                Self::Circular {
                    center: c2,
                    reference_time: t2,
                    radius: r2,
                    angular_velocity: w2,
                    phase: ph2,
                },
            ) => c1 == c2 && t1 == t2 && r1 == r2 && w1 == w2 && ph1 == ph2,
            _ => false,
        }
    }
}

impl fmt::Debug for TemporalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear {
                reference_point,
                reference_time,
                velocity_x,
                velocity_y,
            } => f
                .debug_struct("Linear")
                .field("reference_point", reference_point)
                .field("reference_time", reference_time)
                .field("velocity_x", velocity_x)
                .field("velocity_y", velocity_y)
                .finish(),
            Self::Circular {
                center,
                reference_time,
                radius,
                angular_velocity,
                phase,
            } => f
                .debug_struct("Circular")
                .field("center", center)
                .field("reference_time", reference_time)
                .field("radius", radius)
                .field("angular_velocity", angular_velocity)
                .field("phase", phase)
                .finish(),
            Self::Opaque {
                reference_point,
                reference_time,
                ..
            } => f
                .debug_struct("Opaque")
                .field("reference_point", reference_point)
                .field("reference_time", reference_time)
                .field("fx", &"<fn>")
                .field("fy", &"<fn>")
                .finish(),
        }
    }
}
