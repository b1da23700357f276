//! Half-open validity intervals `[start, end)`.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Timestamp;

/// A half-open time interval `[start, end)`.
///
/// `end == None` marks an open-ended interval: the state it belongs to
/// is current and valid for every `t >= start`. When present, `end`
/// must be strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: Timestamp,
    pub end: Option<Timestamp>,
}

impl TimeInterval {
    /// Create an interval, validating `end > start` when `end` is given.
    pub fn new(start: Timestamp, end: Option<Timestamp>) -> CoreResult<Self> {
        if let Some(e) = end {
            if e <= start {
                return Err(CoreError::InvalidInterval { start, end: e });
            }
        }
        Ok(Self { start, end })
    }

    /// An interval valid from `start` onwards, with no end.
    #[inline]
    pub fn open_ended(start: Timestamp) -> Self {
        Self { start, end: None }
    }

    /// A closed interval `[start, end)`. Fails if `end <= start`.
    #[inline]
    pub fn closed(start: Timestamp, end: Timestamp) -> CoreResult<Self> {
        Self::new(start, Some(end))
    }

    /// Whether `t` falls inside the interval:
    /// `start <= t` and (open-ended or `t < end`).
    #[inline]
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && self.end.map_or(true, |e| t < e)
    }

    /// Whether the interval intersects the inclusive range `[t1, t2]`:
    /// `start <= t2` and (open-ended or `end >= t1`).
    #[inline]
    pub fn intersects_range(&self, t1: Timestamp, t2: Timestamp) -> bool {
        self.start <= t2 && self.end.map_or(true, |e| e >= t1)
    }

    #[inline]
    pub fn is_open_ended(&self) -> bool {
        self.end.is_none()
    }

    /// Copy of this interval closed at `end`.
    ///
    /// Used when appending a successor state: the predecessor's open end
    /// is pinned to the successor's start. No ordering check is applied;
    /// an out-of-order append can produce `end <= start` here, which the
    /// integrity validator reports instead of this method rejecting.
    #[inline]
    pub fn close_at(&self, end: Timestamp) -> Self {
        Self {
            start: self.start,
            end: Some(end),
        }
    }

    /// Length of the interval, `None` when open-ended.
    #[inline]
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|e| e - self.start)
    }
}
