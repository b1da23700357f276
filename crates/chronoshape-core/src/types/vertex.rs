//! Per-vertex state histories and position resolution.
//!
//! A vertex history is an append-only list of [`VertexState`]s ordered
//! by interval start. Appending closes the previous open-ended state at
//! the newcomer's start (slowly-changing-dimension style), so at most
//! one state is open-ended and it is the last. Out-of-order appends are
//! accepted without reordering; the resulting gaps or overlaps are
//! reported by [`Vertex::integrity_report`] and tolerated by the lookup
//! fall-through walk.

use chrono::Duration;
use parking_lot::Mutex;

use crate::types::{Point, StateKind, Timestamp, VertexId, VertexState};

/// Margin used to sample a function state just before a delta state's
/// start when resolving the delta's base.
const BASE_SAMPLE_EPSILON_MS: i64 = 1;

/// A polygon vertex: an id and a time-ordered state history.
///
/// # Thread Safety
///
/// The state list is guarded by an internal mutex held only for the
/// duration of a single append or lookup, so reads of different
/// vertices proceed in parallel even within one polygon.
#[derive(Debug)]
pub struct Vertex {
    id: VertexId,
    states: Mutex<Vec<VertexState>>,
}

impl Vertex {
    /// A vertex with an empty history.
    pub fn new(id: VertexId) -> Self {
        Self {
            id,
            states: Mutex::new(Vec::new()),
        }
    }

    /// A vertex seeded with one initial state.
    pub fn with_initial_state(id: VertexId, state: VertexState) -> Self {
        Self {
            id,
            states: Mutex::new(vec![state]),
        }
    }

    /// Rebuild a vertex from an already-shaped history (persistence
    /// path). States are taken verbatim; no open-interval closing runs.
    pub fn from_states(id: VertexId, states: Vec<VertexState>) -> Self {
        Self {
            id,
            states: Mutex::new(states),
        }
    }

    #[inline]
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Append a state, closing the previous open-ended state at the
    /// newcomer's interval start.
    ///
    /// No ordering check is applied to `state.interval.start`; callers
    /// append forward in time. An out-of-order append does not fail but
    /// may leave overlaps that [`integrity_report`](Self::integrity_report)
    /// detects.
    pub fn add_state(&self, state: VertexState) {
        let mut states = self.states.lock();
        if let Some(last) = states.last() {
            if last.interval.is_open_ended() {
                let closed = last.close_at(state.interval.start);
                let last_idx = states.len() - 1;
                states[last_idx] = closed;
            }
        }
        states.push(state);
    }

    /// The state valid at `t`, if any.
    pub fn state_at(&self, t: Timestamp) -> Option<VertexState> {
        let states = self.states.lock();
        find_state_index(&states, t).map(|i| states[i].clone())
    }

    /// The vertex position at `t`, resolving delta chains against their
    /// most recent absolute or function anchor. `None` when no state
    /// covers `t`.
    pub fn position_at(&self, t: Timestamp) -> Option<Point> {
        let states = self.states.lock();
        let idx = find_state_index(&states, t)?;
        Some(resolve_position(&states, idx, t))
    }

    /// Resolved position of the first recorded state, used as the
    /// fallback current position for updates that precede all history.
    pub fn first_position(&self) -> Option<Point> {
        let states = self.states.lock();
        states.first().map(|s| match &s.kind {
            StateKind::Absolute(p) => *p,
            StateKind::Function(f) => f.position_at(s.interval.start),
            // A leading delta has no anchor; its offset doubles as the
            // position, matching the resolution walk's empty-base case.
            StateKind::Delta { dx, dy } => Point::new(*dx, *dy),
        })
    }

    /// Clone of the full history, ordered as stored.
    pub fn history_snapshot(&self) -> Vec<VertexState> {
        self.states.lock().clone()
    }

    pub fn state_count(&self) -> usize {
        self.states.lock().len()
    }

    /// Opt-in integrity validation: reports gaps between consecutive
    /// states and overlaps among states, without repairing either.
    /// An empty report means the history is seamless.
    pub fn integrity_report(&self) -> Vec<String> {
        let states = self.states.lock();
        let mut findings = Vec::new();
        for (i, s) in states.iter().enumerate() {
            if let Some(end) = s.interval.end {
                if end <= s.interval.start {
                    findings.push(format!(
                        "vertex {}: state {} has inverted interval [{}, {})",
                        self.id, i, s.interval.start, end
                    ));
                }
            }
        }
        for (i, pair) in states.windows(2).enumerate() {
            match pair[0].interval.end {
                Some(end) if end < pair[1].interval.start => findings.push(format!(
                    "vertex {}: gap between state {} (ends {}) and state {} (starts {})",
                    self.id,
                    i,
                    end,
                    i + 1,
                    pair[1].interval.start
                )),
                Some(end) if end > pair[1].interval.start => findings.push(format!(
                    "vertex {}: state {} (ends {}) overlaps state {} (starts {})",
                    self.id,
                    i,
                    end,
                    i + 1,
                    pair[1].interval.start
                )),
                None => findings.push(format!(
                    "vertex {}: state {} is open-ended but not last",
                    self.id, i
                )),
                _ => {}
            }
        }
        findings
    }
}

// Vertex histories compare by id and state content; the mutex is an
// implementation detail.
impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && *self.states.lock() == *other.states.lock()
    }
}

impl Clone for Vertex {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            states: Mutex::new(self.states.lock().clone()),
        }
    }
}

/// Largest index whose state contains `t`.
///
/// Binary search for the last state with `start <= t`; if its interval
/// does not contain `t` (closed before `t`, or the history overlaps),
/// walk backwards over the remaining candidates. O(log H) on seamless
/// histories, O(H) under pathological overlap.
fn find_state_index(states: &[VertexState], t: Timestamp) -> Option<usize> {
    let upper = states.partition_point(|s| s.interval.start <= t);
    if upper == 0 {
        return None;
    }
    states[..upper]
        .iter()
        .rposition(|s| s.interval.contains(t))
}

/// Resolve the position encoded by `states[idx]` at `t`.
///
/// Absolute and function states self-resolve. A delta state is applied
/// on top of a base accumulated left-to-right over the earlier states
/// with `start <= t`: absolute states reset the base, function states
/// covering the instant just before the delta's start reset it to their
/// sampled position, and intermediate deltas accumulate once a base
/// exists. A delta with no anchor at all resolves to its own offset.
fn resolve_position(states: &[VertexState], idx: usize, t: Timestamp) -> Point {
    let state = &states[idx];
    let (dx, dy) = match &state.kind {
        StateKind::Absolute(point) => return *point,
        StateKind::Function(function) => return function.position_at(t),
        StateKind::Delta { dx, dy } => (*dx, *dy),
    };

    let probe = state.interval.start - Duration::milliseconds(BASE_SAMPLE_EPSILON_MS);
    let mut base = Point::ORIGIN;
    let mut have_base = false;
    for earlier in &states[..idx] {
        if earlier.interval.start > t {
            continue;
        }
        match &earlier.kind {
            StateKind::Function(function) if earlier.interval.contains(probe) => {
                base = function.position_at(probe);
                have_base = true;
            }
            StateKind::Absolute(point) => {
                base = *point;
                have_base = true;
            }
            StateKind::Delta { dx, dy } if have_base => {
                base = base.translated(*dx, *dy);
            }
            _ => {}
        }
    }
    base.translated(dx, dy)
}
