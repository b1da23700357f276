//! Textual range encoding of sorted vertex-id sequences.
//!
//! Comma-separated tokens, each a standalone id `"n"` or an inclusive
//! run `"a-b"` with `a <= b`. The persistence document uses this only
//! for the natural order `0, 1, …, n-1`, where the single token keeps
//! the implicit ordering obvious.

use chronoshape_core::VertexId;

use crate::error::{StoreError, StoreResult};

/// Encode a sequence into run tokens. Runs form over strictly
/// consecutive ascending ids; anything else falls out as standalone
/// tokens, so any input encodes (decoding only restores order for
/// sorted inputs).
pub fn encode(ids: &[VertexId]) -> String {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < ids.len() {
        let run_start = ids[i];
        let mut run_end = run_start;
        while i + 1 < ids.len() && ids[i + 1] == run_end + 1 {
            i += 1;
            run_end = ids[i];
        }
        if run_end > run_start {
            tokens.push(format!("{run_start}-{run_end}"));
        } else {
            tokens.push(run_start.to_string());
        }
        i += 1;
    }
    tokens.join(", ")
}

/// Expand an encoded sequence back into ids.
pub fn decode(encoded: &str) -> StoreResult<Vec<VertexId>> {
    let mut ids = Vec::new();
    for token in encoded.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(StoreError::serialization(format!(
                "empty token in encoded vertex ids {encoded:?}"
            )));
        }
        match token.split_once('-') {
            Some((a, b)) => {
                let a: VertexId = parse_id(a, encoded)?;
                let b: VertexId = parse_id(b, encoded)?;
                if a > b {
                    return Err(StoreError::serialization(format!(
                        "descending range {token:?} in encoded vertex ids"
                    )));
                }
                ids.extend(a..=b);
            }
            None => ids.push(parse_id(token, encoded)?),
        }
    }
    Ok(ids)
}

/// Whether `ids` is exactly the natural order `0, 1, …, n-1`.
pub fn is_natural_order(ids: &[VertexId]) -> bool {
    ids.iter().enumerate().all(|(i, id)| *id == i as VertexId)
}

fn parse_id(token: &str, context: &str) -> StoreResult<VertexId> {
    token.trim().parse().map_err(|_| {
        StoreError::serialization(format!(
            "invalid vertex id {token:?} in encoded sequence {context:?}"
        ))
    })
}
