//! Counter context decoding.
//!
//! A counter cell stores a context rather than a number:
//!
//! ```text
//! [header_count:2][index:2 * header_count][shard:32]*
//! shard = [counter_id:16][clock:8][count:8]
//! ```
//!
//! Readers only ever see the aggregated total.

use crate::error::{WcqError, WcqResult};

const HEADER_COUNT_SIZE: usize = 2;
const HEADER_ELT_SIZE: usize = 2;
const COUNTER_ID_SIZE: usize = 16;
const CLOCK_SIZE: usize = 8;
const COUNT_SIZE: usize = 8;
pub const SHARD_SIZE: usize = COUNTER_ID_SIZE + CLOCK_SIZE + COUNT_SIZE;

/// Sum of every shard count in the context.
pub fn total(context: &[u8]) -> WcqResult<i64> {
    let header = context
        .get(..HEADER_COUNT_SIZE)
        .ok_or_else(|| WcqError::MalformedCounter("missing header".to_string()))?;
    let header_count = u16::from_be_bytes([header[0], header[1]]) as usize;
    let body_offset = HEADER_COUNT_SIZE + header_count * HEADER_ELT_SIZE;

    let body = context.get(body_offset..).ok_or_else(|| {
        WcqError::MalformedCounter(format!(
            "header declares {header_count} entries but context has {} bytes",
            context.len()
        ))
    })?;
    if body.len() % SHARD_SIZE != 0 {
        return Err(WcqError::MalformedCounter(format!(
            "{} trailing bytes after shards",
            body.len() % SHARD_SIZE
        )));
    }

    let mut sum: i64 = 0;
    for shard in body.chunks_exact(SHARD_SIZE) {
        let mut count = [0u8; COUNT_SIZE];
        count.copy_from_slice(&shard[COUNTER_ID_SIZE + CLOCK_SIZE..]);
        sum = sum.wrapping_add(i64::from_be_bytes(count));
    }
    Ok(sum)
}

/// Builds a context with one shard per `(counter_id, clock, count)`.
///
/// No shard is flagged as a local delta; the header is empty.
pub fn context(shards: &[([u8; COUNTER_ID_SIZE], i64, i64)]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_COUNT_SIZE + shards.len() * SHARD_SIZE);
    out.extend_from_slice(&0u16.to_be_bytes());
    for (id, clock, count) in shards {
        out.extend_from_slice(id);
        out.extend_from_slice(&clock.to_be_bytes());
        out.extend_from_slice(&count.to_be_bytes());
    }
    out
}
