//! # Domain Invariants
//!
//! Rules that hold for every chain after every successful operation.

use super::errors::{HeaderSyncError, Result};
use super::record::HeaderRecord;
use primitive_types::U256;

/// Default bound on the heights a single reorganization may rewrite.
pub const DEFAULT_MAX_FORK_DEPTH: u64 = 1024;

/// Default maximum headers per `sync_block_header` call.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// Default tolerance for header timestamps ahead of host time, in seconds.
pub const DEFAULT_ALLOWED_FUTURE_SECS: u64 = 15;

/// Default maximum raw header size in bytes.
pub const DEFAULT_MAX_HEADER_SIZE: usize = 4096;

/// Fork choice: a branch replaces the tip only when strictly heavier.
///
/// Ties keep the existing tip (first seen wins).
#[inline]
pub fn is_heavier(candidate: U256, tip: U256) -> bool {
    candidate > tip
}

/// Invariant: a record's weight is its parent's weight plus its own difficulty.
///
/// Folds with the same saturating addition as [`HeaderRecord::child_of`].
pub fn invariant_difficulty_sum(parent: &HeaderRecord, record: &HeaderRecord) -> bool {
    parent.difficulty_sum.saturating_add(record.header.difficulty) == record.difficulty_sum
}

/// Invariant: `record` directly extends `parent`.
pub fn invariant_linked(parent: &HeaderRecord, record: &HeaderRecord) -> bool {
    record.header.parent_hash == parent.hash()
        && parent.number().checked_add(1) == Some(record.number())
}

/// Invariant: a canonical segment, ordered by height, is a linked chain with
/// correctly folded weights.
pub fn invariant_canonical_segment(segment: &[HeaderRecord]) -> Result<()> {
    for pair in segment.windows(2) {
        let (parent, record) = (&pair[0], &pair[1]);
        if !invariant_linked(parent, record) {
            return Err(HeaderSyncError::Corrupted(format!(
                "canonical header {} does not extend {}",
                record.number(),
                parent.number()
            )));
        }
        if !invariant_difficulty_sum(parent, record) {
            return Err(HeaderSyncError::Corrupted(format!(
                "difficulty sum of canonical header {} does not fold",
                record.number()
            )));
        }
    }
    Ok(())
}

/// Invariant: the tip carries the maximum weight among stored records.
pub fn invariant_tip_maximal<'a>(
    tip_weight: U256,
    weights: impl IntoIterator<Item = &'a U256>,
) -> Result<()> {
    match weights.into_iter().find(|w| **w > tip_weight) {
        Some(heavier) => Err(HeaderSyncError::Corrupted(format!(
            "stored weight {heavier} exceeds tip weight {tip_weight}"
        ))),
        None => Ok(()),
    }
}
