//! Fork choice: common-ancestor walk and reorganization plan.
//!
//! Planning is read-only. The ledger turns a [`ReorgPlan`] into one atomic
//! batch together with the new record, so a refused reorganization
//! (`ForkTooDeep`) leaves the store untouched.

use crate::domain::{HeaderRecord, HeaderSyncError, Result};
use primitive_types::H256;

/// Read access to one chain's stored state.
pub trait ChainView {
    /// Canonical hash at `height`, if indexed.
    fn canonical_hash(&self, height: u64) -> Result<Option<H256>>;

    /// Stored record under `hash`.
    fn record(&self, hash: &H256) -> Result<Option<HeaderRecord>>;
}

/// Index changes that make a heavier header the canonical tip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReorgPlan {
    /// Height of the deepest header shared by both branches.
    pub ancestor_height: u64,
    /// Hash of that header.
    pub ancestor_hash: H256,
    /// Tip height before the change.
    pub old_tip_height: u64,
    /// Tip height after the change.
    pub new_tip_height: u64,
    /// Canonical index writes, ascending by height, ending at the new tip.
    pub assignments: Vec<(u64, H256)>,
    /// Indexed heights above the new tip that must be removed.
    pub truncated: Vec<u64>,
}

impl ReorgPlan {
    /// Whether previously canonical headers lose their place.
    pub fn is_reorg(&self) -> bool {
        self.ancestor_height < self.old_tip_height
    }

    /// Number of previously canonical heights replaced or removed.
    pub fn displaced(&self) -> u64 {
        self.old_tip_height - self.ancestor_height
    }
}

/// Plan the switch of the canonical tip to `new` (content hash `new_hash`).
///
/// Walks parent links from `new` until a header that is canonical at its own
/// height. At most `max_depth` headers are visited, and at most `max_depth`
/// previously canonical heights may be displaced.
///
/// # Errors
/// - `ForkTooDeep` when either bound is exceeded
/// - `Corrupted` when an ancestor record is missing
pub fn plan_reorg(
    view: &dyn ChainView,
    new: &HeaderRecord,
    new_hash: H256,
    old_tip_height: u64,
    max_depth: u64,
) -> Result<ReorgPlan> {
    let mut path: Vec<(u64, H256)> = Vec::new();
    let mut hash = new_hash;
    let mut number = new.number();
    let mut parent_hash = new.header.parent_hash;

    loop {
        if view.canonical_hash(number)? == Some(hash) {
            break;
        }
        path.push((number, hash));
        if path.len() as u64 > max_depth {
            return Err(HeaderSyncError::ForkTooDeep {
                depth: path.len() as u64,
                limit: max_depth,
            });
        }

        let parent = view.record(&parent_hash)?.ok_or_else(|| {
            HeaderSyncError::Corrupted(format!("missing ancestor {parent_hash:?}"))
        })?;
        hash = parent_hash;
        number = parent.number();
        parent_hash = parent.header.parent_hash;
    }

    let (ancestor_height, ancestor_hash) = (number, hash);
    let displaced = old_tip_height.saturating_sub(ancestor_height);
    if displaced > max_depth {
        return Err(HeaderSyncError::ForkTooDeep {
            depth: displaced,
            limit: max_depth,
        });
    }

    path.reverse();
    let new_tip_height = new.number();
    let truncated = (new_tip_height.saturating_add(1)..=old_tip_height).collect();

    Ok(ReorgPlan {
        ancestor_height,
        ancestor_hash,
        old_tip_height,
        new_tip_height,
        assignments: path,
        truncated,
    })
}
