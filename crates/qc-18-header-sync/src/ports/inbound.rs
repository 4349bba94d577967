//! # Inbound Ports
//!
//! What the header ledger offers: the two sync operations called by the
//! gateway, and the read-only queries used by downstream cross-chain logic.

use crate::domain::{
    ChainId, ChainTip, GenesisInfo, Result, SourceHeader, SyncBlockHeaderParam, SyncFailure,
    SyncGenesisHeaderParam, SyncReport,
};
use primitive_types::{H256, U256};

/// Header sync API - state-changing inbound port.
pub trait HeaderSyncApi {
    /// Bootstrap a chain with its trusted genesis header.
    ///
    /// No proof-of-work or linkage checks are run on the anchor.
    ///
    /// # Errors
    /// - `UnsupportedChain`: chain not registered
    /// - `GenesisAlreadySet`: chain already bootstrapped
    /// - `MalformedHeader`: raw bytes do not decode
    fn sync_genesis_header(&mut self, param: SyncGenesisHeaderParam) -> Result<GenesisInfo>;

    /// Validate and store a batch of headers in order.
    ///
    /// Each header commits on its own. The first hard failure stops the batch;
    /// headers committed before it stay committed and are described by the
    /// failure's report. Duplicates are skipped.
    fn sync_block_header(
        &mut self,
        param: SyncBlockHeaderParam,
    ) -> std::result::Result<SyncReport, SyncFailure>;
}

/// Header query API - read-only inbound port.
pub trait HeaderQueryApi {
    /// Canonical tip height, 0 before bootstrap.
    fn latest_height(&self, chain_id: ChainId) -> Result<u64>;

    /// Canonical hash at `height`.
    fn canonical_hash_at(&self, chain_id: ChainId, height: u64) -> Result<H256>;

    /// Any stored header, canonical or not.
    fn header_by_hash(&self, chain_id: ChainId, hash: &H256) -> Result<SourceHeader>;

    /// Canonical header at `height`.
    fn header_by_height(&self, chain_id: ChainId, height: u64) -> Result<SourceHeader>;

    /// Cumulative difficulty of a stored header.
    fn difficulty_sum(&self, chain_id: ChainId, hash: &H256) -> Result<U256>;

    /// Current canonical tip.
    fn chain_tip(&self, chain_id: ChainId) -> Result<ChainTip>;

    /// Trust anchor of the chain.
    fn genesis(&self, chain_id: ChainId) -> Result<GenesisInfo>;

    /// Whether genesis has been set.
    fn is_bootstrapped(&self, chain_id: ChainId) -> bool;
}
