//! # Header Ledger
//!
//! Application service behind the sync and query ports.
//!
//! ## Flow per header
//!
//! ```text
//! raw bytes → decode → duplicate? → parent lookup → validate
//!           → weight fold → fork choice → one atomic write
//! ```
//!
//! Chains are independent: each registered chain owns its
//! [`ChainSyncState`] and consensus rules, and shares only the store.

use crate::algorithms::{plan_reorg, ChainView, PowValidator};
use crate::application::chain_state::ChainSyncState;
use crate::codec;
use crate::config::{ChainSpec, HeaderSyncConfig};
use crate::domain::{
    is_heavier, ChainId, ChainTip, GenesisInfo, HeaderOutcome, HeaderRecord, HeaderSyncError,
    Result, SourceHeader, SyncBlockHeaderParam, SyncFailure, SyncGenesisHeaderParam, SyncReport,
};
use crate::ports::{ConsensusRules, HeaderQueryApi, HeaderSyncApi, KeyValueStore};
use primitive_types::{H256, U256};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// A chain known to the ledger.
struct RegisteredChain {
    spec: ChainSpec,
    rules: Box<dyn ConsensusRules>,
    state: ChainSyncState,
}

/// Header ledger over a key-value store.
pub struct HeaderLedger<S: KeyValueStore> {
    config: HeaderSyncConfig,
    store: S,
    chains: BTreeMap<ChainId, RegisteredChain>,
}

impl<S: KeyValueStore> HeaderLedger<S> {
    /// Create a ledger with no registered chains.
    pub fn new(config: HeaderSyncConfig, store: S) -> Self {
        Self {
            config,
            store,
            chains: BTreeMap::new(),
        }
    }

    /// Register a chain, or replace the rules of a registered one.
    ///
    /// State already in the store for this chain is picked up.
    pub fn register_chain(
        &mut self,
        spec: ChainSpec,
        rules: Box<dyn ConsensusRules>,
    ) -> Result<()> {
        let state = ChainSyncState::load(spec.chain_id, &self.store)?;
        info!(
            chain_id = %spec.chain_id,
            name = %spec.name,
            rules = rules.name(),
            bootstrapped = state.is_bootstrapped(),
            height = state.current_height(),
            "Registered source chain"
        );
        self.chains.insert(
            spec.chain_id,
            RegisteredChain { spec, rules, state },
        );
        Ok(())
    }

    /// Registered chain identifiers, ascending.
    pub fn chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.chains.keys().copied()
    }

    /// Ledger configuration.
    pub fn config(&self) -> &HeaderSyncConfig {
        &self.config
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the ledger, returning its store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Full invariant scan of one chain.
    pub fn check_invariants(&self, chain_id: ChainId) -> Result<()> {
        self.chain(chain_id)?.state.check_invariants(&self.store)
    }

    fn chain(&self, chain_id: ChainId) -> Result<&RegisteredChain> {
        self.chains
            .get(&chain_id)
            .ok_or(HeaderSyncError::UnsupportedChain(chain_id))
    }

    fn record(&self, chain_id: ChainId, hash: &H256) -> Result<HeaderRecord> {
        let chain = self.chain(chain_id)?;
        chain
            .state
            .reader(&self.store)
            .record(hash)?
            .ok_or(HeaderSyncError::HeaderNotFound(*hash))
    }
}

/// Process one raw header of a batch.
///
/// Returns `DuplicateHeader` for an already stored header; the caller treats
/// it as a skip.
fn apply_header<S: KeyValueStore>(
    config: &HeaderSyncConfig,
    store: &mut S,
    chain: &mut RegisteredChain,
    raw: &[u8],
    host_timestamp: Option<u64>,
    report: &mut SyncReport,
) -> Result<HeaderOutcome> {
    report.work_units += 1;
    let header = codec::decode(raw, chain.spec.encoding, config.max_header_size)?;
    let hash = header.hash();
    let state = &mut chain.state;

    if state.contains(store, &hash)? {
        return Err(HeaderSyncError::DuplicateHeader(hash));
    }

    let parent = state
        .reader(store)
        .record(&header.parent_hash)?
        .ok_or(HeaderSyncError::UnknownParent(header.parent_hash))?;

    PowValidator::new(chain.rules.as_ref(), config.allowed_future_secs).validate(
        &parent.header,
        &header,
        hash,
        host_timestamp,
    )?;

    let record = HeaderRecord::child_of(&parent, header);
    let tip = state
        .tip()
        .ok_or(HeaderSyncError::ChainNotBootstrapped(state.chain_id()))?;

    let plan = if is_heavier(record.difficulty_sum, tip.difficulty_sum) {
        Some(plan_reorg(
            &state.reader(store),
            &record,
            hash,
            tip.height,
            config.max_fork_depth,
        )?)
    } else {
        None
    };

    state.commit_header(store, &record, hash, plan.as_ref())?;

    if let Some(plan) = plan.as_ref().filter(|p| p.is_reorg()) {
        report.reorgs += 1;
        info!(
            chain_id = %state.chain_id(),
            ancestor = plan.ancestor_height,
            old_tip = plan.old_tip_height,
            new_tip = plan.new_tip_height,
            displaced = plan.displaced(),
            difficulty_sum = %record.difficulty_sum,
            "Reorganized canonical chain"
        );
    }
    debug!(
        chain_id = %state.chain_id(),
        number = record.number(),
        hash = ?hash,
        difficulty_sum = %record.difficulty_sum,
        canonical = plan.is_some(),
        "Accepted header"
    );

    Ok(HeaderOutcome::Accepted {
        hash,
        number: record.number(),
        canonical: plan.is_some(),
    })
}

impl<S: KeyValueStore> HeaderSyncApi for HeaderLedger<S> {
    fn sync_genesis_header(&mut self, param: SyncGenesisHeaderParam) -> Result<GenesisInfo> {
        let chain = self
            .chains
            .get_mut(&param.chain_id)
            .ok_or(HeaderSyncError::UnsupportedChain(param.chain_id))?;
        if chain.state.is_bootstrapped() {
            warn!(chain_id = %param.chain_id, "Genesis already set");
            return Err(HeaderSyncError::GenesisAlreadySet(param.chain_id));
        }

        let header = codec::decode(
            &param.genesis_header,
            chain.spec.encoding,
            self.config.max_header_size,
        )?;
        let hash = header.hash();
        let record = HeaderRecord::genesis(header);
        let genesis = chain.state.commit_genesis(&mut self.store, &record, hash)?;

        info!(
            chain_id = %param.chain_id,
            number = genesis.height,
            hash = ?hash,
            difficulty_sum = %record.difficulty_sum,
            "Genesis header set"
        );
        Ok(genesis)
    }

    fn sync_block_header(
        &mut self,
        param: SyncBlockHeaderParam,
    ) -> std::result::Result<SyncReport, SyncFailure> {
        let mut report = SyncReport::new(param.chain_id);
        let refuse = |error: HeaderSyncError, report: SyncReport| SyncFailure {
            index: None,
            error,
            report,
        };

        let Some(chain) = self.chains.get_mut(&param.chain_id) else {
            return Err(refuse(
                HeaderSyncError::UnsupportedChain(param.chain_id),
                report,
            ));
        };
        if !chain.state.is_bootstrapped() {
            return Err(refuse(
                HeaderSyncError::ChainNotBootstrapped(param.chain_id),
                report,
            ));
        }
        if param.headers.len() > self.config.max_batch_size {
            report.tip = chain.state.tip();
            return Err(refuse(
                HeaderSyncError::BatchTooLarge {
                    size: param.headers.len(),
                    limit: self.config.max_batch_size,
                },
                report,
            ));
        }

        for (index, raw) in param.headers.iter().enumerate() {
            match apply_header(
                &self.config,
                &mut self.store,
                chain,
                raw,
                param.host_timestamp,
                &mut report,
            ) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(HeaderSyncError::DuplicateHeader(hash)) => {
                    debug!(chain_id = %param.chain_id, hash = ?hash, "Skipped duplicate header");
                    report.outcomes.push(HeaderOutcome::Duplicate { hash });
                }
                Err(error) => {
                    warn!(
                        chain_id = %param.chain_id,
                        index,
                        error = %error,
                        "Rejected header"
                    );
                    report.tip = chain.state.tip();
                    return Err(SyncFailure {
                        index: Some(index),
                        error,
                        report,
                    });
                }
            }
        }

        report.tip = chain.state.tip();
        Ok(report)
    }
}

impl<S: KeyValueStore> HeaderQueryApi for HeaderLedger<S> {
    fn latest_height(&self, chain_id: ChainId) -> Result<u64> {
        Ok(self.chain(chain_id)?.state.current_height())
    }

    fn canonical_hash_at(&self, chain_id: ChainId, height: u64) -> Result<H256> {
        let chain = self.chain(chain_id)?;
        if height > chain.state.current_height() {
            return Err(HeaderSyncError::HeightNotFound(height));
        }
        chain
            .state
            .reader(&self.store)
            .canonical_hash(height)?
            .ok_or(HeaderSyncError::HeightNotFound(height))
    }

    fn header_by_hash(&self, chain_id: ChainId, hash: &H256) -> Result<SourceHeader> {
        Ok(self.record(chain_id, hash)?.header)
    }

    fn header_by_height(&self, chain_id: ChainId, height: u64) -> Result<SourceHeader> {
        let hash = self.canonical_hash_at(chain_id, height)?;
        self.header_by_hash(chain_id, &hash)
    }

    fn difficulty_sum(&self, chain_id: ChainId, hash: &H256) -> Result<U256> {
        Ok(self.record(chain_id, hash)?.difficulty_sum)
    }

    fn chain_tip(&self, chain_id: ChainId) -> Result<ChainTip> {
        self.chain(chain_id)?
            .state
            .tip()
            .ok_or(HeaderSyncError::ChainNotBootstrapped(chain_id))
    }

    fn genesis(&self, chain_id: ChainId) -> Result<GenesisInfo> {
        self.chain(chain_id)?
            .state
            .genesis()
            .ok_or(HeaderSyncError::ChainNotBootstrapped(chain_id))
    }

    fn is_bootstrapped(&self, chain_id: ChainId) -> bool {
        self.chains
            .get(&chain_id)
            .map_or(false, |chain| chain.state.is_bootstrapped())
    }
}
