//! # Chain Sync State
//!
//! Typed view of one chain's keys in the store. Header records are append
//! only; the canonical index and the tip height are the only values that
//! change, and every change is written in a single atomic batch.

use crate::algorithms::{ChainView, ReorgPlan};
use crate::domain::keys;
use crate::domain::{
    invariant_canonical_segment, invariant_difficulty_sum, invariant_linked,
    invariant_tip_maximal, ChainId, ChainTip, GenesisInfo,
    HeaderRecord, HeaderSyncError, Result,
};
use crate::ports::{BatchOperation, KeyValueStore};
use primitive_types::{H256, U256};

/// Per-chain sync state, cached over the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainSyncState {
    chain_id: ChainId,
    genesis: Option<GenesisInfo>,
    tip: Option<ChainTip>,
}

/// [`ChainView`] over a store for one chain.
pub struct StoreReader<'a, S: ?Sized> {
    chain_id: ChainId,
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> StoreReader<'a, S> {
    /// Reader for `chain_id`.
    pub fn new(chain_id: ChainId, store: &'a S) -> Self {
        Self { chain_id, store }
    }
}

impl<S: KeyValueStore + ?Sized> ChainView for StoreReader<'_, S> {
    fn canonical_hash(&self, height: u64) -> Result<Option<H256>> {
        let Some(bytes) = self.store.get(&keys::main_chain_key(self.chain_id, height))? else {
            return Ok(None);
        };
        if bytes.len() != 32 {
            return Err(HeaderSyncError::Corrupted(format!(
                "canonical hash at {height} has {} bytes",
                bytes.len()
            )));
        }
        Ok(Some(H256::from_slice(&bytes)))
    }

    fn record(&self, hash: &H256) -> Result<Option<HeaderRecord>> {
        self.store
            .get(&keys::header_index_key(self.chain_id, hash))?
            .map(|bytes| HeaderRecord::from_bytes(&bytes))
            .transpose()
    }
}

impl ChainSyncState {
    /// Read a chain's state from the store. A chain without genesis loads as
    /// not bootstrapped.
    pub fn load<S: KeyValueStore + ?Sized>(chain_id: ChainId, store: &S) -> Result<Self> {
        let mut state = Self {
            chain_id,
            genesis: None,
            tip: None,
        };
        let Some(genesis_hash) = store.get(&keys::genesis_key(chain_id))? else {
            return Ok(state);
        };
        if genesis_hash.len() != 32 {
            return Err(HeaderSyncError::Corrupted("genesis hash length".to_string()));
        }
        let genesis_hash = H256::from_slice(&genesis_hash);
        let reader = state.reader(store);

        let genesis = reader
            .record(&genesis_hash)?
            .ok_or_else(|| HeaderSyncError::Corrupted("genesis record missing".to_string()))?;

        let height = store
            .get(&keys::current_height_key(chain_id))?
            .and_then(|bytes| keys::decode_height(&bytes))
            .ok_or_else(|| HeaderSyncError::Corrupted("current height missing".to_string()))?;
        let tip_hash = reader
            .canonical_hash(height)?
            .ok_or_else(|| HeaderSyncError::Corrupted(format!("no canonical hash at tip {height}")))?;
        let tip = reader
            .record(&tip_hash)?
            .ok_or_else(|| HeaderSyncError::Corrupted("tip record missing".to_string()))?;

        state.genesis = Some(GenesisInfo {
            hash: genesis_hash,
            height: genesis.number(),
        });
        state.tip = Some(ChainTip {
            hash: tip_hash,
            height,
            difficulty_sum: tip.difficulty_sum,
        });
        Ok(state)
    }

    /// Chain identifier.
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Whether genesis has been set.
    pub fn is_bootstrapped(&self) -> bool {
        self.genesis.is_some()
    }

    /// Trust anchor, once bootstrapped.
    pub fn genesis(&self) -> Option<GenesisInfo> {
        self.genesis
    }

    /// Canonical tip, once bootstrapped.
    pub fn tip(&self) -> Option<ChainTip> {
        self.tip
    }

    /// Tip height, 0 before bootstrap.
    pub fn current_height(&self) -> u64 {
        self.tip.map_or(0, |tip| tip.height)
    }

    /// Read view over `store`.
    pub fn reader<'a, S: KeyValueStore + ?Sized>(&self, store: &'a S) -> StoreReader<'a, S> {
        StoreReader::new(self.chain_id, store)
    }

    /// Whether a record exists under `hash`.
    pub fn contains<S: KeyValueStore + ?Sized>(&self, store: &S, hash: &H256) -> Result<bool> {
        Ok(store.exists(&keys::header_index_key(self.chain_id, hash))?)
    }

    /// Write the genesis record and anchor the index at its height.
    pub fn commit_genesis<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        record: &HeaderRecord,
        hash: H256,
    ) -> Result<GenesisInfo> {
        if self.genesis.is_some() {
            return Err(HeaderSyncError::GenesisAlreadySet(self.chain_id));
        }
        let height = record.number();
        store.atomic_batch_write(vec![
            BatchOperation::put(
                keys::header_index_key(self.chain_id, &hash),
                record.to_bytes()?,
            ),
            BatchOperation::put(keys::main_chain_key(self.chain_id, height), hash.as_bytes()),
            BatchOperation::put(
                keys::current_height_key(self.chain_id),
                keys::encode_height(height).to_vec(),
            ),
            BatchOperation::put(keys::genesis_key(self.chain_id), hash.as_bytes()),
        ])?;

        let genesis = GenesisInfo { hash, height };
        self.genesis = Some(genesis);
        self.tip = Some(ChainTip {
            hash,
            height,
            difficulty_sum: record.difficulty_sum,
        });
        Ok(genesis)
    }

    /// Write a validated record and, when it wins fork choice, the index
    /// changes of `plan`. One atomic batch.
    pub fn commit_header<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        record: &HeaderRecord,
        hash: H256,
        plan: Option<&ReorgPlan>,
    ) -> Result<()> {
        let mut operations = vec![BatchOperation::put(
            keys::header_index_key(self.chain_id, &hash),
            record.to_bytes()?,
        )];
        if let Some(plan) = plan {
            for (height, canonical) in &plan.assignments {
                operations.push(BatchOperation::put(
                    keys::main_chain_key(self.chain_id, *height),
                    canonical.as_bytes(),
                ));
            }
            for height in &plan.truncated {
                operations.push(BatchOperation::delete(keys::main_chain_key(
                    self.chain_id,
                    *height,
                )));
            }
            operations.push(BatchOperation::put(
                keys::current_height_key(self.chain_id),
                keys::encode_height(plan.new_tip_height).to_vec(),
            ));
        }
        store.atomic_batch_write(operations)?;

        if plan.is_some() {
            self.tip = Some(ChainTip {
                hash,
                height: record.number(),
                difficulty_sum: record.difficulty_sum,
            });
        }
        Ok(())
    }

    /// Full scan of the chain's keys against the state invariants:
    /// the canonical index is a contiguous linked run from genesis to the
    /// tip with folded weights, every stored record (side branches included)
    /// extends a stored parent with a folded weight, and no stored record
    /// outweighs the tip.
    pub fn check_invariants<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<()> {
        let (Some(genesis), Some(tip)) = (self.genesis, self.tip) else {
            return Ok(());
        };
        let reader = self.reader(store);

        let indexed = store.prefix_scan(&keys::main_chain_prefix(self.chain_id))?;
        let expected_len = tip.height - genesis.height + 1;
        if indexed.len() as u64 != expected_len {
            return Err(HeaderSyncError::Corrupted(format!(
                "canonical index has {} entries, expected {expected_len}",
                indexed.len()
            )));
        }

        let mut segment = Vec::with_capacity(indexed.len());
        for height in genesis.height..=tip.height {
            let hash = reader
                .canonical_hash(height)?
                .ok_or(HeaderSyncError::HeightNotFound(height))?;
            let record = reader
                .record(&hash)?
                .ok_or(HeaderSyncError::HeaderNotFound(hash))?;
            segment.push(record);
        }
        if segment.first().map(HeaderRecord::hash) != Some(genesis.hash) {
            return Err(HeaderSyncError::Corrupted("genesis not canonical".to_string()));
        }
        if segment.last().map(|r| r.difficulty_sum) != Some(tip.difficulty_sum) {
            return Err(HeaderSyncError::Corrupted("tip weight mismatch".to_string()));
        }
        invariant_canonical_segment(&segment)?;

        let records = store
            .prefix_scan(&keys::header_index_prefix(self.chain_id))?
            .into_iter()
            .map(|(_, bytes)| HeaderRecord::from_bytes(&bytes))
            .collect::<Result<Vec<HeaderRecord>>>()?;
        for record in records.iter().filter(|r| r.hash() != genesis.hash) {
            let parent = reader.record(&record.header.parent_hash)?.ok_or_else(|| {
                HeaderSyncError::Corrupted(format!(
                    "stored header {:?} has no stored parent",
                    record.hash()
                ))
            })?;
            if !invariant_linked(&parent, record) {
                return Err(HeaderSyncError::Corrupted(format!(
                    "stored header {:?} does not extend its parent",
                    record.hash()
                )));
            }
            if !invariant_difficulty_sum(&parent, record) {
                return Err(HeaderSyncError::Corrupted(format!(
                    "difficulty sum of stored header {:?} does not fold",
                    record.hash()
                )));
            }
        }

        let weights: Vec<U256> = records.iter().map(|r| r.difficulty_sum).collect();
        invariant_tip_maximal(tip.difficulty_sum, &weights)
    }
}
