//! # Outbound Ports
//!
//! Dependencies the ledger needs from its host.

use crate::domain::{KVStoreError, Result, SourceHeader};
use primitive_types::U256;

/// Key-value store abstraction.
///
/// The host ledger's storage substrate. The ledger owns every key under its
/// namespace; nothing else may write them while an operation runs.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> std::result::Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> std::result::Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> std::result::Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch are applied, or NONE are.
    fn atomic_batch_write(
        &mut self,
        operations: Vec<BatchOperation>,
    ) -> std::result::Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> std::result::Result<bool, KVStoreError>;

    /// All pairs whose key starts with `prefix`, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8])
        -> std::result::Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put {
        /// Key.
        key: Vec<u8>,
        /// Value.
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete {
        /// Key.
        key: Vec<u8>,
    },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Consensus rules of one source-chain family.
///
/// Selected per chain at registration and injected into the validator.
/// Implementations must be pure functions of their inputs.
pub trait ConsensusRules: Send + Sync {
    /// Short family name, used in logs.
    fn name(&self) -> &'static str;

    /// Family-specific field checks against the parent (gas, extra data,
    /// base fee and the like). Height and timestamp ordering are checked by
    /// the validator itself.
    fn verify_fields(&self, parent: &SourceHeader, header: &SourceHeader) -> Result<()>;

    /// Difficulty the header must declare, derived from its parent.
    fn expected_difficulty(&self, parent: &SourceHeader, header: &SourceHeader) -> U256;

    /// Whether the seal proof meets the declared difficulty.
    fn verify_seal(&self, header: &SourceHeader) -> bool;
}
