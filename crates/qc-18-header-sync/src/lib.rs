//! # QC-18 Header Sync
//!
//! Proof-of-work source-chain header relay: validation, difficulty
//! accounting and fork choice.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Let this ledger hold a verifiable view of another proof-of-work chain
//! without running a node of it. Relayers submit raw headers; each one is
//! checked for linkage, difficulty and seal, weighted by cumulative
//! difficulty, and the heaviest branch is kept as a height-indexed canonical
//! chain that cross-chain logic treats as ground truth.
//!
//! ## Guarantees
//!
//! | Property | Enforcement |
//! |----------|-------------|
//! | One genesis per chain | `GenesisAlreadySet` on a second bootstrap |
//! | Weight fold | `difficulty_sum = parent.difficulty_sum + difficulty` |
//! | Heaviest tip | strict `>`; ties keep the first-seen tip |
//! | Contiguous index | reorgs rewrite and truncate in one atomic batch |
//! | Bounded work | `max_fork_depth`, `max_batch_size`, `max_header_size` |
//! | Determinism | integer math only, host-supplied time only |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-header-sync/
//! ├── domain/          # SourceHeader, HeaderRecord, errors, keys, invariants
//! ├── codec/           # JSON + RLP wire formats, content and seal hashes
//! ├── algorithms/      # Difficulty, Ethash, validation, fork choice
//! ├── ports/           # Sync/query API (inbound) + store/rules (outbound)
//! ├── adapters/        # InMemoryKVStore, EthashRules
//! ├── application/     # HeaderLedger, ChainSyncState
//! └── config.rs        # HeaderSyncConfig, ChainSpec, EthashConfig
//! ```
//!
//! ## Example
//!
//! ```
//! use qc_18_header_sync::{
//!     ChainSpec, EthashRules, HeaderLedger, HeaderQueryApi, HeaderSyncApi,
//!     HeaderSyncConfig, InMemoryKVStore, SyncGenesisHeaderParam, ChainId,
//! };
//!
//! let mut ledger = HeaderLedger::new(HeaderSyncConfig::default(), InMemoryKVStore::new());
//! ledger
//!     .register_chain(ChainSpec::new(2u64, "ethereum"), Box::new(EthashRules::mainnet()))
//!     .unwrap();
//! assert!(!ledger.is_bootstrapped(ChainId(2)));
//! assert_eq!(ledger.latest_height(ChainId(2)).unwrap(), 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod codec;
pub mod config;
pub mod domain;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use adapters::{EthashRules, InMemoryKVStore};
pub use algorithms::{DifficultyCalculator, PowValidator, ReorgPlan};
pub use application::{ChainSyncState, HeaderLedger};
pub use codec::HeaderEncoding;
pub use config::{ChainSpec, EthashConfig, HeaderSyncConfig};
pub use domain::{
    BlockNonce, Bloom, ChainId, ChainTip, DecodeError, GenesisInfo, HeaderOutcome,
    HeaderRecord, HeaderSyncError, KVStoreError, Result, SourceHeader, SyncBlockHeaderParam,
    SyncFailure, SyncGenesisHeaderParam, SyncReport,
};
pub use ports::{BatchOperation, ConsensusRules, HeaderQueryApi, HeaderSyncApi, KeyValueStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
