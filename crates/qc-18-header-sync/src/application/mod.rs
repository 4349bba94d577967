//! # Application Layer
//!
//! Services implementing the inbound ports.

pub mod chain_state;
pub mod ledger;

pub use chain_state::{ChainSyncState, StoreReader};
pub use ledger::HeaderLedger;
