//! # Adapters Module
//!
//! Implementations of the outbound ports.

pub mod ethash_rules;
pub mod memory;

pub use ethash_rules::EthashRules;
pub use memory::InMemoryKVStore;
