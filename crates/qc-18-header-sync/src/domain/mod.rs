//! # Domain Module
//!
//! Core domain types for Header Sync.

pub mod errors;
pub mod header;
pub mod invariants;
pub mod keys;
pub mod record;
pub mod value_objects;

pub use errors::*;
pub use header::*;
pub use invariants::*;
pub use record::*;
pub use value_objects::*;
