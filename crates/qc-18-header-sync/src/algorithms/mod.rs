//! # Algorithms Module
//!
//! Difficulty adjustment, Ethash seal checks, header validation and fork
//! choice. Everything here is pure: no storage writes, no clock.

pub mod difficulty;
pub mod ethash;
pub mod fork_choice;
pub mod validation;

pub use difficulty::{DifficultyCalculator, DifficultyEra};
pub use fork_choice::{plan_reorg, ChainView, ReorgPlan};
pub use validation::{check_height, check_timestamp, PowValidator};
