//! Ethereum difficulty adjustment.
//!
//! Every supported era moves the parent difficulty by a multiple of
//! `parent / 2048` chosen from the block time, floors the result at the
//! minimum difficulty, and adds the exponential "bomb" term:
//!
//! | Era | Step factor | Bomb input |
//! |-----|-------------|------------|
//! | Frontier | `+1` if `Δt < 13`, else `-1` | `parent.number + 1` |
//! | Homestead (EIP-2) | `max(1 - Δt/10, -99)` | `parent.number + 1` |
//! | Byzantium+ (EIP-100) | `max(y - Δt/9, -99)`, `y = 2` with uncles | delayed "fake" number |
//!
//! All arithmetic is integer U256. No floating point, no wall clock.

use crate::config::EthashConfig;
use crate::domain::SourceHeader;
use primitive_types::U256;

/// Blocks per bomb period.
const EXP_DIFF_PERIOD: u64 = 100_000;

/// Lowest step factor of the Homestead and Byzantium formulas.
const MIN_STEP_FACTOR: i64 = -99;

/// Difficulty-adjustment era selected by fork schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DifficultyEra {
    /// Original launch rules.
    Frontier,
    /// EIP-2.
    Homestead,
    /// EIP-100 with the given bomb delay in blocks.
    Byzantium {
        /// How far the bomb is pushed back.
        bomb_delay: u64,
    },
}

/// Difficulty adjustment calculator.
#[derive(Clone, Debug)]
pub struct DifficultyCalculator {
    config: EthashConfig,
}

impl DifficultyCalculator {
    /// Create a new calculator for a fork schedule.
    pub fn new(config: EthashConfig) -> Self {
        Self { config }
    }

    /// Fork schedule in use.
    pub fn config(&self) -> &EthashConfig {
        &self.config
    }

    /// Era governing the block at `number`.
    pub fn era(&self, number: u64) -> DifficultyEra {
        let c = &self.config;
        let delays = [
            (c.gray_glacier_block, 11_400_000),
            (c.arrow_glacier_block, 10_700_000),
            (c.london_block, 9_700_000),
            (c.muir_glacier_block, 9_000_000),
            (c.constantinople_block, 5_000_000),
            (c.byzantium_block, 3_000_000),
        ];
        if let Some((_, bomb_delay)) = delays
            .iter()
            .find(|(fork, _)| EthashConfig::is_active(*fork, number))
        {
            return DifficultyEra::Byzantium {
                bomb_delay: *bomb_delay,
            };
        }
        if EthashConfig::is_active(c.homestead_block, number) {
            DifficultyEra::Homestead
        } else {
            DifficultyEra::Frontier
        }
    }

    /// Difficulty required of a child of `parent` sealed at `timestamp`.
    pub fn calculate(&self, parent: &SourceHeader, timestamp: u64) -> U256 {
        let number = parent.number.saturating_add(1);
        let elapsed = timestamp.saturating_sub(parent.timestamp);

        let (factor, bomb_number) = match self.era(number) {
            DifficultyEra::Frontier => {
                let factor = if elapsed < self.config.duration_limit { 1 } else { -1 };
                (factor, number)
            }
            DifficultyEra::Homestead => (step_factor(1, elapsed, 10), number),
            DifficultyEra::Byzantium { bomb_delay } => {
                let base = if parent.has_uncles() { 2 } else { 1 };
                let fake = parent.number.saturating_sub(bomb_delay - 1);
                (step_factor(base, elapsed, 9), fake)
            }
        };

        let step = parent.difficulty / U256::from(self.config.difficulty_bound_divisor);
        let magnitude = step.saturating_mul(U256::from(factor.unsigned_abs()));
        let adjusted = if factor >= 0 {
            parent.difficulty.saturating_add(magnitude)
        } else {
            parent.difficulty.saturating_sub(magnitude)
        };

        adjusted
            .max(self.config.minimum_difficulty)
            .saturating_add(bomb(bomb_number))
    }
}

/// `max(base - elapsed / divisor, -99)` without overflow on huge gaps.
fn step_factor(base: i64, elapsed: u64, divisor: u64) -> i64 {
    let steps = (elapsed / divisor).min(1_000) as i64;
    (base - steps).max(MIN_STEP_FACTOR)
}

/// Exponential term: `2^(period - 2)` once `period = number / 100000` exceeds 1.
fn bomb(number: u64) -> U256 {
    let period = number / EXP_DIFF_PERIOD;
    if period <= 1 {
        return U256::zero();
    }
    let exponent = period - 2;
    if exponent >= 256 {
        U256::MAX
    } else {
        U256::one() << exponent as usize
    }
}
