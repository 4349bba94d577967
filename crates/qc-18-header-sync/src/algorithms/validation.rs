//! Proof-of-work header validation.
//!
//! Checks run in a fixed order so a bad header is always rejected with the
//! same error:
//!
//! 1. height follows the parent
//! 2. timestamp after the parent and within the host bound
//! 3. family field rules
//! 4. declared difficulty equals the adjustment rule
//! 5. seal meets the declared difficulty

use crate::domain::{HeaderSyncError, Result, SourceHeader};
use crate::ports::ConsensusRules;
use primitive_types::H256;

/// Validates a header against its stored parent.
pub struct PowValidator<'a> {
    rules: &'a dyn ConsensusRules,
    allowed_future_secs: u64,
}

impl<'a> PowValidator<'a> {
    /// Validator over a family's rules.
    pub fn new(rules: &'a dyn ConsensusRules, allowed_future_secs: u64) -> Self {
        Self {
            rules,
            allowed_future_secs,
        }
    }

    /// Run every check. `hash` is the header's content hash, reported on
    /// seal failure.
    pub fn validate(
        &self,
        parent: &SourceHeader,
        header: &SourceHeader,
        hash: H256,
        host_timestamp: Option<u64>,
    ) -> Result<()> {
        check_height(parent, header)?;
        check_timestamp(parent, header, host_timestamp, self.allowed_future_secs)?;
        self.rules.verify_fields(parent, header)?;
        self.check_difficulty(parent, header)?;
        if !self.rules.verify_seal(header) {
            return Err(HeaderSyncError::InvalidSeal(hash));
        }
        Ok(())
    }

    fn check_difficulty(&self, parent: &SourceHeader, header: &SourceHeader) -> Result<()> {
        let expected = self.rules.expected_difficulty(parent, header);
        if header.difficulty != expected {
            return Err(HeaderSyncError::InvalidDifficulty {
                expected,
                actual: header.difficulty,
            });
        }
        Ok(())
    }
}

/// Header number must be exactly the parent's plus one.
pub fn check_height(parent: &SourceHeader, header: &SourceHeader) -> Result<()> {
    let expected = parent.number.checked_add(1).ok_or(HeaderSyncError::InvalidHeight {
        expected: u64::MAX,
        actual: header.number,
    })?;
    if header.number != expected {
        return Err(HeaderSyncError::InvalidHeight {
            expected,
            actual: header.number,
        });
    }
    Ok(())
}

/// Timestamp strictly after the parent, and not beyond
/// `host_timestamp + allowed_future_secs` when host time is known.
pub fn check_timestamp(
    parent: &SourceHeader,
    header: &SourceHeader,
    host_timestamp: Option<u64>,
    allowed_future_secs: u64,
) -> Result<()> {
    if header.timestamp <= parent.timestamp {
        return Err(HeaderSyncError::InvalidTimestamp {
            timestamp: header.timestamp,
            reason: format!("not after parent timestamp {}", parent.timestamp),
        });
    }
    if let Some(host) = host_timestamp {
        let limit = host.saturating_add(allowed_future_secs);
        if header.timestamp > limit {
            return Err(HeaderSyncError::InvalidTimestamp {
                timestamp: header.timestamp,
                reason: format!("more than {allowed_future_secs}s ahead of host time {host}"),
            });
        }
    }
    Ok(())
}
