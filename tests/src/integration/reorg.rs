//! # Fork Choice and Reorganization
//!
//! Heaviest-chain selection across competing branches. The canonical
//! index must always be the contiguous path from genesis to the stored
//! header with the largest difficulty sum.

#[cfg(test)]
mod tests {
    use primitive_types::{H256, U256};
    use proptest::prelude::*;
    use qc_18_header_sync::test_utils::{
        batch_param, branch, child_header, genesis_header, genesis_param, scripted_ledger,
        TEST_CHAIN_ID,
    };
    use qc_18_header_sync::{
        HeaderLedger, HeaderQueryApi, HeaderSyncApi, HeaderSyncConfig, HeaderSyncError,
        InMemoryKVStore, SourceHeader,
    };

    fn canonical(ledger: &HeaderLedger<InMemoryKVStore>) -> Vec<H256> {
        let genesis = ledger.genesis(TEST_CHAIN_ID).unwrap().height;
        let tip = ledger.latest_height(TEST_CHAIN_ID).unwrap();
        (genesis..=tip)
            .map(|h| ledger.canonical_hash_at(TEST_CHAIN_ID, h).unwrap())
            .collect()
    }

    fn hashes(headers: &[SourceHeader]) -> Vec<H256> {
        headers.iter().map(SourceHeader::hash).collect()
    }

    #[test]
    fn test_heavier_branch_wins_over_taller() {
        super::super::init_tracing();
        let mut ledger = scripted_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(100, 10);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        let branch_a = branch(&genesis, &[10, 10], 0xa);
        let branch_b = branch(&genesis, &[5, 5, 5], 0xb);
        ledger.sync_block_header(batch_param(&branch_a)).unwrap();
        ledger.sync_block_header(batch_param(&branch_b)).unwrap();

        let tip = ledger.chain_tip(TEST_CHAIN_ID).unwrap();
        assert_eq!(tip.height, 102);
        assert_eq!(tip.difficulty_sum, U256::from(30));
        let mut expected = vec![genesis.hash()];
        expected.extend(hashes(&branch_a));
        assert_eq!(canonical(&ledger), expected);

        let b_tip = child_header(&branch_b[2], 10, 0xb);
        let report = ledger
            .sync_block_header(batch_param(std::slice::from_ref(&b_tip)))
            .unwrap();
        assert_eq!(report.reorgs, 1);

        let tip = ledger.chain_tip(TEST_CHAIN_ID).unwrap();
        assert_eq!(tip.hash, b_tip.hash());
        assert_eq!(tip.difficulty_sum, U256::from(35));
        let mut expected = vec![genesis.hash()];
        expected.extend(hashes(&branch_b));
        expected.push(b_tip.hash());
        assert_eq!(canonical(&ledger), expected);
        ledger.check_invariants(TEST_CHAIN_ID).unwrap();
    }

    #[test]
    fn test_reorg_inside_one_batch() {
        let mut ledger = scripted_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(0, 4);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        let light = branch(&genesis, &[1, 1, 1], 1);
        let heavy = branch(&genesis, &[2, 2], 2);
        let mut batch = light.clone();
        batch.extend(heavy.iter().cloned());

        let report = ledger.sync_block_header(batch_param(&batch)).unwrap();
        assert_eq!(report.accepted(), 5);
        assert_eq!(report.reorgs, 1);
        // The heavy branch takes over only once its sum passes 7.
        let tip = report.tip.unwrap();
        assert_eq!(tip.hash, heavy[1].hash());
        assert_eq!(ledger.latest_height(TEST_CHAIN_ID).unwrap(), 2);
        assert!(matches!(
            ledger.canonical_hash_at(TEST_CHAIN_ID, 3),
            Err(HeaderSyncError::HeightNotFound(3))
        ));
    }

    #[test]
    fn test_switch_back_and_forth() {
        let mut ledger = scripted_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(0, 4);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        let mut left = branch(&genesis, &[3], 1);
        let mut right = branch(&genesis, &[2], 2);
        ledger.sync_block_header(batch_param(&left)).unwrap();
        ledger.sync_block_header(batch_param(&right)).unwrap();

        let mut reorgs = 0;
        for round in 0..4u64 {
            let (grow, difficulty) = if round % 2 == 0 {
                (&mut right, 3)
            } else {
                (&mut left, 3)
            };
            let next = child_header(grow.last().unwrap(), difficulty, round + 10);
            reorgs += ledger
                .sync_block_header(batch_param(std::slice::from_ref(&next)))
                .unwrap()
                .reorgs;
            grow.push(next);
            ledger.check_invariants(TEST_CHAIN_ID).unwrap();
        }
        assert_eq!(reorgs, 4);
    }

    #[test]
    fn test_deep_fork_is_refused() {
        let mut config = HeaderSyncConfig::for_testing();
        config.max_fork_depth = 4;
        let mut ledger = scripted_ledger(config);
        let genesis = genesis_header(0, 4);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        ledger
            .sync_block_header(batch_param(&branch(&genesis, &[1; 6], 1)))
            .unwrap();
        let tip = ledger.chain_tip(TEST_CHAIN_ID).unwrap();

        let rival = branch(&genesis, &[50], 2);
        let failure = ledger.sync_block_header(batch_param(&rival)).unwrap_err();
        assert_eq!(
            failure.error,
            HeaderSyncError::ForkTooDeep { depth: 6, limit: 4 }
        );
        assert_eq!(ledger.chain_tip(TEST_CHAIN_ID).unwrap(), tip);

        // A lighter sibling at the same depth is just stored.
        let sibling = branch(&genesis, &[1], 3);
        let report = ledger.sync_block_header(batch_param(&sibling)).unwrap();
        assert_eq!(report.accepted(), 1);
        assert_eq!(ledger.chain_tip(TEST_CHAIN_ID).unwrap(), tip);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_tip_is_heaviest_stored_header(
            plan in prop::collection::vec((0usize..64, 1u64..8), 1..24),
            batch_size in 1usize..6,
        ) {
            let mut config = HeaderSyncConfig::for_testing();
            config.max_fork_depth = 64;
            let mut ledger = scripted_ledger(config);
            let genesis = genesis_header(0, 1);
            ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

            // Parents are always earlier entries, so any batching order links.
            let mut headers: Vec<SourceHeader> = Vec::new();
            for (salt, (pick, difficulty)) in plan.into_iter().enumerate() {
                let parent = if headers.is_empty() || pick % (headers.len() + 1) == 0 {
                    genesis.clone()
                } else {
                    headers[pick % headers.len()].clone()
                };
                headers.push(child_header(&parent, difficulty, salt as u64));
            }
            for chunk in headers.chunks(batch_size) {
                ledger.sync_block_header(batch_param(chunk)).unwrap();
            }

            prop_assert!(ledger.check_invariants(TEST_CHAIN_ID).is_ok());
            let heaviest = headers
                .iter()
                .map(|h| ledger.difficulty_sum(TEST_CHAIN_ID, &h.hash()).unwrap())
                .chain(std::iter::once(U256::one()))
                .max()
                .unwrap();
            prop_assert_eq!(
                ledger.chain_tip(TEST_CHAIN_ID).unwrap().difficulty_sum,
                heaviest
            );
        }
    }
}
