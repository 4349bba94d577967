//! # Batch Sync Flows
//!
//! `sync_block_header` end to end: linear extension, duplicates, partial
//! batches and the Ethash field rules.

#[cfg(test)]
mod tests {
    use primitive_types::U256;
    use qc_18_header_sync::test_utils::{
        batch_param, branch, child_header, ethash_ledger, genesis_header, genesis_param, mine,
        scripted_ledger, unseal, TEST_CHAIN_ID,
    };
    use qc_18_header_sync::{
        HeaderOutcome, HeaderQueryApi, HeaderSyncApi, HeaderSyncConfig, HeaderSyncError,
        SyncBlockHeaderParam,
    };

    #[test]
    fn test_linear_sync_in_several_batches() {
        super::super::init_tracing();
        let mut ledger = scripted_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(0, 8);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        let headers = branch(&genesis, &[8; 12], 1);
        for chunk in headers.chunks(5) {
            let report = ledger.sync_block_header(batch_param(chunk)).unwrap();
            assert_eq!(report.accepted(), chunk.len());
            assert!(report.outcomes.iter().all(|o| matches!(
                o,
                HeaderOutcome::Accepted { canonical: true, .. }
            )));
        }

        let tip = ledger.chain_tip(TEST_CHAIN_ID).unwrap();
        assert_eq!(tip.height, 12);
        assert_eq!(tip.difficulty_sum, U256::from(8 * 13));
        for header in &headers {
            assert_eq!(
                ledger.header_by_height(TEST_CHAIN_ID, header.number).unwrap(),
                *header
            );
        }
        ledger.check_invariants(TEST_CHAIN_ID).unwrap();
    }

    #[test]
    fn test_resubmitted_batch_is_noop() {
        let mut ledger = scripted_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(0, 8);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();
        let headers = branch(&genesis, &[8, 8, 8], 1);

        let first = ledger.sync_block_header(batch_param(&headers)).unwrap();
        let keys = ledger.store().len();
        let second = ledger.sync_block_header(batch_param(&headers)).unwrap();

        assert_eq!(second.duplicates(), 3);
        assert_eq!(second.tip, first.tip);
        assert_eq!(second.work_units, 3);
        assert_eq!(ledger.store().len(), keys);
    }

    #[test]
    fn test_failure_keeps_committed_prefix() {
        let mut ledger = scripted_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(0, 8);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        let mut headers = branch(&genesis, &[8, 8, 8, 8], 1);
        unseal(&mut headers[2]);
        let failure = ledger.sync_block_header(batch_param(&headers)).unwrap_err();

        assert_eq!(failure.index, Some(2));
        assert_eq!(failure.error, HeaderSyncError::InvalidSeal(headers[2].hash()));
        assert_eq!(failure.report.accepted(), 2);
        assert_eq!(failure.report.work_units, 3);
        assert_eq!(failure.report.tip.map(|t| t.height), Some(2));
        assert_eq!(ledger.latest_height(TEST_CHAIN_ID).unwrap(), 2);
        assert!(ledger.header_by_hash(TEST_CHAIN_ID, &headers[3].hash()).is_err());
    }

    #[test]
    fn test_height_gap_is_rejected() {
        let mut ledger = scripted_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(0, 8);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        let mut skipped = child_header(&genesis, 8, 1);
        skipped.number = 2;
        mine(&mut skipped);
        let failure = ledger
            .sync_block_header(batch_param(&[skipped]))
            .unwrap_err();
        assert_eq!(
            failure.error,
            HeaderSyncError::InvalidHeight {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_non_increasing_timestamp_is_rejected() {
        let mut ledger = scripted_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(0, 8);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        let mut stale = child_header(&genesis, 8, 1);
        stale.timestamp = genesis.timestamp;
        mine(&mut stale);
        let failure = ledger.sync_block_header(batch_param(&[stale])).unwrap_err();
        assert!(matches!(
            failure.error,
            HeaderSyncError::InvalidTimestamp { .. }
        ));
    }

    #[test]
    fn test_ethash_rules_chain() {
        let mut ledger = ethash_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(0, 512);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        let headers = branch(&genesis, &[512; 6], 7);
        let report = ledger.sync_block_header(batch_param(&headers)).unwrap();
        assert_eq!(report.accepted(), 6);
        assert_eq!(
            ledger.chain_tip(TEST_CHAIN_ID).unwrap().difficulty_sum,
            U256::from(512 * 7)
        );
    }

    #[test]
    fn test_ethash_rules_reject_gas_limit_jump() {
        let mut ledger = ethash_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(0, 512);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        let mut jump = child_header(&genesis, 512, 1);
        jump.gas_limit = genesis.gas_limit + genesis.gas_limit / 1024;
        mine(&mut jump);
        let failure = ledger.sync_block_header(batch_param(&[jump])).unwrap_err();
        assert!(matches!(
            failure.error,
            HeaderSyncError::InvalidGasLimit { .. }
        ));
    }

    #[test]
    fn test_ethash_rules_reject_long_extra_data() {
        let mut ledger = ethash_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(0, 512);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        let mut chatty = child_header(&genesis, 512, 1);
        chatty.extra_data = vec![0x42; 33];
        mine(&mut chatty);
        let failure = ledger.sync_block_header(batch_param(&[chatty])).unwrap_err();
        assert!(matches!(
            failure.error,
            HeaderSyncError::ExtraDataTooLarge { size: 33, limit: 32 }
        ));
    }

    #[test]
    fn test_garbage_bytes_are_malformed() {
        let mut ledger = scripted_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(0, 8);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        let failure = ledger
            .sync_block_header(SyncBlockHeaderParam {
                chain_id: TEST_CHAIN_ID,
                headers: vec![b"\x00\x01\x02".to_vec()],
                host_timestamp: None,
            })
            .unwrap_err();
        assert!(matches!(
            failure.error,
            HeaderSyncError::MalformedHeader(_)
        ));
        assert_eq!(failure.index, Some(0));
    }

    #[test]
    fn test_empty_batch() {
        let mut ledger = scripted_ledger(HeaderSyncConfig::for_testing());
        let genesis = genesis_header(0, 8);
        ledger.sync_genesis_header(genesis_param(&genesis)).unwrap();

        let report = ledger.sync_block_header(batch_param(&[])).unwrap();
        assert!(report.outcomes.is_empty());
        assert_eq!(report.tip.map(|t| t.hash), Some(genesis.hash()));
    }
}
