//! # Multiple Source Chains
//!
//! Chains registered on one ledger share the store but never each other's
//! state.

#[cfg(test)]
mod tests {
    use qc_18_header_sync::test_utils::{branch, encode_all, genesis_header, ScriptedRules};
    use qc_18_header_sync::{
        ChainId, ChainSpec, EthashConfig, EthashRules, HeaderEncoding, HeaderLedger,
        HeaderQueryApi, HeaderSyncApi, HeaderSyncConfig, HeaderSyncError, InMemoryKVStore,
        SyncBlockHeaderParam, SyncGenesisHeaderParam,
    };

    const JSON_CHAIN: ChainId = ChainId(10);
    const RLP_CHAIN: ChainId = ChainId(20);

    fn two_chain_ledger() -> HeaderLedger<InMemoryKVStore> {
        let mut ledger = HeaderLedger::new(HeaderSyncConfig::for_testing(), InMemoryKVStore::new());
        ledger
            .register_chain(
                ChainSpec::new(JSON_CHAIN, "json-chain"),
                Box::new(ScriptedRules::new()),
            )
            .unwrap();
        ledger
            .register_chain(
                ChainSpec::new(RLP_CHAIN, "rlp-chain").with_encoding(HeaderEncoding::Rlp),
                Box::new(EthashRules::new(EthashConfig::for_testing())),
            )
            .unwrap();
        ledger
    }

    fn submit(
        ledger: &mut HeaderLedger<InMemoryKVStore>,
        chain_id: ChainId,
        encoding: HeaderEncoding,
        headers: &[qc_18_header_sync::SourceHeader],
    ) {
        ledger
            .sync_block_header(SyncBlockHeaderParam {
                chain_id,
                headers: encode_all(headers, encoding),
                host_timestamp: None,
            })
            .unwrap();
    }

    #[test]
    fn test_chains_are_independent() {
        let mut ledger = two_chain_ledger();
        // The same genesis header anchors both chains.
        let genesis = genesis_header(0, 64);
        for (chain_id, encoding) in [
            (JSON_CHAIN, HeaderEncoding::Json),
            (RLP_CHAIN, HeaderEncoding::Rlp),
        ] {
            ledger
                .sync_genesis_header(SyncGenesisHeaderParam {
                    chain_id,
                    genesis_header: qc_18_header_sync::codec::encode(&genesis, encoding),
                })
                .unwrap();
        }

        submit(
            &mut ledger,
            JSON_CHAIN,
            HeaderEncoding::Json,
            &branch(&genesis, &[64; 5], 1),
        );
        submit(
            &mut ledger,
            RLP_CHAIN,
            HeaderEncoding::Rlp,
            &branch(&genesis, &[64; 2], 2),
        );

        assert_eq!(ledger.latest_height(JSON_CHAIN).unwrap(), 5);
        assert_eq!(ledger.latest_height(RLP_CHAIN).unwrap(), 2);
        assert_ne!(
            ledger.canonical_hash_at(JSON_CHAIN, 1).unwrap(),
            ledger.canonical_hash_at(RLP_CHAIN, 1).unwrap()
        );
        assert_eq!(
            ledger.chains().collect::<Vec<_>>(),
            vec![JSON_CHAIN, RLP_CHAIN]
        );
        ledger.check_invariants(JSON_CHAIN).unwrap();
        ledger.check_invariants(RLP_CHAIN).unwrap();
    }

    #[test]
    fn test_header_of_one_chain_is_unknown_on_another() {
        let mut ledger = two_chain_ledger();
        let genesis_a = genesis_header(0, 64);
        let genesis_b = genesis_header(1, 64);
        ledger
            .sync_genesis_header(SyncGenesisHeaderParam {
                chain_id: JSON_CHAIN,
                genesis_header: qc_18_header_sync::codec::encode_json(&genesis_a),
            })
            .unwrap();
        ledger
            .sync_genesis_header(SyncGenesisHeaderParam {
                chain_id: RLP_CHAIN,
                genesis_header: qc_18_header_sync::codec::encode_rlp(&genesis_b),
            })
            .unwrap();

        let on_a = branch(&genesis_a, &[64], 1);
        let failure = ledger
            .sync_block_header(SyncBlockHeaderParam {
                chain_id: RLP_CHAIN,
                headers: encode_all(&on_a, HeaderEncoding::Rlp),
                host_timestamp: None,
            })
            .unwrap_err();
        assert_eq!(failure.error, HeaderSyncError::UnknownParent(genesis_a.hash()));
        assert!(ledger
            .header_by_hash(RLP_CHAIN, &genesis_a.hash())
            .is_err());
    }

    #[test]
    fn test_wrong_encoding_is_malformed() {
        let mut ledger = two_chain_ledger();
        let genesis = genesis_header(0, 64);
        let err = ledger
            .sync_genesis_header(SyncGenesisHeaderParam {
                chain_id: RLP_CHAIN,
                genesis_header: qc_18_header_sync::codec::encode_json(&genesis),
            })
            .unwrap_err();
        assert!(matches!(err, HeaderSyncError::MalformedHeader(_)));
    }

    #[test]
    fn test_state_survives_ledger_rebuild() {
        let mut ledger = two_chain_ledger();
        let genesis = genesis_header(0, 64);
        ledger
            .sync_genesis_header(SyncGenesisHeaderParam {
                chain_id: JSON_CHAIN,
                genesis_header: qc_18_header_sync::codec::encode_json(&genesis),
            })
            .unwrap();
        submit(
            &mut ledger,
            JSON_CHAIN,
            HeaderEncoding::Json,
            &branch(&genesis, &[64; 3], 1),
        );
        let tip = ledger.chain_tip(JSON_CHAIN).unwrap();

        let mut rebuilt =
            HeaderLedger::new(HeaderSyncConfig::for_testing(), ledger.into_store());
        rebuilt
            .register_chain(
                ChainSpec::new(JSON_CHAIN, "json-chain"),
                Box::new(ScriptedRules::new()),
            )
            .unwrap();
        assert_eq!(rebuilt.chain_tip(JSON_CHAIN).unwrap(), tip);
        assert!(rebuilt.latest_height(RLP_CHAIN).is_err());
    }
}
