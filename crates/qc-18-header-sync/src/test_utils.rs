//! Test fixtures: header builders, nonce mining and scripted consensus rules.
//!
//! Enabled for unit tests and, through the `test-utils` feature, for the
//! workspace test crate.

use crate::adapters::{EthashRules, InMemoryKVStore};
use crate::algorithms::ethash;
use crate::application::HeaderLedger;
use crate::codec::{self, HeaderEncoding};
use crate::config::{ChainSpec, EthashConfig, HeaderSyncConfig};
use crate::domain::{
    BlockNonce, ChainId, Result, SourceHeader, SyncBlockHeaderParam, SyncGenesisHeaderParam,
    EMPTY_UNCLE_HASH,
};
use crate::ports::ConsensusRules;
use primitive_types::{H160, H256, U256};

/// Ropsten testnet block 7152785 as served by `eth_getBlockByNumber`.
pub const ROPSTEN_7152785_JSON: &str = r#"{"parentHash":"0x7c172ba9dd87c61cae1d1ba01bb95cf5806de185e9fa0010e417eff5155c56e7","sha3Uncles":"0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347","miner":"0x635b4764d1939dfacd3a8014726159abc277becc","stateRoot":"0x86b37edf1b457f5f96d31b09c48e0a3e8c378aa8fe18c1b41431631b07d40491","transactionsRoot":"0x5bfc93e6da42c81841497f6e807b7716aaa0d1429a2110e6a27775f3f1758456","receiptsRoot":"0x90530db01ea7acdf0d0a3425649444c36303e82164dac405204de89c875e2cdd","logsBloom":"0xb00018400000004200000144000000080000000080000000008009000004000000000001000000006010820000010000000000000800010800800804012000100080080000010000000000084000200080010000000000000000400000000010400200000208200000000004000008000000000000000002000080100108004100000800000000080420000002000003000010020000000002000010010000000200020000000000000100001000000000000002000000000080a0000103000000000082000000140080200000001000000004000000040001000000060020100010000420004020000002018080000000004000005800000200000002200080","difficulty":"0x102e560c","number":"0x6d2491","gasLimit":"0x7a121d","gasUsed":"0x630c56","timestamp":"0x5e241bd4","extraData":"0xde8302050d8f5061726974792d457468657265756d86312e33382e30826c69","mixHash":"0x78f78db4ee5123a98e063af39dfcf9ec4d38c7798447db2258fe822647a13d4e","nonce":"0x27a28123f193ef49","hash":"0x90a1bc9c5f2e29ce1f605b23f3fa6bb064fdbe553a8162bfdfa3b9bb8d0600e7"}"#;

/// Content hash of [`ROPSTEN_7152785_JSON`].
pub const ROPSTEN_7152785_HASH: &str =
    "90a1bc9c5f2e29ce1f605b23f3fa6bb064fdbe553a8162bfdfa3b9bb8d0600e7";

/// Chain id used by the fixture ledgers.
pub const TEST_CHAIN_ID: ChainId = ChainId(2);

/// Gas limit of built headers.
pub const TEST_GAS_LIMIT: u64 = 8_000_000;

/// Seconds between built headers.
pub const BLOCK_TIME: u64 = 13;

/// Rules that trust the declared difficulty (or a fixed one) and check the
/// real Ethash seal. Lets tests pick branch weights freely.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRules {
    fixed: Option<U256>,
}

impl ScriptedRules {
    /// Expect whatever difficulty the header declares.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect a constant difficulty.
    pub fn fixed(difficulty: U256) -> Self {
        Self {
            fixed: Some(difficulty),
        }
    }
}

impl ConsensusRules for ScriptedRules {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn verify_fields(&self, _parent: &SourceHeader, _header: &SourceHeader) -> Result<()> {
        Ok(())
    }

    fn expected_difficulty(&self, _parent: &SourceHeader, header: &SourceHeader) -> U256 {
        self.fixed.unwrap_or(header.difficulty)
    }

    fn verify_seal(&self, header: &SourceHeader) -> bool {
        ethash::verify_seal(header)
    }
}

/// Search nonces from the current one until the seal is valid.
///
/// Test difficulties are tiny, so this takes a handful of hashes.
pub fn mine(header: &mut SourceHeader) {
    assert!(!header.difficulty.is_zero(), "cannot mine zero difficulty");
    while !ethash::verify_seal(header) {
        header.nonce = BlockNonce::from(header.nonce.to_u64().wrapping_add(1));
    }
}

/// Search nonces from the current one until the seal is invalid.
pub fn unseal(header: &mut SourceHeader) {
    assert!(header.difficulty > U256::one(), "difficulty 1 accepts every seal");
    while ethash::verify_seal(header) {
        header.nonce = BlockNonce::from(header.nonce.to_u64().wrapping_add(1));
    }
}

/// A mined header suitable as a genesis anchor.
pub fn genesis_header(number: u64, difficulty: u64) -> SourceHeader {
    let mut header = SourceHeader {
        uncle_hash: EMPTY_UNCLE_HASH,
        coinbase: H160::repeat_byte(0xcb),
        state_root: H256::repeat_byte(0x01),
        difficulty: U256::from(difficulty),
        number,
        gas_limit: TEST_GAS_LIMIT,
        timestamp: 1_600_000_000 + number * BLOCK_TIME,
        ..Default::default()
    };
    mine(&mut header);
    header
}

/// A mined child of `parent`. `salt` goes into the extra data so sibling
/// branches get distinct hashes.
pub fn child_header(parent: &SourceHeader, difficulty: u64, salt: u64) -> SourceHeader {
    let mut header = SourceHeader {
        parent_hash: parent.hash(),
        uncle_hash: EMPTY_UNCLE_HASH,
        coinbase: parent.coinbase,
        state_root: parent.state_root,
        difficulty: U256::from(difficulty),
        number: parent.number + 1,
        gas_limit: parent.gas_limit,
        timestamp: parent.timestamp + BLOCK_TIME,
        extra_data: salt.to_be_bytes().to_vec(),
        ..Default::default()
    };
    mine(&mut header);
    header
}

/// A mined run of headers on top of `parent`, one per difficulty.
pub fn branch(parent: &SourceHeader, difficulties: &[u64], salt: u64) -> Vec<SourceHeader> {
    let mut headers: Vec<SourceHeader> = Vec::with_capacity(difficulties.len());
    for &difficulty in difficulties {
        let tip = headers.last().unwrap_or(parent);
        let child = child_header(tip, difficulty, salt);
        headers.push(child);
    }
    headers
}

/// Encode every header for submission.
pub fn encode_all(headers: &[SourceHeader], encoding: HeaderEncoding) -> Vec<Vec<u8>> {
    headers
        .iter()
        .map(|header| codec::encode(header, encoding))
        .collect()
}

/// Genesis call for the fixture chain.
pub fn genesis_param(header: &SourceHeader) -> SyncGenesisHeaderParam {
    SyncGenesisHeaderParam {
        chain_id: TEST_CHAIN_ID,
        genesis_header: codec::encode_json(header),
    }
}

/// Batch call for the fixture chain.
pub fn batch_param(headers: &[SourceHeader]) -> SyncBlockHeaderParam {
    SyncBlockHeaderParam {
        chain_id: TEST_CHAIN_ID,
        headers: encode_all(headers, HeaderEncoding::Json),
        host_timestamp: None,
    }
}

/// Ledger with [`TEST_CHAIN_ID`] registered under [`ScriptedRules`].
pub fn scripted_ledger(config: HeaderSyncConfig) -> HeaderLedger<InMemoryKVStore> {
    let mut ledger = HeaderLedger::new(config, InMemoryKVStore::new());
    ledger
        .register_chain(
            ChainSpec::new(TEST_CHAIN_ID, "scripted"),
            Box::new(ScriptedRules::new()),
        )
        .expect("in-memory registration");
    ledger
}

/// Ledger with [`TEST_CHAIN_ID`] registered under Ethash testing rules.
pub fn ethash_ledger(config: HeaderSyncConfig) -> HeaderLedger<InMemoryKVStore> {
    let mut ledger = HeaderLedger::new(config, InMemoryKVStore::new());
    ledger
        .register_chain(
            ChainSpec::new(TEST_CHAIN_ID, "ethash-test"),
            Box::new(EthashRules::new(EthashConfig::for_testing())),
        )
        .expect("in-memory registration");
    ledger
}
