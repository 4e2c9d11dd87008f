//! Shared test collaborators.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tx_factory::client::{AccountInfo, AccountResolver, GasInfo, SimulateResponse, SimulationResult, Simulator};
use tx_factory::keyring::{KeyAlgorithm, Keystore, MemoryKeyring};
use tx_factory::tx::proto::Any;
use tx_factory::tx::AccountConfig;
use tx_factory::types::{AddressCodec, Bech32Codec};
use tx_factory::{Factory, Msg, SignMode, TransportError, TxParameters};

/// The counter module's increment message.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MsgIncreaseCounter {
    #[prost(string, tag = "1")]
    pub signer: String,
    #[prost(int64, tag = "2")]
    pub count: i64,
}

impl Msg for MsgIncreaseCounter {
    fn type_url(&self) -> &str {
        "/cosmos.counter.v1.MsgIncreaseCounter"
    }

    fn encode_value(&self) -> Vec<u8> {
        prost::Message::encode_to_vec(self)
    }

    fn signers(&self) -> Vec<String> {
        vec![self.signer.clone()]
    }

    fn amino_json(&self) -> Option<serde_json::Value> {
        Some(json!({
            "type": "cosmos-sdk/increase_counter",
            "value": {"signer": self.signer, "count": self.count.to_string()},
        }))
    }
}

/// A node that serves one account and reports fixed gas usage.
#[derive(Debug, Default)]
pub struct MockNode {
    pub account: Option<AccountInfo>,
    pub gas_used: u64,
    pub lookups: AtomicUsize,
    pub simulations: AtomicUsize,
}

impl MockNode {
    pub fn with_account(account_number: u64, sequence: u64) -> Self {
        Self {
            account: Some(AccountInfo {
                account_number,
                sequence,
            }),
            gas_used: 61_234,
            ..Default::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn simulations(&self) -> usize {
        self.simulations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountResolver for MockNode {
    async fn resolve(&self, address: &str) -> Result<AccountInfo, TransportError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.account
            .ok_or_else(|| TransportError::NotFound(format!("account {address} not found")))
    }
}

#[async_trait]
impl Simulator for MockNode {
    async fn simulate(&self, _tx_bytes: &[u8]) -> Result<SimulateResponse, TransportError> {
        self.simulations.fetch_add(1, Ordering::SeqCst);
        Ok(SimulateResponse {
            gas_info: GasInfo {
                gas_wanted: 0,
                gas_used: self.gas_used,
            },
            result: Some(SimulationResult {
                log: String::new(),
                events: vec![json!({"type": "message", "attributes": []})],
                msg_responses: vec![],
            }),
        })
    }
}

/// A keyring holding `alice`, a codec and a mock node.
pub struct TestEnv {
    pub keyring: Arc<MemoryKeyring>,
    pub codec: Arc<Bech32Codec>,
    pub node: Arc<MockNode>,
}

impl TestEnv {
    pub fn new(node: MockNode) -> Self {
        let keyring = Arc::new(MemoryKeyring::new());
        keyring
            .generate("alice", KeyAlgorithm::Secp256k1)
            .unwrap();
        Self {
            keyring,
            codec: Arc::new(Bech32Codec::default()),
            node: Arc::new(node),
        }
    }

    pub fn address(&self, name: &str) -> String {
        let bytes = self.keyring.address_by_name(name).unwrap();
        self.codec.bytes_to_string(&bytes).unwrap()
    }

    pub fn keyring_public_key_any(&self) -> Any {
        self.keyring.public_key("alice").unwrap().to_any()
    }

    pub fn increase_counter(&self) -> MsgIncreaseCounter {
        MsgIncreaseCounter {
            signer: self.address("alice"),
            count: 1,
        }
    }

    pub fn params(&self) -> TxParameters {
        TxParameters {
            account: AccountConfig::from_name("alice"),
            sign_mode: SignMode::Direct,
            ..TxParameters::new("demo")
        }
    }

    pub fn factory(&self, params: TxParameters) -> Factory {
        Factory::new(
            self.keyring.clone(),
            self.node.clone(),
            self.node.clone(),
            self.codec.clone(),
            params,
        )
    }
}
