//! Example: Offline Signing
//!
//! This example builds and signs a bank send without touching the network:
//! 1. Recover a key from a mnemonic
//! 2. Supply account number and sequence by hand
//! 3. Sign with each supported sign mode and print the `TxRaw` bytes
//!
//! Run with: `cargo run --example offline_sign`

use std::sync::Arc;
use tx_factory::client::RestClient;
use tx_factory::config::{NodeConfig, TxConfig};
use tx_factory::keyring::{Keystore, MemoryKeyring};
use prost::Message as _;
use tx_factory::tx::{proto, AnyMsg, Msg};
use tx_factory::types::{AddressCodec, Bech32Codec};
use tx_factory::{Factory, SignMode};

const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("=== Offline Signing ===\n");

    let keyring = Arc::new(MemoryKeyring::new());
    keyring.import_mnemonic("alice", MNEMONIC)?;
    let codec = Arc::new(Bech32Codec::new("cosmos"));
    let alice = codec.bytes_to_string(&keyring.address_by_name("alice")?)?;
    println!("alice: {alice}");

    let config = TxConfig {
        from: "alice".into(),
        chain_id: "demo".into(),
        account_number: 12,
        sequence: 0,
        gas: "200000".into(),
        fees: "5000uatom".into(),
        memo: "offline".into(),
        offline: true,
        ..Default::default()
    };

    // The node is never contacted in offline mode.
    let node = Arc::new(RestClient::new(NodeConfig::local())?);

    // MsgSend with from_address = alice, to_address = alice, amount = 1uatom
    let msg = AnyMsg::new(
        "/cosmos.bank.v1beta1.MsgSend",
        encode_send(&alice, &alice, "uatom", "1"),
        vec![alice.clone()],
    );

    for mode in SignMode::SUPPORTED {
        if mode == SignMode::LegacyAminoJson {
            println!("\n{mode}: skipped, the message has no amino JSON form");
            continue;
        }

        let mut params = config.to_params(codec.as_ref())?;
        params.sign_mode = mode;
        let mut factory = Factory::new(keyring.clone(), node.clone(), node.clone(), codec.clone(), params);

        let tx = factory.build_signed_tx(&[&msg as &dyn Msg]).await?;
        let bytes = tx.encode();
        println!("\n{mode}: {} bytes", bytes.len());
        println!("  {}", hex::encode(&bytes));
    }

    Ok(())
}

/// `cosmos.bank.v1beta1.MsgSend`
#[derive(Clone, PartialEq, prost::Message)]
struct MsgSend {
    #[prost(string, tag = "1")]
    from_address: String,
    #[prost(string, tag = "2")]
    to_address: String,
    #[prost(message, repeated, tag = "3")]
    amount: Vec<proto::Coin>,
}

fn encode_send(from: &str, to: &str, denom: &str, amount: &str) -> Vec<u8> {
    MsgSend {
        from_address: from.to_string(),
        to_address: to.to_string(),
        amount: vec![proto::Coin {
            denom: denom.to_string(),
            amount: amount.to_string(),
        }],
    }
    .encode_to_vec()
}
