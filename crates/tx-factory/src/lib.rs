//! # tx-factory
//!
//! Client-side construction of Cosmos-style transactions.
//!
//! A [`Factory`] takes a bundle of [`TxParameters`] and a list of messages
//! and turns them into an encoded, signed `TxRaw`:
//!
//! 1. resolve the sending account's number and sequence
//! 2. assemble an unsigned [`TxBuilder`] and validate the configuration
//! 3. optionally estimate gas by simulating against a node
//! 4. compute sign bytes for the chosen [`SignMode`] and sign each signer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tx_factory::client::RestClient;
//! use tx_factory::config::{NodeConfig, TxConfig};
//! use tx_factory::keyring::MemoryKeyring;
//! use tx_factory::tx::{AnyMsg, Msg};
//! use tx_factory::types::Bech32Codec;
//! use tx_factory::Factory;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let keyring = Arc::new(MemoryKeyring::new());
//!     keyring.import_mnemonic("alice", "...")?;
//!
//!     let codec = Arc::new(Bech32Codec::new("cosmos"));
//!     let config: TxConfig = serde_json::from_str(
//!         r#"{"from": "alice", "chain-id": "demo", "gas": "auto",
//!             "gas-prices": "0.025uatom", "sign-mode": "direct"}"#,
//!     )?;
//!     let params = config.to_params(codec.as_ref())?;
//!
//!     let node = Arc::new(RestClient::new(NodeConfig::local())?);
//!     let mut factory = Factory::new(keyring, node.clone(), node, codec, params);
//!
//!     let msg = AnyMsg::new("/cosmos.bank.v1beta1.MsgSend", vec![], vec!["cosmos1...".into()]);
//!     let tx = factory.build_signed_tx(&[&msg as &dyn Msg]).await?;
//!     println!("tx bytes: {}", hex::encode(tx.encode()));
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`tx`] - The factory, transaction builder, sign modes and wire types
//! - [`client`] - Account resolution and simulation against a node
//! - [`keyring`] - Key storage and signing
//! - [`types`] - Coins and address codecs
//! - [`config`] - Node and transaction configuration
//! - [`retry`] - Retry policy for the REST transport

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod client;
pub mod config;
pub mod error;
pub mod keyring;
pub mod retry;
pub mod tx;
pub mod types;

// Re-export main entry points
pub use error::{TransportError, TxError, TxResult};
pub use tx::{Factory, Msg, SignMode, TxBuilder, TxParameters};

// Re-export commonly used types
pub use types::{Coin, DecCoin};
