//! Network collaborators of the factory.
//!
//! The factory talks to a node through two narrow traits:
//! [`AccountResolver`] for account number and sequence, and [`Simulator`]
//! for gas estimation. [`RestClient`] implements both against the
//! standard REST gateway.

mod rest;

pub use rest::RestClient;

use crate::error::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Account number and sequence of an on-chain account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// On-chain account number.
    pub account_number: u64,
    /// Next sequence expected by the chain.
    pub sequence: u64,
}

/// Looks up account metadata by address.
#[async_trait]
pub trait AccountResolver: Debug + Send + Sync {
    /// Returns the account number and sequence of `address`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotFound`] if the account does not exist
    /// yet, or another [`TransportError`] if the lookup fails.
    async fn resolve(&self, address: &str) -> Result<AccountInfo, TransportError>;
}

/// Gas accounting reported by a simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasInfo {
    /// Gas limit the simulated transaction carried.
    #[serde(with = "u64_string")]
    pub gas_wanted: u64,
    /// Gas consumed by execution.
    #[serde(with = "u64_string")]
    pub gas_used: u64,
}

/// Execution result of a simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Raw log, if the node provides one.
    #[serde(default)]
    pub log: String,
    /// Events emitted during execution.
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
    /// Responses of each message, as returned by the node.
    #[serde(default)]
    pub msg_responses: Vec<serde_json::Value>,
}

/// Response of a simulate round-trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulateResponse {
    /// Gas accounting.
    pub gas_info: GasInfo,
    /// Execution result.
    #[serde(default)]
    pub result: Option<SimulationResult>,
}

/// Executes a transaction against current state without committing it.
#[async_trait]
pub trait Simulator: Debug + Send + Sync {
    /// Simulates the encoded `TxRaw` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Remote`] if the node rejects the
    /// transaction, or another [`TransportError`] on transport failure.
    async fn simulate(&self, tx_bytes: &[u8]) -> Result<SimulateResponse, TransportError>;
}

/// Integers the REST gateway renders as JSON strings.
pub(crate) mod u64_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(value: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNumber {
            String(String),
            Number(u64),
        }

        match StringOrNumber::deserialize(d)? {
            StringOrNumber::String(s) => s.parse().map_err(D::Error::custom),
            StringOrNumber::Number(n) => Ok(n),
        }
    }
}
