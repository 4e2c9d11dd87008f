//! Configuration for the node transport and for transaction parameters.
//!
//! [`NodeConfig`] describes how to reach a node's REST gateway.
//! [`TxConfig`] is the user-facing transaction configuration surface
//! (the values a command line or config file supplies) and converts into
//! [`TxParameters`].

use crate::error::{TxError, TxResult};
use crate::retry::RetryConfig;
use crate::tx::{
    AccountConfig, ExecutionOptions, FeeConfig, GasConfig, SignMode, TxParameters,
};
use crate::types::{AddressCodec, Coin, DecCoin};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default REST gateway address of a local node.
pub const LOCAL_REST_URL: &str = "http://127.0.0.1:1317";

/// Configuration for HTTP connection pooling.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum idle connections per host. `None` means unlimited.
    pub max_idle_per_host: Option<usize>,
    /// How long to keep idle connections alive.
    pub idle_timeout: Duration,
    /// TCP keepalive interval, if enabled.
    pub tcp_keepalive: Option<Duration>,
    /// Whether to disable Nagle's algorithm.
    pub tcp_nodelay: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: None,
            idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Some(Duration::from_secs(60)),
            tcp_nodelay: true,
        }
    }
}

impl PoolConfig {
    /// Fewer, fresher connections for a node on the same machine.
    pub fn low_latency() -> Self {
        Self {
            max_idle_per_host: Some(8),
            idle_timeout: Duration::from_secs(30),
            tcp_keepalive: Some(Duration::from_secs(15)),
            tcp_nodelay: true,
        }
    }
}

/// How to reach a node's REST gateway.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tx_factory::config::NodeConfig;
/// use tx_factory::retry::RetryConfig;
///
/// let config = NodeConfig::custom("https://rest.cosmos.example.com")
///     .unwrap()
///     .with_timeout(Duration::from_secs(20))
///     .with_retry(RetryConfig::conservative());
/// assert_eq!(config.timeout(), Duration::from_secs(20));
/// ```
#[derive(Debug, Clone)]
pub struct NodeConfig {
    url: Url,
    timeout: Duration,
    retry_config: RetryConfig,
    pool_config: PoolConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::local()
    }
}

impl NodeConfig {
    /// A node running locally on the default REST port.
    pub fn local() -> Self {
        Self {
            url: Url::parse(LOCAL_REST_URL).expect("valid local URL"),
            timeout: Duration::from_secs(10),
            retry_config: RetryConfig::default(),
            pool_config: PoolConfig::low_latency(),
        }
    }

    /// A node at the given REST gateway URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` cannot be parsed.
    pub fn custom(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(url)?,
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
            pool_config: PoolConfig::default(),
        })
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry configuration for transient failures.
    #[must_use]
    pub fn with_retry(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Disables retries.
    #[must_use]
    pub fn without_retry(self) -> Self {
        self.with_retry(RetryConfig::no_retry())
    }

    /// Sets the connection pool configuration.
    #[must_use]
    pub fn with_pool(mut self, pool_config: PoolConfig) -> Self {
        self.pool_config = pool_config;
        self
    }

    /// REST gateway URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Connection pool configuration.
    pub fn pool_config(&self) -> &PoolConfig {
        &self.pool_config
    }
}

/// Transaction configuration as supplied by a user.
///
/// Field names follow the familiar command line flags (`chain-id`,
/// `gas-prices`, `fee-payer`, ...). Coins and addresses are kept in their
/// textual form and validated by [`TxConfig::to_params`].
///
/// ```rust
/// use tx_factory::config::TxConfig;
///
/// let config: TxConfig = serde_json::from_str(r#"{
///     "from": "alice",
///     "chain-id": "demo",
///     "gas": "auto",
///     "gas-adjustment": 1.3,
///     "gas-prices": "0.025uatom",
///     "sign-mode": "direct"
/// }"#).unwrap();
/// assert_eq!(config.chain_id, "demo");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TxConfig {
    /// Sending account: an address or a keystore key name.
    pub from: String,
    /// Chain identifier.
    pub chain_id: String,
    /// Account number, used as-is when offline.
    pub account_number: u64,
    /// Sequence, used as-is when offline.
    pub sequence: u64,
    /// Gas limit, or `auto` (or empty) to simulate.
    pub gas: String,
    /// Multiplier applied to simulated gas.
    pub gas_adjustment: f64,
    /// Gas prices, e.g. `0.025uatom`.
    pub gas_prices: String,
    /// Fees, e.g. `5000uatom`.
    pub fees: String,
    /// Fee payer address.
    pub fee_payer: String,
    /// Fee granter address.
    pub fee_granter: String,
    /// Sign mode.
    pub sign_mode: SignMode,
    /// Memo.
    pub memo: String,
    /// Timeout height.
    pub timeout_height: u64,
    /// Never contact the network.
    pub offline: bool,
    /// Build without signing.
    pub generate_only: bool,
    /// Unordered transaction.
    pub unordered: bool,
}

impl TxConfig {
    /// Validates the textual values and converts them into
    /// [`TxParameters`].
    ///
    /// `from` is taken as an address if `codec` accepts it, otherwise as
    /// a key name.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Config`] for an unparseable gas value,
    /// [`TxError::InvalidCoin`] for malformed coins, and
    /// [`TxError::InvalidAddress`] for a malformed fee payer or granter.
    pub fn to_params(&self, codec: &dyn AddressCodec) -> TxResult<TxParameters> {
        let from = self.from.trim();
        let account = match codec.string_to_bytes(from) {
            Ok(address) => AccountConfig::from_address(address),
            Err(_) => AccountConfig::from_name(from),
        };

        let gas = match self.gas.trim() {
            "" | "auto" => 0,
            value => value
                .parse()
                .map_err(|e| TxError::config(format!("invalid gas {value:?}: {e}")))?,
        };

        let optional_address = |s: &str| -> TxResult<Option<Vec<u8>>> {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                codec.string_to_bytes(s).map(Some)
            }
        };

        Ok(TxParameters {
            chain_id: self.chain_id.trim().to_string(),
            sign_mode: self.sign_mode,
            memo: self.memo.clone(),
            account: AccountConfig {
                account_number: self.account_number,
                sequence: self.sequence,
                ..account
            },
            gas: GasConfig {
                gas,
                gas_adjustment: self.gas_adjustment,
                gas_prices: DecCoin::parse_list(&self.gas_prices)?,
            },
            fee: FeeConfig {
                fees: Coin::parse_list(&self.fees)?,
                fee_payer: optional_address(&self.fee_payer)?,
                fee_granter: optional_address(&self.fee_granter)?,
            },
            execution: ExecutionOptions {
                offline: self.offline,
                generate_only: self.generate_only,
                unordered: self.unordered,
                timeout_height: self.timeout_height,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bech32Codec;

    #[test]
    fn test_local_config() {
        let config = NodeConfig::local();
        assert_eq!(config.url().as_str(), "http://127.0.0.1:1317/");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_custom_config() {
        let config = NodeConfig::custom("https://rest.example.com").unwrap();
        assert_eq!(config.url().host_str(), Some("rest.example.com"));
        assert!(NodeConfig::custom("not a url").is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = NodeConfig::local()
            .with_timeout(Duration::from_secs(60))
            .without_retry()
            .with_pool(PoolConfig::default());
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.retry_config().max_retries, 0);
        assert_eq!(config.pool_config().max_idle_per_host, None);
    }

    #[test]
    fn test_tx_config_from_json() {
        let codec = Bech32Codec::default();
        let payer = codec.bytes_to_string(&[3; 20]).unwrap();
        let json = serde_json::json!({
            "from": "alice",
            "chain-id": "demo",
            "gas": "250000",
            "gas-adjustment": 1.5,
            "fees": "5000uatom",
            "fee-payer": payer,
            "sign-mode": "amino-json",
            "memo": "hi",
            "timeout-height": 100,
            "offline": true,
        });
        let config: TxConfig = serde_json::from_value(json).unwrap();
        let params = config.to_params(&codec).unwrap();

        assert_eq!(params.chain_id, "demo");
        assert_eq!(params.account.from_name, "alice");
        assert!(params.account.from_address.is_empty());
        assert_eq!(params.gas.gas, 250_000);
        assert_eq!(params.fee.fees[0].amount, 5000);
        assert_eq!(params.fee.fee_payer, Some(vec![3; 20]));
        assert_eq!(params.sign_mode, SignMode::LegacyAminoJson);
        assert_eq!(params.execution.timeout_height, 100);
        assert!(params.execution.offline);
    }

    #[test]
    fn test_tx_config_from_address() {
        let codec = Bech32Codec::default();
        let config = TxConfig {
            from: codec.bytes_to_string(&[9; 20]).unwrap(),
            gas: "auto".into(),
            gas_prices: "0.025uatom".into(),
            ..Default::default()
        };
        let params = config.to_params(&codec).unwrap();
        assert_eq!(params.account.from_address, vec![9; 20]);
        assert_eq!(params.gas.gas, 0);
        assert_eq!(params.gas.gas_prices[0].amount(), "0.025");
    }

    #[test]
    fn test_tx_config_rejects_bad_values() {
        let codec = Bech32Codec::default();
        let bad_gas = TxConfig {
            gas: "lots".into(),
            ..Default::default()
        };
        assert!(matches!(bad_gas.to_params(&codec), Err(TxError::Config(_))));

        let bad_fees = TxConfig {
            fees: "five".into(),
            ..Default::default()
        };
        assert!(matches!(bad_fees.to_params(&codec), Err(TxError::InvalidCoin(_))));

        let bad_granter = TxConfig {
            fee_granter: "nobody".into(),
            ..Default::default()
        };
        assert!(matches!(
            bad_granter.to_params(&codec),
            Err(TxError::InvalidAddress(_))
        ));
    }
}
