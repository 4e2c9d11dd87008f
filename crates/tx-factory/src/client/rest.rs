//! REST gateway client.

use super::{AccountInfo, AccountResolver, SimulateResponse, Simulator};
use crate::config::NodeConfig;
use crate::error::TransportError;
use crate::retry::{RetryConfig, RetryExecutor};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Client for a node's REST gateway.
///
/// Implements [`AccountResolver`] via `GET /cosmos/auth/v1beta1/accounts/{address}`
/// and [`Simulator`] via `POST /cosmos/tx/v1beta1/simulate`. Transient
/// failures are retried according to the [`RetryConfig`] in the
/// [`NodeConfig`].
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tx_factory::client::{AccountResolver, RestClient};
/// use tx_factory::config::NodeConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = Arc::new(RestClient::new(NodeConfig::local())?);
///     let account = client.resolve("cosmos1...").await?;
///     println!("sequence: {}", account.sequence);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RestClient {
    config: NodeConfig,
    client: Client,
    retry_config: Arc<RetryConfig>,
}

impl RestClient {
    /// Creates a new REST client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the HTTP client fails to build.
    pub fn new(config: NodeConfig) -> Result<Self, TransportError> {
        let pool = config.pool_config();

        let mut builder = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(pool.max_idle_per_host.unwrap_or(usize::MAX))
            .pool_idle_timeout(pool.idle_timeout)
            .tcp_nodelay(pool.tcp_nodelay);

        if let Some(keepalive) = pool.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        let client = builder.build()?;
        let retry_config = Arc::new(config.retry_config().clone());

        Ok(Self {
            config,
            client,
            retry_config,
        })
    }

    /// Returns the base URL of the gateway.
    pub fn base_url(&self) -> &Url {
        self.config.url()
    }

    /// Returns the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Fetches account number and sequence.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotFound`] for an unknown account,
    /// [`TransportError::Decode`] if the response carries no account
    /// number, or another [`TransportError`] on transport failure.
    pub async fn get_account(&self, address: &str) -> Result<AccountInfo, TransportError> {
        let url = self.build_url(&format!("cosmos/auth/v1beta1/accounts/{address}"));
        let client = self.client.clone();

        let body: Value = RetryExecutor::new((*self.retry_config).clone())
            .execute(|| {
                let client = client.clone();
                let url = url.clone();
                async move {
                    let response = client
                        .get(url)
                        .header(ACCEPT, JSON_CONTENT_TYPE)
                        .send()
                        .await?;
                    Self::handle_response_static(response).await
                }
            })
            .await?;

        let account = parse_account(&body).ok_or_else(|| {
            TransportError::Decode(format!("no account number in response for {address}"))
        })?;
        debug!(
            address,
            account_number = account.account_number,
            sequence = account.sequence,
            "resolved account"
        );
        Ok(account)
    }

    /// Simulates encoded transaction bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Remote`] if the node rejects the
    /// transaction, or another [`TransportError`] on transport failure.
    pub async fn simulate_tx(&self, tx_bytes: &[u8]) -> Result<SimulateResponse, TransportError> {
        let url = self.build_url("cosmos/tx/v1beta1/simulate");
        let request = serde_json::json!({ "tx_bytes": base64::encode(tx_bytes) });
        let client = self.client.clone();

        let response: SimulateResponse = RetryExecutor::new((*self.retry_config).clone())
            .execute(|| {
                let client = client.clone();
                let url = url.clone();
                let request = request.clone();
                async move {
                    let response = client
                        .post(url)
                        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                        .header(ACCEPT, JSON_CONTENT_TYPE)
                        .json(&request)
                        .send()
                        .await?;
                    Self::handle_response_static(response).await
                }
            })
            .await?;

        debug!(
            gas_used = response.gas_info.gas_used,
            gas_wanted = response.gas_info.gas_wanted,
            "simulated transaction"
        );
        Ok(response)
    }

    fn build_url(&self, path: &str) -> Url {
        let mut url = self.config.url().clone();
        if !path.is_empty() {
            if !url.path().ends_with('/') {
                url.set_path(&format!("{}/", url.path()));
            }
            url.set_path(&format!("{}{}", url.path(), path));
        }
        url
    }

    async fn handle_response_static<T: for<'de> serde::Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| TransportError::Decode(e.to_string()));
        }

        let body: Value = response.json().await.unwrap_or_default();
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();
        let code = body
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|c| u32::try_from(c).ok())
            .filter(|c| *c != 0);

        warn!(status = status.as_u16(), code, %message, "node returned an error");

        Err(match (status, code) {
            (StatusCode::NOT_FOUND, _) => TransportError::NotFound(message),
            (
                StatusCode::REQUEST_TIMEOUT
                | StatusCode::TOO_MANY_REQUESTS
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT,
                _,
            )
            | (_, None) => TransportError::Api {
                status_code: status.as_u16(),
                message,
            },
            (_, Some(code)) => TransportError::Remote { code, log: message },
        })
    }
}

#[async_trait]
impl AccountResolver for RestClient {
    async fn resolve(&self, address: &str) -> Result<AccountInfo, TransportError> {
        self.get_account(address).await
    }
}

#[async_trait]
impl Simulator for RestClient {
    async fn simulate(&self, tx_bytes: &[u8]) -> Result<SimulateResponse, TransportError> {
        self.simulate_tx(tx_bytes).await
    }
}

/// Extracts account number and sequence, descending into the
/// `base_account` of vesting and module accounts.
fn parse_account(body: &Value) -> Option<AccountInfo> {
    let account = body.get("account")?;
    let base = [
        Some(account),
        account.get("base_account"),
        account
            .get("base_vesting_account")
            .and_then(|v| v.get("base_account")),
    ]
    .into_iter()
    .flatten()
    .find(|v| v.get("account_number").is_some())?;

    Some(AccountInfo {
        account_number: json_u64(base.get("account_number")?)?,
        sequence: base.get("sequence").and_then(json_u64).unwrap_or(0),
    })
}

fn json_u64(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}
