//! Retry with exponential backoff for the node transport.
//!
//! The [`Factory`](crate::Factory) never retries on its own. Retries belong
//! to the transport: [`RestClient`](crate::client::RestClient) wraps each
//! request in a [`RetryExecutor`] so that transient failures (connection
//! resets, timeouts, 429 and 5xx answers) are retried before they surface
//! as [`TxError::AccountLookup`](crate::TxError::AccountLookup) or
//! [`TxError::Simulation`](crate::TxError::Simulation).
//!
//! # Example
//!
//! ```rust
//! use tx_factory::retry::RetryConfig;
//!
//! let config = RetryConfig::builder()
//!     .max_retries(5)
//!     .initial_delay_ms(100)
//!     .max_delay_ms(10_000)
//!     .jitter(true)
//!     .build();
//! assert_eq!(config.max_retries, 5);
//! ```

use crate::error::TransportError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries).
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Growth factor applied per attempt.
    pub exponential_base: f64,
    /// Whether to randomize delays.
    pub jitter: bool,
    /// Fraction of the delay used as the jitter range (0.0 to 1.0).
    pub jitter_factor: f64,
    /// HTTP status codes that should trigger a retry.
    pub retryable_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 10_000,
            exponential_base: 2.0,
            jitter: true,
            jitter_factor: 0.5,
            retryable_status_codes: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Creates a new builder for RetryConfig.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// Creates a config with no retries (fail fast).
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Creates a config suited to a slow or heavily loaded public node.
    pub fn conservative() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            ..Default::default()
        }
    }

    /// Calculates the delay before retry number `attempt` (1-based).
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base = self.initial_delay_ms as f64 * self.exponential_base.powi(exponent);
        let capped = base.min(self.max_delay_ms as f64);

        let delay = if self.jitter {
            let range = capped * self.jitter_factor;
            (capped + rand::random::<f64>() * range * 2.0 - range).max(0.0)
        } else {
            capped
        };

        Duration::from_millis(delay as u64)
    }

    /// Checks if a status code should trigger a retry.
    pub fn is_retryable_status(&self, status_code: u16) -> bool {
        self.retryable_status_codes.contains(&status_code)
    }

    /// Checks if a transport error should trigger a retry.
    ///
    /// Remote execution failures, decode failures and missing resources are
    /// never retried: repeating the request would produce the same answer.
    pub fn is_retryable_error(&self, error: &TransportError) -> bool {
        match error {
            TransportError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            TransportError::Api { status_code, .. } => self.is_retryable_status(*status_code),
            _ => false,
        }
    }
}

/// Builder for RetryConfig.
#[derive(Debug, Clone, Default)]
pub struct RetryConfigBuilder {
    max_retries: Option<u32>,
    initial_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    exponential_base: Option<f64>,
    jitter: Option<bool>,
    jitter_factor: Option<f64>,
    retryable_status_codes: Option<Vec<u16>>,
}

impl RetryConfigBuilder {
    /// Sets the maximum number of retry attempts.
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets the initial delay in milliseconds.
    #[must_use]
    pub fn initial_delay_ms(mut self, initial_delay_ms: u64) -> Self {
        self.initial_delay_ms = Some(initial_delay_ms);
        self
    }

    /// Sets the maximum delay in milliseconds.
    #[must_use]
    pub fn max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = Some(max_delay_ms);
        self
    }

    /// Sets the exponential growth factor.
    #[must_use]
    pub fn exponential_base(mut self, base: f64) -> Self {
        self.exponential_base = Some(base);
        self
    }

    /// Enables or disables jitter.
    #[must_use]
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Sets the jitter factor, clamped to 0.0..=1.0.
    #[must_use]
    pub fn jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = Some(factor.clamp(0.0, 1.0));
        self
    }

    /// Replaces the list of retryable status codes.
    #[must_use]
    pub fn retryable_status_codes(mut self, codes: Vec<u16>) -> Self {
        self.retryable_status_codes = Some(codes);
        self
    }

    /// Builds the RetryConfig.
    pub fn build(self) -> RetryConfig {
        let default = RetryConfig::default();
        RetryConfig {
            max_retries: self.max_retries.unwrap_or(default.max_retries),
            initial_delay_ms: self.initial_delay_ms.unwrap_or(default.initial_delay_ms),
            max_delay_ms: self.max_delay_ms.unwrap_or(default.max_delay_ms),
            exponential_base: self.exponential_base.unwrap_or(default.exponential_base),
            jitter: self.jitter.unwrap_or(default.jitter),
            jitter_factor: self.jitter_factor.unwrap_or(default.jitter_factor),
            retryable_status_codes: self
                .retryable_status_codes
                .unwrap_or(default.retryable_status_codes),
        }
    }
}

/// Runs an async transport operation, retrying transient failures.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Creates a new retry executor with the given config.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the executor's configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Executes `operation`, retrying while it fails with a retryable
    /// [`TransportError`] and attempts remain.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `operation` once retries are
    /// exhausted, or the first non-retryable error.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, TransportError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt >= self.config.max_retries
                        || !self.config.is_retryable_error(&error)
                    {
                        return Err(error);
                    }

                    attempt += 1;
                    let delay = self.config.delay_for_attempt(attempt);
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "retrying node request"
                    );
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                }
            }
        }
    }
}
