//! Error types for the transaction factory.
//!
//! This module provides a unified error type [`TxError`] covering every
//! failure the factory surfaces, plus [`TransportError`] for failures of the
//! network collaborators (account lookup and simulation).

use std::fmt;
use thiserror::Error;

/// A specialized Result type for transaction factory operations.
pub type TxResult<T> = Result<T, TxError>;

/// The main error type for the transaction factory.
///
/// Errors are surfaced to the caller unmodified: the factory never retries.
#[derive(Error, Debug)]
pub enum TxError {
    /// Caller-supplied configuration violates an invariant
    #[error("Configuration error: {0}")]
    Config(String),

    /// The account resolver failed to return account number and sequence
    #[error("Account lookup failed for {address}: {source}")]
    AccountLookup {
        /// The address that was looked up
        address: String,
        /// The underlying transport failure
        #[source]
        source: TransportError,
    },

    /// The simulation round-trip failed
    #[error("Simulation failed: {0}")]
    Simulation(#[source] TransportError),

    /// A network operation was attempted while offline
    #[error("Cannot {0} in offline mode")]
    Offline(&'static str),

    /// The keystore has no key for the given name or address
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// The keystore failed to produce a signature
    #[error("Signing failed for {name}: {reason}")]
    Signing {
        /// Key name
        name: String,
        /// Failure reason reported by the keystore
        reason: String,
    },

    /// A signature is already present and overwrite was not requested
    #[error("Signer {0} has already signed this transaction")]
    AlreadySigned(String),

    /// Account data for a signer other than the factory's own is missing
    #[error("Cannot resolve account data for signer {0}; populate it on the transaction first")]
    MultiSignerResolution(String),

    /// The sign mode is not enabled in the handler map
    #[error("Unsupported sign mode: {0}")]
    UnsupportedSignMode(String),

    /// Invalid coin or decimal coin
    #[error("Invalid coin: {0}")]
    InvalidCoin(String),

    /// Invalid address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid public or private key material
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Wire or JSON encoding failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Any other error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl TxError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new encoding error
    pub fn encoding<E: fmt::Display>(err: E) -> Self {
        Self::Encoding(err.to_string())
    }

    /// Creates a new signing error
    pub fn signing(name: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Signing {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if this error was caused by caller configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::UnsupportedSignMode(_))
    }

    /// Returns true if this error came from the network collaborators
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::AccountLookup { .. } | Self::Simulation(_))
    }

    /// Returns true if the same call might succeed when repeated later.
    ///
    /// The factory itself never retries; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::AccountLookup { source, .. } | Self::Simulation(source) => {
                source.is_retryable()
            }
            _ => false,
        }
    }

    /// Returns the error message suitable for display to end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Config(_) => "Invalid transaction configuration",
            Self::AccountLookup { .. } => "Could not fetch account information",
            Self::Simulation(_) => "Transaction simulation failed",
            Self::Offline(_) => "Operation not available in offline mode",
            Self::KeyNotFound(_) => "Key not found",
            Self::Signing { .. } => "Signing failed",
            Self::AlreadySigned(_) => "Transaction already signed",
            Self::MultiSignerResolution(_) => "Missing account data for a co-signer",
            Self::UnsupportedSignMode(_) => "Sign mode not supported",
            Self::InvalidCoin(_) => "Invalid coin amount",
            Self::InvalidAddress(_) => "Invalid address",
            Self::InvalidKey(_) => "Invalid key",
            Self::Encoding(_) => "Failed to encode transaction",
            Self::Other(_) => "An error occurred",
        }
    }
}

/// Failures of the network transport used by the account resolver and
/// the simulator.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Error occurred during HTTP communication
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The node answered with a non-success status
    #[error("API error ({status_code}): {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the node
        message: String,
    },

    /// The node executed the request but reported a non-zero result code
    #[error("remote error (code {code}): {log}")]
    Remote {
        /// ABCI result code
        code: u32,
        /// Raw log returned by the node
        log: String,
    },

    /// The requested resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The response could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Any other transport error, e.g. from a custom collaborator
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns true if this is a transient error that might succeed on retry
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status_code, .. } => {
                matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// Returns true if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Api {
                    status_code: 404,
                    ..
                }
        )
    }
}
