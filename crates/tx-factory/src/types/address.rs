//! Account address rendering.

use crate::error::{TxError, TxResult};
use bech32::{FromBase32, ToBase32, Variant};
use std::fmt::Debug;

/// Converts raw account address bytes to and from their string form.
pub trait AddressCodec: Debug + Send + Sync {
    /// Renders address bytes as a string.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::InvalidAddress`] if the bytes cannot be encoded.
    fn bytes_to_string(&self, bytes: &[u8]) -> TxResult<String>;

    /// Parses an address string back into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::InvalidAddress`] if the string is malformed or
    /// belongs to another address space.
    fn string_to_bytes(&self, s: &str) -> TxResult<Vec<u8>>;
}

/// Bech32 address codec bound to a human readable prefix, e.g. `cosmos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bech32Codec {
    hrp: String,
}

impl Bech32Codec {
    /// Creates a codec for the given prefix.
    pub fn new(hrp: impl Into<String>) -> Self {
        Self { hrp: hrp.into() }
    }

    /// Returns the human readable prefix.
    pub fn hrp(&self) -> &str {
        &self.hrp
    }
}

impl Default for Bech32Codec {
    fn default() -> Self {
        Self::new("cosmos")
    }
}

impl AddressCodec for Bech32Codec {
    fn bytes_to_string(&self, bytes: &[u8]) -> TxResult<String> {
        if bytes.is_empty() {
            return Err(TxError::InvalidAddress("empty address bytes".into()));
        }
        bech32::encode(&self.hrp, bytes.to_base32(), Variant::Bech32)
            .map_err(|e| TxError::InvalidAddress(e.to_string()))
    }

    fn string_to_bytes(&self, s: &str) -> TxResult<Vec<u8>> {
        let (hrp, data, variant) =
            bech32::decode(s).map_err(|e| TxError::InvalidAddress(format!("{s}: {e}")))?;
        if hrp != self.hrp {
            return Err(TxError::InvalidAddress(format!(
                "{s}: expected prefix {}, got {hrp}",
                self.hrp
            )));
        }
        if variant != Variant::Bech32 {
            return Err(TxError::InvalidAddress(format!("{s}: not a bech32 address")));
        }
        Vec::<u8>::from_base32(&data).map_err(|e| TxError::InvalidAddress(e.to_string()))
    }
}
