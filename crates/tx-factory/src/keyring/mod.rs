//! Key storage used by the factory to resolve signer keys and sign bytes.
//!
//! The [`Keystore`] trait is the seam: production deployments plug in an
//! OS keychain or hardware signer, while [`MemoryKeyring`] keeps keys in
//! process memory for tests, scripts and local development.

mod keys;
mod memory;

pub use keys::{
    KeyAlgorithm, PrivateKey, PublicKey, COSMOS_HD_PATH, ED25519_PUBLIC_KEY_LENGTH,
    SECP256K1_PUBLIC_KEY_LENGTH,
};
pub use memory::MemoryKeyring;

use crate::error::TxResult;
use std::fmt::Debug;

/// Named keys able to produce signatures.
pub trait Keystore: Debug + Send + Sync {
    /// Returns the address bytes of the key called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::KeyNotFound`](crate::TxError::KeyNotFound) if no
    /// such key exists.
    fn address_by_name(&self, name: &str) -> TxResult<Vec<u8>>;

    /// Returns the name of the key whose address is `address`.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::KeyNotFound`](crate::TxError::KeyNotFound) if no
    /// key has that address.
    fn name_by_address(&self, address: &[u8]) -> TxResult<String>;

    /// Returns the public key of the key called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::KeyNotFound`](crate::TxError::KeyNotFound) if no
    /// such key exists.
    fn public_key(&self, name: &str) -> TxResult<PublicKey>;

    /// Signs `bytes` with the key called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::KeyNotFound`](crate::TxError::KeyNotFound) if no
    /// such key exists, or [`TxError::Signing`](crate::TxError::Signing) if
    /// the signer refuses.
    fn sign(&self, name: &str, bytes: &[u8]) -> TxResult<Vec<u8>>;
}
