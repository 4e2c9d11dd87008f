use super::keys::{KeyAlgorithm, PrivateKey, PublicKey, COSMOS_HD_PATH};
use super::Keystore;
use crate::error::{TxError, TxResult};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use tracing::debug;

/// A keyring that keeps private keys in process memory.
///
/// # Example
///
/// ```rust
/// use tx_factory::keyring::{KeyAlgorithm, Keystore, MemoryKeyring};
///
/// let keyring = MemoryKeyring::new();
/// let public_key = keyring.generate("alice", KeyAlgorithm::Secp256k1).unwrap();
/// assert_eq!(keyring.address_by_name("alice").unwrap(), public_key.address());
/// ```
#[derive(Debug, Default)]
pub struct MemoryKeyring {
    keys: RwLock<BTreeMap<String, PrivateKey>>,
}

impl MemoryKeyring {
    /// Creates an empty keyring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `key` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Config`] if the name is empty or already taken.
    pub fn add(&self, name: &str, key: PrivateKey) -> TxResult<PublicKey> {
        if name.is_empty() {
            return Err(TxError::config("key name must not be empty"));
        }
        let public_key = key.public_key();
        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        if keys.contains_key(name) {
            return Err(TxError::config(format!("key {name} already exists")));
        }
        keys.insert(name.to_string(), key);
        debug!(key_name = name, algorithm = ?public_key.algorithm(), "added key to keyring");
        Ok(public_key)
    }

    /// Generates and stores a fresh key.
    ///
    /// # Errors
    ///
    /// See [`MemoryKeyring::add`].
    pub fn generate(&self, name: &str, algorithm: KeyAlgorithm) -> TxResult<PublicKey> {
        self.add(name, PrivateKey::generate(algorithm))
    }

    /// Imports a hex encoded private key.
    ///
    /// # Errors
    ///
    /// Fails if the key is malformed, or see [`MemoryKeyring::add`].
    pub fn import_hex(
        &self,
        name: &str,
        algorithm: KeyAlgorithm,
        hex_str: &str,
    ) -> TxResult<PublicKey> {
        self.add(name, PrivateKey::from_hex(algorithm, hex_str)?)
    }

    /// Recovers the first Cosmos secp256k1 account of a mnemonic.
    ///
    /// # Errors
    ///
    /// Fails if the mnemonic is invalid, or see [`MemoryKeyring::add`].
    pub fn import_mnemonic(&self, name: &str, phrase: &str) -> TxResult<PublicKey> {
        self.add(name, PrivateKey::from_mnemonic(phrase, "", &COSMOS_HD_PATH)?)
    }

    /// Removes a key. Returns true if it existed.
    pub fn remove(&self, name: &str) -> bool {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    /// Names of all stored keys, sorted.
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, PrivateKey>> {
        self.keys.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_key<T>(&self, name: &str, f: impl FnOnce(&PrivateKey) -> T) -> TxResult<T> {
        self.read()
            .get(name)
            .map(f)
            .ok_or_else(|| TxError::KeyNotFound(name.to_string()))
    }
}

impl Keystore for MemoryKeyring {
    fn address_by_name(&self, name: &str) -> TxResult<Vec<u8>> {
        self.with_key(name, |k| k.public_key().address())
    }

    fn name_by_address(&self, address: &[u8]) -> TxResult<String> {
        self.read()
            .iter()
            .find(|(_, key)| key.public_key().address() == address)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| TxError::KeyNotFound(hex::encode(address)))
    }

    fn public_key(&self, name: &str) -> TxResult<PublicKey> {
        self.with_key(name, PrivateKey::public_key)
    }

    fn sign(&self, name: &str, bytes: &[u8]) -> TxResult<Vec<u8>> {
        self.with_key(name, |k| k.sign(bytes))
    }
}
