//! Key material held by the in-memory keyring.

use crate::error::{TxError, TxResult};
use crate::tx::proto::{Any, PubKey, ED25519_PUBKEY_TYPE_URL, SECP256K1_PUBKEY_TYPE_URL};
use hmac::{Hmac, Mac};
use k256::ecdsa::signature::Signer as _;
use k256::elliptic_curve::PrimeField;
use prost::Message;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use zeroize::Zeroizing;

/// Length of a compressed secp256k1 public key.
pub const SECP256K1_PUBLIC_KEY_LENGTH: usize = 33;
/// Length of an ed25519 public key.
pub const ED25519_PUBLIC_KEY_LENGTH: usize = 32;

/// BIP-44 path of the first Cosmos account, `m/44'/118'/0'/0/0`.
pub const COSMOS_HD_PATH: [u32; 5] = [44 | HARDENED, 118 | HARDENED, HARDENED, 0, 0];

const HARDENED: u32 = 0x8000_0000;

type HmacSha512 = Hmac<Sha512>;

/// Supported signature algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// ECDSA over secp256k1, the Cosmos default.
    Secp256k1,
    /// Ed25519.
    Ed25519,
}

/// A public key as it appears in a signer info.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PublicKey {
    /// Compressed SEC1 secp256k1 key.
    Secp256k1(Vec<u8>),
    /// Raw ed25519 key.
    Ed25519([u8; ED25519_PUBLIC_KEY_LENGTH]),
}

impl PublicKey {
    /// Returns the algorithm of this key.
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PublicKey::Secp256k1(_) => KeyAlgorithm::Secp256k1,
            PublicKey::Ed25519(_) => KeyAlgorithm::Ed25519,
        }
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PublicKey::Secp256k1(bytes) => bytes,
            PublicKey::Ed25519(bytes) => bytes,
        }
    }

    /// Protobuf type URL of the key.
    pub fn type_url(&self) -> &'static str {
        match self {
            PublicKey::Secp256k1(_) => SECP256K1_PUBKEY_TYPE_URL,
            PublicKey::Ed25519(_) => ED25519_PUBKEY_TYPE_URL,
        }
    }

    /// Packs the key into an [`Any`] for a signer info.
    pub fn to_any(&self) -> Any {
        Any {
            type_url: self.type_url().to_string(),
            value: PubKey {
                key: self.as_bytes().to_vec(),
            }
            .encode_to_vec(),
        }
    }

    /// Account address bytes derived from the key.
    ///
    /// secp256k1 uses `RIPEMD160(SHA256(key))`; ed25519 uses the first 20
    /// bytes of `SHA256(key)`.
    pub fn address(&self) -> Vec<u8> {
        let sha = Sha256::digest(self.as_bytes());
        match self {
            PublicKey::Secp256k1(_) => Ripemd160::digest(sha).to_vec(),
            PublicKey::Ed25519(_) => sha[..20].to_vec(),
        }
    }

    /// The all-zero secp256k1 key used for simulation when no real key is
    /// available.
    pub fn empty_secp256k1() -> Self {
        PublicKey::Secp256k1(vec![0; SECP256K1_PUBLIC_KEY_LENGTH])
    }
}

/// A private key. Key bytes are zeroized when dropped.
#[derive(Clone)]
pub enum PrivateKey {
    /// secp256k1 signing key.
    Secp256k1(k256::ecdsa::SigningKey),
    /// ed25519 signing key.
    Ed25519(ed25519_dalek::SigningKey),
}

impl PrivateKey {
    /// Generates a fresh random key.
    pub fn generate(algorithm: KeyAlgorithm) -> Self {
        let mut rng = rand::rngs::OsRng;
        match algorithm {
            KeyAlgorithm::Secp256k1 => {
                PrivateKey::Secp256k1(k256::ecdsa::SigningKey::random(&mut rng))
            }
            KeyAlgorithm::Ed25519 => {
                PrivateKey::Ed25519(ed25519_dalek::SigningKey::generate(&mut rng))
            }
        }
    }

    /// Creates a key from 32 raw secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::InvalidKey`] if the bytes have the wrong length or
    /// are not a valid scalar.
    pub fn from_bytes(algorithm: KeyAlgorithm, bytes: &[u8]) -> TxResult<Self> {
        match algorithm {
            KeyAlgorithm::Secp256k1 => k256::ecdsa::SigningKey::from_slice(bytes)
                .map(PrivateKey::Secp256k1)
                .map_err(|e| TxError::InvalidKey(e.to_string())),
            KeyAlgorithm::Ed25519 => {
                let secret: [u8; 32] = bytes.try_into().map_err(|_| {
                    TxError::InvalidKey(format!("expected 32 bytes, got {}", bytes.len()))
                })?;
                Ok(PrivateKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(
                    &secret,
                )))
            }
        }
    }

    /// Creates a key from a hex string, with or without a `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::InvalidKey`] if the string is not valid hex or
    /// not a valid key.
    pub fn from_hex(algorithm: KeyAlgorithm, hex_str: &str) -> TxResult<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = Zeroizing::new(
            hex::decode(hex_str).map_err(|e| TxError::InvalidKey(e.to_string()))?,
        );
        Self::from_bytes(algorithm, &bytes)
    }

    /// Derives a secp256k1 key from a BIP-39 mnemonic along `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::InvalidKey`] if the phrase is not a valid
    /// mnemonic or derivation produces an invalid key.
    pub fn from_mnemonic(phrase: &str, passphrase: &str, path: &[u32]) -> TxResult<Self> {
        let mnemonic = bip39::Mnemonic::parse_normalized(phrase)
            .map_err(|e| TxError::InvalidKey(format!("invalid mnemonic: {e}")))?;
        let seed = Zeroizing::new(mnemonic.to_seed_normalized(passphrase));
        derive_secp256k1(&seed[..], path).map(PrivateKey::Secp256k1)
    }

    /// Returns the algorithm of this key.
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PrivateKey::Secp256k1(_) => KeyAlgorithm::Secp256k1,
            PrivateKey::Ed25519(_) => KeyAlgorithm::Ed25519,
        }
    }

    /// Returns the matching public key.
    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Secp256k1(key) => {
                PublicKey::Secp256k1(key.verifying_key().to_sec1_bytes().to_vec())
            }
            PrivateKey::Ed25519(key) => PublicKey::Ed25519(key.verifying_key().to_bytes()),
        }
    }

    /// Signs `message`.
    ///
    /// secp256k1 signs `SHA256(message)` and returns the 64-byte `r || s`
    /// form with low S. ed25519 signs the message directly.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            PrivateKey::Secp256k1(key) => {
                let signature: k256::ecdsa::Signature = key.sign(message);
                signature.to_bytes().to_vec()
            }
            PrivateKey::Ed25519(key) => key.sign(message).to_bytes().to_vec(),
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey::{:?}([REDACTED])", self.algorithm())
    }
}

/// BIP-32 derivation of a secp256k1 key from a seed.
pub(crate) fn derive_secp256k1(seed: &[u8], path: &[u32]) -> TxResult<k256::ecdsa::SigningKey> {
    let mut mac = HmacSha512::new_from_slice(b"Bitcoin seed")
        .map_err(|e| TxError::InvalidKey(e.to_string()))?;
    mac.update(seed);
    let master = mac.finalize().into_bytes();

    let mut key = k256::ecdsa::SigningKey::from_slice(&master[..32])
        .map_err(|e| TxError::InvalidKey(e.to_string()))?;
    let mut chain_code = Zeroizing::new([0u8; 32]);
    chain_code.copy_from_slice(&master[32..]);

    for &index in path {
        let mut mac = HmacSha512::new_from_slice(&chain_code[..])
            .map_err(|e| TxError::InvalidKey(e.to_string()))?;
        if index & HARDENED != 0 {
            mac.update(&[0]);
            mac.update(&key.to_bytes());
        } else {
            mac.update(&key.verifying_key().to_sec1_bytes());
        }
        mac.update(&index.to_be_bytes());
        let child = mac.finalize().into_bytes();

        let tweak: Option<k256::Scalar> =
            k256::Scalar::from_repr(*k256::FieldBytes::from_slice(&child[..32])).into();
        let parent: Option<k256::Scalar> = k256::Scalar::from_repr(key.to_bytes()).into();
        let (tweak, parent) = tweak
            .zip(parent)
            .ok_or_else(|| TxError::InvalidKey(format!("invalid child key at index {index}")))?;

        key = k256::ecdsa::SigningKey::from_bytes(&(tweak + parent).to_bytes())
            .map_err(|e| TxError::InvalidKey(e.to_string()))?;
        chain_code.copy_from_slice(&child[32..]);
    }

    Ok(key)
}
