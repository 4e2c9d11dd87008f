//! Value types shared across the crate: coins and addresses.

mod address;
mod coin;

pub use address::{AddressCodec, Bech32Codec};
pub use coin::{validate_denom, Coin, DecCoin, MAX_DECIMAL_PRECISION};

pub(crate) use coin::decimal_to_rational;
