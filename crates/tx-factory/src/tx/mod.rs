//! Transaction building and signing.
//!
//! The [`Factory`] drives the pipeline:
//!
//! 1. [`Factory::prepare`] resolves the sending account
//! 2. [`Factory::build_unsigned_tx`] assembles a [`TxBuilder`]
//! 3. [`Factory::calculate_gas`] optionally estimates gas via simulation
//! 4. [`Factory::sign`] attaches signer infos and signatures
//!
//! [`TxBuilder::encode`] then yields the `TxRaw` wire bytes.

mod builder;
mod factory;
mod gas;
mod memo;
mod msg;
mod params;
#[allow(missing_docs)]
pub mod proto;
mod sign_mode;

pub use builder::{SignerAccount, SignerSlot, TxBuilder};
pub use factory::Factory;
pub use gas::{adjust_gas, fees_from_gas_prices, mul_ceil};
pub use memo::{validate_memo, MAX_MEMO_BYTES};
pub use msg::{AnyMsg, Msg};
pub use params::{AccountConfig, ExecutionOptions, FeeConfig, GasConfig, TxParameters};
pub use sign_mode::{SignMode, SignModeHandlerMap, SignerData};
