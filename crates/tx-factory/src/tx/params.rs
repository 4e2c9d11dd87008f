//! Per-transaction configuration consumed by the [`Factory`](crate::Factory).

use crate::tx::sign_mode::SignMode;
use crate::types::{Coin, DecCoin};

/// Identity of the account sending the transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountConfig {
    /// Raw address bytes. Empty when the address is derived from
    /// `from_name` during [`Factory::prepare`](crate::Factory::prepare).
    pub from_address: Vec<u8>,
    /// Keystore name of the sending key.
    pub from_name: String,
    /// On-chain account number.
    pub account_number: u64,
    /// Account sequence used for replay protection.
    pub sequence: u64,
}

impl AccountConfig {
    /// Account identified by raw address bytes.
    pub fn from_address(address: impl Into<Vec<u8>>) -> Self {
        Self {
            from_address: address.into(),
            ..Default::default()
        }
    }

    /// Account identified by a keystore name.
    pub fn from_name(name: impl Into<String>) -> Self {
        Self {
            from_name: name.into(),
            ..Default::default()
        }
    }
}

/// Gas limit and gas pricing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GasConfig {
    /// Gas limit. Zero means unset: estimate it via simulation.
    pub gas: u64,
    /// Multiplier applied to simulated gas. Values `<= 0` are treated as 1.0.
    pub gas_adjustment: f64,
    /// Price per unit of gas, one entry per fee denomination.
    pub gas_prices: Vec<DecCoin>,
}

impl GasConfig {
    /// Returns the adjustment to apply to a simulated gas amount.
    pub fn effective_adjustment(&self) -> f64 {
        if self.gas_adjustment > 0.0 && self.gas_adjustment.is_finite() {
            self.gas_adjustment
        } else {
            1.0
        }
    }
}

/// Explicit fee amount and fee delegation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeConfig {
    /// Fee to pay. Mutually exclusive with [`GasConfig::gas_prices`].
    pub fees: Vec<Coin>,
    /// Address bytes of the account paying the fee, if not the first signer.
    pub fee_payer: Option<Vec<u8>>,
    /// Address bytes of a fee granter (fee allowance).
    pub fee_granter: Option<Vec<u8>>,
}

/// Flags that change how far the pipeline is allowed to go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Never contact the network: no account lookup, no simulation.
    pub offline: bool,
    /// Build the transaction but do not sign or broadcast it.
    pub generate_only: bool,
    /// Unordered transaction: replay protection by timeout instead of sequence.
    pub unordered: bool,
    /// Block height after which the transaction is no longer valid. Zero
    /// means no timeout.
    pub timeout_height: u64,
}

/// Everything needed to build, simulate and sign one transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxParameters {
    /// Chain identifier, e.g. `cosmoshub-4`.
    pub chain_id: String,
    /// Sign mode used for every signer.
    pub sign_mode: SignMode,
    /// Free-form note attached to the transaction.
    pub memo: String,
    /// Sending account.
    pub account: AccountConfig,
    /// Gas policy.
    pub gas: GasConfig,
    /// Fee policy.
    pub fee: FeeConfig,
    /// Execution flags.
    pub execution: ExecutionOptions,
}

impl TxParameters {
    /// Parameters for `chain_id` with every other field defaulted.
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            ..Default::default()
        }
    }
}
