//! The transaction factory.

use crate::client::{AccountResolver, SimulateResponse, Simulator};
use crate::error::{TxError, TxResult};
use crate::keyring::{Keystore, PublicKey};
use crate::tx::builder::{SignerAccount, SignerSlot, TxBuilder};
use crate::tx::gas::{adjust_gas, fees_from_gas_prices};
use crate::tx::memo::validate_memo;
use crate::tx::msg::{EncodedMsg, Msg};
use crate::tx::params::TxParameters;
use crate::tx::proto::{ModeInfo, SignerInfo};
use crate::tx::sign_mode::{SignMode, SignModeHandlerMap, SignerData};
use crate::types::{AddressCodec, Coin, DecCoin};
use std::sync::Arc;
use tracing::{debug, info};

/// Builds, simulates and signs transactions.
///
/// A factory pairs a set of [`TxParameters`] with the collaborators it
/// needs: a [`Keystore`] for keys and signatures, an [`AccountResolver`]
/// and a [`Simulator`] for network state, and an [`AddressCodec`] for
/// rendering addresses. Collaborators are shared; the parameters are owned
/// and changed only through `&mut self` operations or the consuming
/// `with_*` setters.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tx_factory::client::RestClient;
/// use tx_factory::config::NodeConfig;
/// use tx_factory::keyring::{KeyAlgorithm, MemoryKeyring};
/// use tx_factory::tx::{AccountConfig, AnyMsg, Msg};
/// use tx_factory::types::Bech32Codec;
/// use tx_factory::{Factory, SignMode, TxParameters};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let keyring = Arc::new(MemoryKeyring::new());
///     keyring.generate("alice", KeyAlgorithm::Secp256k1)?;
///     let node = Arc::new(RestClient::new(NodeConfig::local())?);
///
///     let mut params = TxParameters::new("demo");
///     params.account = AccountConfig::from_name("alice");
///     params.sign_mode = SignMode::Direct;
///
///     let mut factory = Factory::new(
///         keyring,
///         node.clone(),
///         node,
///         Arc::new(Bech32Codec::default()),
///         params,
///     )
///     .with_gas_adjustment(1.3);
///
///     let msg = AnyMsg::new("/example.v1.MsgPing", vec![], vec!["cosmos1...".into()]);
///     let tx = factory.build_signed_tx(&[&msg as &dyn Msg]).await?;
///     println!("{} bytes", tx.encode().len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Factory {
    keystore: Arc<dyn Keystore>,
    account_resolver: Arc<dyn AccountResolver>,
    simulator: Arc<dyn Simulator>,
    address_codec: Arc<dyn AddressCodec>,
    handler_map: SignModeHandlerMap,
    params: TxParameters,
}

impl Factory {
    /// Creates a factory with every sign mode enabled.
    pub fn new(
        keystore: Arc<dyn Keystore>,
        account_resolver: Arc<dyn AccountResolver>,
        simulator: Arc<dyn Simulator>,
        address_codec: Arc<dyn AddressCodec>,
        params: TxParameters,
    ) -> Self {
        Self {
            keystore,
            account_resolver,
            simulator,
            address_codec,
            handler_map: SignModeHandlerMap::default(),
            params,
        }
    }

    /// Restricts signing to the modes in `handler_map`.
    #[must_use]
    pub fn with_sign_modes(mut self, handler_map: SignModeHandlerMap) -> Self {
        self.handler_map = handler_map;
        self
    }

    /// Sets the gas limit. Zero means estimate via simulation.
    #[must_use]
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.params.gas.gas = gas;
        self
    }

    /// Sets the multiplier applied to simulated gas.
    #[must_use]
    pub fn with_gas_adjustment(mut self, gas_adjustment: f64) -> Self {
        self.params.gas.gas_adjustment = gas_adjustment;
        self
    }

    /// Sets the gas prices.
    #[must_use]
    pub fn with_gas_prices(mut self, gas_prices: Vec<DecCoin>) -> Self {
        self.params.gas.gas_prices = gas_prices;
        self
    }

    /// Sets an explicit fee.
    #[must_use]
    pub fn with_fees(mut self, fees: Vec<Coin>) -> Self {
        self.params.fee.fees = fees;
        self
    }

    /// Sets the account sequence.
    #[must_use]
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.params.account.sequence = sequence;
        self
    }

    /// Sets the account number.
    #[must_use]
    pub fn with_account_number(mut self, account_number: u64) -> Self {
        self.params.account.account_number = account_number;
        self
    }

    /// Sets the memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.params.memo = memo.into();
        self
    }

    /// Sets the sign mode.
    #[must_use]
    pub fn with_sign_mode(mut self, sign_mode: SignMode) -> Self {
        self.params.sign_mode = sign_mode;
        self
    }

    /// Sets the chain identifier.
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.params.chain_id = chain_id.into();
        self
    }

    /// Sets the timeout height.
    #[must_use]
    pub fn with_timeout_height(mut self, timeout_height: u64) -> Self {
        self.params.execution.timeout_height = timeout_height;
        self
    }

    /// Current parameters.
    pub fn params(&self) -> &TxParameters {
        &self.params
    }

    /// Chain identifier.
    pub fn chain_id(&self) -> &str {
        &self.params.chain_id
    }

    /// Gas limit. Zero until set or estimated.
    pub fn gas(&self) -> u64 {
        self.params.gas.gas
    }

    /// Account sequence.
    pub fn sequence(&self) -> u64 {
        self.params.account.sequence
    }

    /// Account number.
    pub fn account_number(&self) -> u64 {
        self.params.account.account_number
    }

    /// Sign mode.
    pub fn sign_mode(&self) -> SignMode {
        self.params.sign_mode
    }

    /// Enabled sign modes.
    pub fn sign_modes(&self) -> &SignModeHandlerMap {
        &self.handler_map
    }

    /// Resolves the sending account.
    ///
    /// The address comes from `from_address`, or from the keystore entry
    /// named `from_name`, and is written back into the parameters. When
    /// online, account number and sequence are fetched from the resolver
    /// and overwrite the configured values; offline, the configured values
    /// are trusted as-is. Calling `prepare` again re-resolves.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Config`] if no address can be determined and
    /// [`TxError::AccountLookup`] if the resolver fails.
    pub async fn prepare(&mut self) -> TxResult<()> {
        let address = self.resolve_from_address()?;

        if self.params.execution.offline {
            debug!(
                account_number = self.params.account.account_number,
                sequence = self.params.account.sequence,
                "offline, using configured account data"
            );
            self.params.account.from_address = address;
            return Ok(());
        }

        let address_str = self.address_codec.bytes_to_string(&address)?;
        let account = self
            .account_resolver
            .resolve(&address_str)
            .await
            .map_err(|source| TxError::AccountLookup {
                address: address_str.clone(),
                source,
            })?;

        debug!(
            address = %address_str,
            account_number = account.account_number,
            sequence = account.sequence,
            "prepared account"
        );
        self.params.account.from_address = address;
        self.params.account.account_number = account.account_number;
        self.params.account.sequence = account.sequence;
        Ok(())
    }

    fn resolve_from_address(&self) -> TxResult<Vec<u8>> {
        let account = &self.params.account;
        if !account.from_address.is_empty() {
            return Ok(account.from_address.clone());
        }
        if account.from_name.is_empty() {
            return Err(TxError::config("missing from address and from name"));
        }
        self.keystore
            .address_by_name(&account.from_name)
            .map_err(|e| {
                TxError::config(format!(
                    "cannot resolve from name {}: {e}",
                    account.from_name
                ))
            })
    }

    /// Assembles an unsigned transaction from `msgs`.
    ///
    /// Required signers are collected from the messages in first-seen
    /// order, deduplicated by address bytes. The fee is the configured
    /// `fees`, or the gas prices times the gas limit rounded up.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Config`] if the chain id is missing, if both fees
    /// and gas prices are set, or if the memo is invalid.
    /// [`TxError::InvalidAddress`] if a message names a malformed signer.
    pub fn build_unsigned_tx(&self, msgs: &[&dyn Msg]) -> TxResult<TxBuilder> {
        let params = &self.params;
        if params.chain_id.is_empty() {
            let message = if params.execution.offline && params.execution.generate_only {
                "chain ID required but not specified for offline generate-only mode"
            } else {
                "chain ID required but not specified"
            };
            return Err(TxError::config(message));
        }
        if !params.fee.fees.is_empty() && !params.gas.gas_prices.is_empty() {
            return Err(TxError::config("cannot provide both fees and gas prices"));
        }
        validate_memo(&params.memo)?;

        let mut signers: Vec<SignerSlot> = Vec::new();
        let mut encoded = Vec::with_capacity(msgs.len());
        for msg in msgs {
            for signer in msg.signers() {
                let bytes = self.address_codec.string_to_bytes(&signer)?;
                if !signers.iter().any(|s| s.address_bytes() == bytes.as_slice()) {
                    let address = self.address_codec.bytes_to_string(&bytes)?;
                    signers.push(SignerSlot::new(address, bytes));
                }
            }
            encoded.push(EncodedMsg::from_msg(*msg));
        }

        let fees = if params.fee.fees.is_empty() {
            fees_from_gas_prices(&params.gas.gas_prices, params.gas.gas)
        } else {
            params.fee.fees.clone()
        };

        let mut tx = TxBuilder::new(encoded, signers);
        tx.set_memo(params.memo.clone());
        tx.set_fee_amount(fees);
        tx.set_gas_limit(params.gas.gas);
        tx.set_timeout_height(params.execution.timeout_height);
        tx.set_unordered(params.execution.unordered);
        if let Some(payer) = &params.fee.fee_payer {
            tx.set_fee_payer(self.address_codec.bytes_to_string(payer)?);
        }
        if let Some(granter) = &params.fee.fee_granter {
            tx.set_fee_granter(self.address_codec.bytes_to_string(granter)?);
        }
        Ok(tx)
    }

    /// Encodes a throwaway transaction suitable for simulation.
    ///
    /// The transaction carries a single signer info with the factory's own
    /// public key when the keystore knows it, otherwise an all-zero
    /// secp256k1 key, and one empty signature.
    ///
    /// # Errors
    ///
    /// Fails with whatever [`Factory::build_unsigned_tx`] fails with.
    pub fn build_sim_tx(&self, msgs: &[&dyn Msg]) -> TxResult<Vec<u8>> {
        let tx = self.build_unsigned_tx(msgs)?;

        let public_key = self
            .own_public_key()
            .unwrap_or_else(PublicKey::empty_secp256k1);
        let mode = match self.params.sign_mode {
            SignMode::Unspecified => SignMode::Direct,
            mode => mode,
        };
        let info = SignerInfo {
            public_key: Some(public_key.to_any()),
            mode_info: Some(ModeInfo::single(mode.as_i32())),
            sequence: self.params.account.sequence,
        };
        Ok(tx.encode_with(vec![info], vec![Vec::new()]))
    }

    fn own_public_key(&self) -> Option<PublicKey> {
        let account = &self.params.account;
        let name = if account.from_name.is_empty() {
            self.keystore.name_by_address(&account.from_address).ok()?
        } else {
            account.from_name.clone()
        };
        self.keystore.public_key(&name).ok()
    }

    /// Simulates `msgs` and returns the response with the gas used.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Offline`] when offline, [`TxError::Simulation`]
    /// if the simulator fails, or any error of [`Factory::build_sim_tx`].
    pub async fn simulate(&self, msgs: &[&dyn Msg]) -> TxResult<(SimulateResponse, u64)> {
        if self.params.execution.offline {
            return Err(TxError::Offline("simulate"));
        }
        let tx_bytes = self.build_sim_tx(msgs)?;
        let response = self
            .simulator
            .simulate(&tx_bytes)
            .await
            .map_err(TxError::Simulation)?;
        let gas_used = response.gas_info.gas_used;
        debug!(gas_used, tx_size = tx_bytes.len(), "simulated transaction");
        Ok((response, gas_used))
    }

    /// Estimates the gas limit by simulation and stores it.
    ///
    /// The stored limit is the simulated gas times the gas adjustment,
    /// rounded up. Nothing changes unless the simulation succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Offline`] when offline, or any error of
    /// [`Factory::simulate`].
    pub async fn calculate_gas(&mut self, msgs: &[&dyn Msg]) -> TxResult<u64> {
        if self.params.execution.offline {
            return Err(TxError::Offline("calculate gas"));
        }
        let (_, gas_used) = self.simulate(msgs).await?;
        let adjustment = self.params.gas.effective_adjustment();
        let gas = adjust_gas(gas_used, adjustment);
        debug!(gas_used, adjustment, gas, "estimated gas");
        self.params.gas.gas = gas;
        Ok(gas)
    }

    /// Signs `tx` for every required signer.
    ///
    /// Account data for the factory's own address (`from_address`, or the
    /// address of the `from_name` key) comes from the parameters, so
    /// `prepare` need not run first. Any other signer needs it populated
    /// first with [`TxBuilder::set_signer_account`]. Sequences are used as
    /// configured and never incremented. Every signer info is set before
    /// sign bytes are computed, and `tx` is only modified if all signers
    /// succeed.
    ///
    /// # Errors
    ///
    /// - [`TxError::Config`] if the transaction has no signers or the sign
    ///   mode is unspecified
    /// - [`TxError::UnsupportedSignMode`] if the mode is not enabled
    /// - [`TxError::AlreadySigned`] if a signature exists and `overwrite`
    ///   is false
    /// - [`TxError::KeyNotFound`] if the keystore lacks a signer's key
    /// - [`TxError::MultiSignerResolution`] if a co-signer has no account data
    /// - [`TxError::Signing`] if the keystore fails to sign
    pub fn sign(&self, tx: &mut TxBuilder, overwrite: bool) -> TxResult<()> {
        let mode = self.params.sign_mode;
        self.handler_map.ensure_enabled(mode)?;
        if tx.signers().is_empty() {
            return Err(TxError::config("transaction has no signers"));
        }
        if !overwrite {
            if let Some(slot) = tx.signers().iter().find(|s| s.is_signed()) {
                return Err(TxError::AlreadySigned(slot.address().to_string()));
            }
        }

        let own_address = self.resolve_from_address().ok();
        let mut resolved = Vec::with_capacity(tx.signers().len());
        for slot in tx.signers() {
            let name = self.keystore.name_by_address(slot.address_bytes())?;
            let public_key = self.keystore.public_key(&name)?;
            let account = if own_address.as_deref() == Some(slot.address_bytes()) {
                SignerAccount {
                    account_number: self.params.account.account_number,
                    sequence: self.params.account.sequence,
                }
            } else {
                slot.account()
                    .ok_or_else(|| TxError::MultiSignerResolution(slot.address().to_string()))?
            };
            resolved.push((name, public_key.to_any(), account));
        }

        let mut staged = tx.clone();
        for (index, (_, public_key, account)) in resolved.iter().enumerate() {
            staged.set_signer_info(
                index,
                SignerInfo {
                    public_key: Some(public_key.clone()),
                    mode_info: Some(ModeInfo::single(mode.as_i32())),
                    sequence: account.sequence,
                },
            );
        }

        let mut signatures = Vec::with_capacity(resolved.len());
        for ((name, public_key, account), slot) in resolved.into_iter().zip(staged.signers()) {
            let data = SignerData {
                address: slot.address().to_string(),
                chain_id: self.params.chain_id.clone(),
                account_number: account.account_number,
                sequence: account.sequence,
                public_key,
            };
            let bytes = self.handler_map.get_sign_bytes(mode, &data, &staged)?;
            let signature = self.keystore.sign(&name, &bytes)?;
            debug!(signer = %data.address, key_name = %name, sequence = account.sequence, "signed");
            signatures.push(signature);
        }

        for (index, signature) in signatures.into_iter().enumerate() {
            staged.set_signature(index, signature);
        }
        *tx = staged;

        info!(
            chain_id = %self.params.chain_id,
            sign_mode = %mode,
            signers = tx.signers().len(),
            "signed transaction"
        );
        Ok(())
    }

    /// Produces the bytes `data`'s signer signs for `tx` under the
    /// factory's sign mode.
    ///
    /// # Errors
    ///
    /// See [`SignModeHandlerMap::get_sign_bytes`].
    pub fn get_sign_bytes(&self, data: &SignerData, tx: &TxBuilder) -> TxResult<Vec<u8>> {
        self.handler_map
            .get_sign_bytes(self.params.sign_mode, data, tx)
    }

    /// Runs the whole pipeline: prepare, estimate gas when the limit is
    /// zero and the factory is online, build, and sign unless
    /// `generate_only` is set.
    ///
    /// # Errors
    ///
    /// Any error of the individual steps.
    pub async fn build_signed_tx(&mut self, msgs: &[&dyn Msg]) -> TxResult<TxBuilder> {
        self.prepare().await?;
        if self.params.gas.gas == 0 && !self.params.execution.offline {
            self.calculate_gas(msgs).await?;
        }

        let mut tx = self.build_unsigned_tx(msgs)?;
        if self.params.execution.generate_only {
            info!(chain_id = %self.params.chain_id, "generated unsigned transaction");
            return Ok(tx);
        }
        self.sign(&mut tx, false)?;
        Ok(tx)
    }
}
