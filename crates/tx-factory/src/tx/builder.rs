//! The in-progress transaction container.

use crate::error::{TxError, TxResult};
use crate::tx::msg::EncodedMsg;
use crate::tx::proto::{self, Any, AuthInfo, Fee, SignerInfo, TxBody, TxRaw};
use crate::types::Coin;
use prost::Message;

/// Account number and sequence of a signer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignerAccount {
    /// On-chain account number.
    pub account_number: u64,
    /// Account sequence.
    pub sequence: u64,
}

/// Signing state of one required signer.
///
/// A slot moves from unsigned, to carrying a signer info, to carrying a
/// signature. Slots are ordered by first appearance among the messages.
#[derive(Debug, Clone, PartialEq)]
pub struct SignerSlot {
    address: String,
    address_bytes: Vec<u8>,
    account: Option<SignerAccount>,
    signer_info: Option<SignerInfo>,
    signature: Option<Vec<u8>>,
}

impl SignerSlot {
    pub(crate) fn new(address: String, address_bytes: Vec<u8>) -> Self {
        Self {
            address,
            address_bytes,
            account: None,
            signer_info: None,
            signature: None,
        }
    }

    /// Address string as rendered by the address codec.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Raw address bytes.
    pub fn address_bytes(&self) -> &[u8] {
        &self.address_bytes
    }

    /// Externally supplied account data, if any.
    pub fn account(&self) -> Option<SignerAccount> {
        self.account
    }

    /// Signer info, once set by signing.
    pub fn signer_info(&self) -> Option<&SignerInfo> {
        self.signer_info.as_ref()
    }

    /// Signature, once signed.
    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    /// Returns true if this signer has signed.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

/// A transaction under construction.
///
/// Produced by [`Factory::build_unsigned_tx`](crate::Factory::build_unsigned_tx)
/// and completed by [`Factory::sign`](crate::Factory::sign). The builder is
/// owned by the caller; the factory never keeps a reference to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TxBuilder {
    msgs: Vec<EncodedMsg>,
    memo: String,
    fee_amount: Vec<Coin>,
    gas_limit: u64,
    fee_payer: String,
    fee_granter: String,
    timeout_height: u64,
    unordered: bool,
    signers: Vec<SignerSlot>,
}

impl TxBuilder {
    pub(crate) fn new(msgs: Vec<EncodedMsg>, signers: Vec<SignerSlot>) -> Self {
        Self {
            msgs,
            memo: String::new(),
            fee_amount: Vec::new(),
            gas_limit: 0,
            fee_payer: String::new(),
            fee_granter: String::new(),
            timeout_height: 0,
            unordered: false,
            signers,
        }
    }

    /// Number of messages.
    pub fn msg_count(&self) -> usize {
        self.msgs.len()
    }

    /// Messages packed as [`Any`], in order.
    pub fn messages(&self) -> Vec<Any> {
        self.msgs.iter().map(|m| m.any.clone()).collect()
    }

    pub(crate) fn encoded_msgs(&self) -> &[EncodedMsg] {
        &self.msgs
    }

    /// Transaction memo.
    pub fn memo(&self) -> &str {
        &self.memo
    }

    /// Fee amount.
    pub fn fee_amount(&self) -> &[Coin] {
        &self.fee_amount
    }

    /// Gas limit.
    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Fee payer address, empty if unset.
    pub fn fee_payer(&self) -> &str {
        &self.fee_payer
    }

    /// Fee granter address, empty if unset.
    pub fn fee_granter(&self) -> &str {
        &self.fee_granter
    }

    /// Timeout height, zero if unset.
    pub fn timeout_height(&self) -> u64 {
        self.timeout_height
    }

    /// Whether this is an unordered transaction.
    pub fn unordered(&self) -> bool {
        self.unordered
    }

    /// Sets the memo.
    pub fn set_memo(&mut self, memo: impl Into<String>) {
        self.memo = memo.into();
    }

    /// Sets the fee amount.
    pub fn set_fee_amount(&mut self, amount: Vec<Coin>) {
        self.fee_amount = amount;
    }

    /// Sets the gas limit.
    pub fn set_gas_limit(&mut self, gas_limit: u64) {
        self.gas_limit = gas_limit;
    }

    /// Sets the fee payer address.
    pub fn set_fee_payer(&mut self, payer: impl Into<String>) {
        self.fee_payer = payer.into();
    }

    /// Sets the fee granter address.
    pub fn set_fee_granter(&mut self, granter: impl Into<String>) {
        self.fee_granter = granter.into();
    }

    /// Sets the timeout height.
    pub fn set_timeout_height(&mut self, height: u64) {
        self.timeout_height = height;
    }

    /// Marks the transaction as unordered.
    pub fn set_unordered(&mut self, unordered: bool) {
        self.unordered = unordered;
    }

    /// Required signer slots, in order.
    pub fn signers(&self) -> &[SignerSlot] {
        &self.signers
    }

    /// Supplies account number and sequence for a co-signer whose account
    /// is not the factory's own.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Config`] if `address` is not a required signer.
    pub fn set_signer_account(
        &mut self,
        address: &str,
        account_number: u64,
        sequence: u64,
    ) -> TxResult<()> {
        let slot = self
            .signers
            .iter_mut()
            .find(|s| s.address == address)
            .ok_or_else(|| TxError::config(format!("{address} is not a signer of this transaction")))?;
        slot.account = Some(SignerAccount {
            account_number,
            sequence,
        });
        Ok(())
    }

    pub(crate) fn set_signer_info(&mut self, index: usize, info: SignerInfo) {
        if let Some(slot) = self.signers.get_mut(index) {
            slot.signer_info = Some(info);
        }
    }

    pub(crate) fn set_signature(&mut self, index: usize, signature: Vec<u8>) {
        if let Some(slot) = self.signers.get_mut(index) {
            slot.signature = Some(signature);
        }
    }

    /// Signer infos of all signers, or `None` until every signer has one.
    pub fn signer_infos(&self) -> Option<Vec<SignerInfo>> {
        if self.signers.is_empty() {
            return None;
        }
        self.signers
            .iter()
            .map(|s| s.signer_info.clone())
            .collect()
    }

    /// Signatures of all signers, or `None` until every signer has signed.
    pub fn signatures(&self) -> Option<Vec<Vec<u8>>> {
        if self.signers.is_empty() {
            return None;
        }
        self.signers.iter().map(|s| s.signature.clone()).collect()
    }

    /// The protobuf transaction body.
    pub fn body(&self) -> TxBody {
        TxBody {
            messages: self.messages(),
            memo: self.memo.clone(),
            timeout_height: self.timeout_height,
            unordered: self.unordered,
        }
    }

    /// The encoded transaction body.
    pub fn body_bytes(&self) -> Vec<u8> {
        self.body().encode_to_vec()
    }

    /// The protobuf fee.
    pub fn fee(&self) -> Fee {
        Fee {
            amount: self.fee_amount.iter().map(proto::Coin::from).collect(),
            gas_limit: self.gas_limit,
            payer: self.fee_payer.clone(),
            granter: self.fee_granter.clone(),
        }
    }

    /// Auth info with the signer infos set so far, in slot order.
    pub fn auth_info(&self) -> AuthInfo {
        self.auth_info_with(
            self.signers
                .iter()
                .filter_map(|s| s.signer_info.clone())
                .collect(),
        )
    }

    /// The encoded auth info.
    pub fn auth_info_bytes(&self) -> Vec<u8> {
        self.auth_info().encode_to_vec()
    }

    pub(crate) fn auth_info_with(&self, signer_infos: Vec<SignerInfo>) -> AuthInfo {
        AuthInfo {
            signer_infos,
            fee: Some(self.fee()),
        }
    }

    /// Encodes the transaction as `TxRaw` wire bytes.
    ///
    /// Signers that have a signer info but no signature yet contribute an
    /// empty signature, keeping both lists aligned.
    pub fn encode(&self) -> Vec<u8> {
        let (infos, signatures): (Vec<_>, Vec<_>) = self
            .signers
            .iter()
            .filter_map(|s| {
                s.signer_info
                    .clone()
                    .map(|info| (info, s.signature.clone().unwrap_or_default()))
            })
            .unzip();
        self.encode_with(infos, signatures)
    }

    pub(crate) fn encode_with(
        &self,
        signer_infos: Vec<SignerInfo>,
        signatures: Vec<Vec<u8>>,
    ) -> Vec<u8> {
        TxRaw {
            body_bytes: self.body_bytes(),
            auth_info_bytes: self.auth_info_with(signer_infos).encode_to_vec(),
            signatures,
        }
        .encode_to_vec()
    }
}
