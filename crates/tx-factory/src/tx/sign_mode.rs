//! Sign modes and the bytes each one signs.
//!
//! [`SignModeHandlerMap`] maps a sign mode, the signer's data and a
//! [`TxBuilder`] to the canonical bytes handed to the keystore. Every
//! handler is a pure function of its inputs.

use crate::error::{TxError, TxResult};
use crate::tx::builder::TxBuilder;
use crate::tx::proto::{Any, SignDoc, SignDocDirectAux};
use prost::Message;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// How a signer commits to the transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignMode {
    /// No mode chosen. Invalid at signing time.
    #[default]
    Unspecified,
    /// Sign the protobuf `SignDoc` (body, auth info, chain, account).
    Direct,
    /// Sign a human readable rendering of the transaction.
    Textual,
    /// Sign the body without the fee, for auxiliary signers.
    DirectAux,
    /// Sign the legacy amino JSON `StdSignDoc`.
    #[serde(rename = "amino-json")]
    LegacyAminoJson,
}

impl SignMode {
    /// Every mode that produces sign bytes.
    pub const SUPPORTED: [SignMode; 4] = [
        SignMode::Direct,
        SignMode::Textual,
        SignMode::DirectAux,
        SignMode::LegacyAminoJson,
    ];

    /// Protobuf enum value of `cosmos.tx.signing.v1beta1.SignMode`.
    pub fn as_i32(self) -> i32 {
        match self {
            SignMode::Unspecified => 0,
            SignMode::Direct => 1,
            SignMode::Textual => 2,
            SignMode::DirectAux => 3,
            SignMode::LegacyAminoJson => 127,
        }
    }

    /// Command-line name of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            SignMode::Unspecified => "unspecified",
            SignMode::Direct => "direct",
            SignMode::Textual => "textual",
            SignMode::DirectAux => "direct-aux",
            SignMode::LegacyAminoJson => "amino-json",
        }
    }
}

impl fmt::Display for SignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignMode {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "unspecified" => Ok(SignMode::Unspecified),
            "direct" => Ok(SignMode::Direct),
            "textual" => Ok(SignMode::Textual),
            "direct-aux" => Ok(SignMode::DirectAux),
            "amino-json" => Ok(SignMode::LegacyAminoJson),
            other => Err(TxError::config(format!("unknown sign mode: {other}"))),
        }
    }
}

/// Per-signer data that sign bytes commit to.
#[derive(Debug, Clone, PartialEq)]
pub struct SignerData {
    /// Signer address, rendered by the address codec.
    pub address: String,
    /// Chain identifier.
    pub chain_id: String,
    /// Signer's account number.
    pub account_number: u64,
    /// Signer's sequence.
    pub sequence: u64,
    /// Signer's public key.
    pub public_key: Any,
}

/// The set of sign modes a factory accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignModeHandlerMap {
    enabled: Vec<SignMode>,
}

impl Default for SignModeHandlerMap {
    fn default() -> Self {
        Self::new(SignMode::SUPPORTED)
    }
}

impl SignModeHandlerMap {
    /// Enables exactly the given modes. `Unspecified` is ignored.
    pub fn new(modes: impl IntoIterator<Item = SignMode>) -> Self {
        let mut enabled = Vec::new();
        for mode in modes {
            if mode != SignMode::Unspecified && !enabled.contains(&mode) {
                enabled.push(mode);
            }
        }
        Self { enabled }
    }

    /// Returns true if `mode` has a handler.
    pub fn is_enabled(&self, mode: SignMode) -> bool {
        self.enabled.contains(&mode)
    }

    /// Enabled modes, in registration order.
    pub fn modes(&self) -> &[SignMode] {
        &self.enabled
    }

    /// Checks that `mode` can be used for signing.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Config`] for `Unspecified` and
    /// [`TxError::UnsupportedSignMode`] for a mode without a handler.
    pub fn ensure_enabled(&self, mode: SignMode) -> TxResult<()> {
        if mode == SignMode::Unspecified {
            return Err(TxError::config("sign mode not specified"));
        }
        if !self.is_enabled(mode) {
            return Err(TxError::UnsupportedSignMode(mode.to_string()));
        }
        Ok(())
    }

    /// Produces the canonical bytes `data`'s signer signs for `tx`.
    ///
    /// # Errors
    ///
    /// Fails if the mode is unspecified or not enabled, or if a message
    /// lacks the encoding the mode needs.
    pub fn get_sign_bytes(
        &self,
        mode: SignMode,
        data: &SignerData,
        tx: &TxBuilder,
    ) -> TxResult<Vec<u8>> {
        self.ensure_enabled(mode)?;
        match mode {
            SignMode::Direct => Ok(direct_sign_bytes(data, tx)),
            SignMode::DirectAux => Ok(direct_aux_sign_bytes(data, tx)),
            SignMode::LegacyAminoJson => amino_json_sign_bytes(data, tx),
            SignMode::Textual => textual_sign_bytes(data, tx),
            SignMode::Unspecified => Err(TxError::config("sign mode not specified")),
        }
    }
}

fn direct_sign_bytes(data: &SignerData, tx: &TxBuilder) -> Vec<u8> {
    SignDoc {
        body_bytes: tx.body_bytes(),
        auth_info_bytes: tx.auth_info_bytes(),
        chain_id: data.chain_id.clone(),
        account_number: data.account_number,
    }
    .encode_to_vec()
}

fn direct_aux_sign_bytes(data: &SignerData, tx: &TxBuilder) -> Vec<u8> {
    SignDocDirectAux {
        body_bytes: tx.body_bytes(),
        public_key: Some(data.public_key.clone()),
        chain_id: data.chain_id.clone(),
        account_number: data.account_number,
        sequence: data.sequence,
    }
    .encode_to_vec()
}

fn amino_json_sign_bytes(data: &SignerData, tx: &TxBuilder) -> TxResult<Vec<u8>> {
    let msgs = tx
        .encoded_msgs()
        .iter()
        .map(|m| {
            m.amino.clone().ok_or_else(|| {
                TxError::encoding(format!(
                    "message {} has no amino JSON form",
                    m.any.type_url
                ))
            })
        })
        .collect::<TxResult<Vec<_>>>()?;

    let mut fee = json!({
        "amount": tx.fee_amount().iter().map(|c| json!({
            "amount": c.amount.to_string(),
            "denom": c.denom,
        })).collect::<Vec<_>>(),
        "gas": tx.gas_limit().to_string(),
    });
    if !tx.fee_payer().is_empty() {
        fee["payer"] = json!(tx.fee_payer());
    }
    if !tx.fee_granter().is_empty() {
        fee["granter"] = json!(tx.fee_granter());
    }

    let mut doc = json!({
        "account_number": data.account_number.to_string(),
        "chain_id": data.chain_id,
        "fee": fee,
        "memo": tx.memo(),
        "msgs": msgs,
        "sequence": data.sequence.to_string(),
    });
    if tx.timeout_height() != 0 {
        doc["timeout_height"] = json!(tx.timeout_height().to_string());
    }

    canonical_json(&doc)
}

/// One line of the human readable rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Screen {
    title: String,
    content: String,
    indent: u32,
    expert: bool,
}

impl Screen {
    fn new(title: &str, content: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            content: content.into(),
            indent: 0,
            expert: false,
        }
    }

    fn indent(mut self, indent: u32) -> Self {
        self.indent = indent;
        self
    }

    fn expert(mut self) -> Self {
        self.expert = true;
        self
    }
}

fn textual_sign_bytes(data: &SignerData, tx: &TxBuilder) -> TxResult<Vec<u8>> {
    let mut screens = vec![
        Screen::new("Chain id", data.chain_id.as_str()),
        Screen::new("Account number", data.account_number.to_string()),
        Screen::new("Sequence", data.sequence.to_string()),
        Screen::new("Address", data.address.as_str()),
        Screen::new("Public key", data.public_key.type_url.as_str()).expert(),
        Screen::new("Public key bytes", hex::encode(&data.public_key.value))
            .indent(1)
            .expert(),
    ];

    let msgs = tx.encoded_msgs();
    let plural = if msgs.len() == 1 { "" } else { "s" };
    screens.push(Screen::new(
        "",
        format!("This transaction has {} Message{plural}", msgs.len()),
    ));
    for (i, msg) in msgs.iter().enumerate() {
        screens.push(
            Screen::new(
                &format!("Message ({}/{})", i + 1, msgs.len()),
                msg.any.type_url.as_str(),
            )
            .indent(1),
        );
        screens.push(Screen::new("Message bytes", hex::encode(&msg.any.value)).indent(2));
    }
    screens.push(Screen::new("", "End of Messages"));

    if !tx.memo().is_empty() {
        screens.push(Screen::new("Memo", tx.memo()));
    }
    let fees = tx
        .fee_amount()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    screens.push(Screen::new("Fees", fees));
    if !tx.fee_payer().is_empty() {
        screens.push(Screen::new("Fee payer", tx.fee_payer()).expert());
    }
    if !tx.fee_granter().is_empty() {
        screens.push(Screen::new("Fee granter", tx.fee_granter()).expert());
    }
    screens.push(Screen::new("Gas limit", tx.gas_limit().to_string()).expert());
    if tx.timeout_height() != 0 {
        screens.push(Screen::new("Timeout height", tx.timeout_height().to_string()));
    }
    if tx.unordered() {
        screens.push(Screen::new("Unordered", "True").expert());
    }
    for other in tx.signers().iter().filter(|s| s.address() != data.address) {
        screens.push(Screen::new("Other signer", other.address()).expert());
    }

    let mut hasher = Sha256::new();
    hasher.update(tx.body_bytes());
    hasher.update(tx.auth_info_bytes());
    screens.push(Screen::new("Hash of raw bytes", hex::encode(hasher.finalize())).expert());

    let value = serde_json::to_value(&screens).map_err(TxError::encoding)?;
    canonical_json(&value)
}

/// Compact JSON with object keys sorted at every level.
pub(crate) fn canonical_json(value: &Value) -> TxResult<Vec<u8>> {
    serde_json::to_vec(&sort_keys(value)).map_err(TxError::encoding)
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
