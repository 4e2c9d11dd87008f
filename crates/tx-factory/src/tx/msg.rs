//! Domain messages carried by a transaction.

use crate::tx::proto::Any;
use std::fmt::Debug;

/// A message that can be packed into a transaction body.
///
/// Implementations supply their protobuf encoding and the addresses that
/// must sign for them. Message-specific business validation is the
/// application's concern, not the factory's.
pub trait Msg: Debug + Send + Sync {
    /// Fully qualified protobuf type URL, e.g. `/cosmos.bank.v1beta1.MsgSend`.
    fn type_url(&self) -> &str;

    /// Protobuf encoding of the message.
    fn encode_value(&self) -> Vec<u8>;

    /// Address strings of the accounts that must sign this message,
    /// in the order the message defines them.
    fn signers(&self) -> Vec<String>;

    /// Legacy amino JSON form, `{"type": ..., "value": ...}`.
    ///
    /// Required only for `SIGN_MODE_LEGACY_AMINO_JSON`.
    fn amino_json(&self) -> Option<serde_json::Value> {
        None
    }

    /// Packs the message into an [`Any`].
    fn to_any(&self) -> Any {
        Any {
            type_url: self.type_url().to_string(),
            value: self.encode_value(),
        }
    }
}

/// A pre-encoded message, for callers that already hold protobuf bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyMsg {
    type_url: String,
    value: Vec<u8>,
    signers: Vec<String>,
    amino: Option<serde_json::Value>,
}

impl AnyMsg {
    /// Creates a message from its type URL, encoded bytes and signers.
    pub fn new(type_url: impl Into<String>, value: Vec<u8>, signers: Vec<String>) -> Self {
        Self {
            type_url: type_url.into(),
            value,
            signers,
            amino: None,
        }
    }

    /// Attaches the legacy amino JSON form.
    #[must_use]
    pub fn with_amino_json(mut self, amino: serde_json::Value) -> Self {
        self.amino = Some(amino);
        self
    }
}

impl Msg for AnyMsg {
    fn type_url(&self) -> &str {
        &self.type_url
    }

    fn encode_value(&self) -> Vec<u8> {
        self.value.clone()
    }

    fn signers(&self) -> Vec<String> {
        self.signers.clone()
    }

    fn amino_json(&self) -> Option<serde_json::Value> {
        self.amino.clone()
    }
}

/// A message as stored inside a [`TxBuilder`](crate::TxBuilder).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EncodedMsg {
    pub(crate) any: Any,
    pub(crate) amino: Option<serde_json::Value>,
}

impl EncodedMsg {
    pub(crate) fn from_msg(msg: &dyn Msg) -> Self {
        Self {
            any: msg.to_any(),
            amino: msg.amino_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_any_msg() {
        let msg = AnyMsg::new("/test.v1.MsgPing", vec![8, 1], vec!["cosmos1abc".into()])
            .with_amino_json(json!({"type": "test/MsgPing", "value": {"n": "1"}}));

        let any = msg.to_any();
        assert_eq!(any.type_url, "/test.v1.MsgPing");
        assert_eq!(any.value, vec![8, 1]);
        assert_eq!(msg.signers(), vec!["cosmos1abc".to_string()]);
        assert!(msg.amino_json().is_some());
    }

    #[test]
    fn test_amino_json_defaults_to_none() {
        let msg = AnyMsg::new("/test.v1.MsgPing", vec![], vec![]);
        assert!(EncodedMsg::from_msg(&msg).amino.is_none());
    }
}
