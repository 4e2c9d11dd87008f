//! Memo validation.

use crate::error::{TxError, TxResult};
use bip39::Language;

/// Maximum memo length in bytes.
pub const MAX_MEMO_BYTES: usize = 256;

/// Checks that a memo can be attached to a transaction.
///
/// The empty memo is always valid. A memo longer than [`MAX_MEMO_BYTES`]
/// bytes is rejected, as is a memo made of 12 to 24 BIP-39 words: memos
/// are public and a pasted seed phrase would leak the account.
///
/// # Errors
///
/// Returns [`TxError::Config`] if the memo is too long or is a mnemonic.
pub fn validate_memo(memo: &str) -> TxResult<()> {
    if memo.is_empty() {
        return Ok(());
    }
    if memo.len() > MAX_MEMO_BYTES {
        return Err(TxError::config(format!(
            "memo too large: {} bytes, maximum is {MAX_MEMO_BYTES}",
            memo.len()
        )));
    }
    if looks_like_mnemonic(&memo.to_lowercase()) {
        return Err(TxError::config(
            "cannot provide a valid mnemonic seed in the memo field",
        ));
    }
    Ok(())
}

/// Word count and wordlist membership only. The checksum is not verified,
/// so a phrase with a bad checksum is still treated as a seed phrase.
fn looks_like_mnemonic(memo: &str) -> bool {
    let words: Vec<&str> = memo.split_whitespace().collect();
    matches!(words.len(), 12 | 15 | 18 | 21 | 24)
        && words
            .iter()
            .all(|w| Language::English.find_word(w).is_some())
}
