//! Coin amounts used for fees and gas prices.
//!
//! Both [`Coin`] and [`DecCoin`] parse from the textual form used on the
//! command line, `<amount><denom>`, and from comma separated lists such as
//! `"10stake,0.025uatom"`.

use crate::error::{TxError, TxResult};
use num::{BigInt, BigRational, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of fractional digits in a decimal amount.
pub const MAX_DECIMAL_PRECISION: usize = 18;

/// Validates a denomination: `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> TxResult<()> {
    let mut chars = denom.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));
    if !starts_alpha || !valid_rest || !(3..=128).contains(&denom.len()) {
        return Err(TxError::InvalidCoin(format!("invalid denom: {denom:?}")));
    }
    Ok(())
}

/// An integer amount of a single denomination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination, e.g. `uatom`.
    pub denom: String,
    /// Amount in the smallest unit.
    #[serde(with = "amount_string")]
    pub amount: u128,
}

impl Coin {
    /// Creates a coin after validating the denomination.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::InvalidCoin`] if the denomination is malformed.
    pub fn new(amount: u128, denom: impl Into<String>) -> TxResult<Self> {
        let denom = denom.into();
        validate_denom(&denom)?;
        Ok(Self { denom, amount })
    }

    /// Parses a comma separated coin list. An empty string yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::InvalidCoin`] on a malformed entry or a
    /// duplicated denomination.
    pub fn parse_list(s: &str) -> TxResult<Vec<Self>> {
        parse_list(s)
    }
}

impl FromStr for Coin {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (amount, denom) = split_amount(s)?;
        if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TxError::InvalidCoin(format!("invalid amount in {s:?}")));
        }
        let amount = amount
            .parse::<u128>()
            .map_err(|e| TxError::InvalidCoin(format!("{s:?}: {e}")))?;
        Self::new(amount, denom)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A decimal amount of a single denomination, used for gas prices.
///
/// The amount is kept as a validated decimal string so that it can be
/// converted to an exact rational without floating point error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecCoin {
    /// Denomination, e.g. `uatom`.
    pub denom: String,
    amount: String,
}

impl DecCoin {
    /// Creates a decimal coin from an amount such as `"0.025"`.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::InvalidCoin`] if the amount is not a decimal with
    /// at most 18 fractional digits, or the denomination is malformed.
    pub fn new(amount: &str, denom: impl Into<String>) -> TxResult<Self> {
        let denom = denom.into();
        validate_denom(&denom)?;
        let amount = normalize_decimal(amount)
            .ok_or_else(|| TxError::InvalidCoin(format!("invalid decimal amount: {amount:?}")))?;
        Ok(Self { denom, amount })
    }

    /// Returns the normalized decimal amount.
    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.to_rational().is_zero()
    }

    /// Returns the exact amount as a rational number.
    pub fn to_rational(&self) -> BigRational {
        // The amount was validated on construction.
        decimal_to_rational(&self.amount).unwrap_or_else(BigRational::zero)
    }

    /// Parses a comma separated decimal coin list.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::InvalidCoin`] on a malformed entry or a
    /// duplicated denomination.
    pub fn parse_list(s: &str) -> TxResult<Vec<Self>> {
        parse_list(s)
    }
}

impl FromStr for DecCoin {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (amount, denom) = split_amount(s)?;
        Self::new(amount, denom)
    }
}

impl fmt::Display for DecCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Splits `"<amount><denom>"` at the first alphabetic character.
fn split_amount(s: &str) -> TxResult<(&str, &str)> {
    let s = s.trim();
    let idx = s
        .find(|c: char| c.is_ascii_alphabetic())
        .ok_or_else(|| TxError::InvalidCoin(format!("missing denom in {s:?}")))?;
    Ok((s[..idx].trim(), s[idx..].trim()))
}

trait Denominated {
    fn denom(&self) -> &str;
}

impl Denominated for Coin {
    fn denom(&self) -> &str {
        &self.denom
    }
}

impl Denominated for DecCoin {
    fn denom(&self) -> &str {
        &self.denom
    }
}

fn parse_list<T>(s: &str) -> TxResult<Vec<T>>
where
    T: FromStr<Err = TxError> + Denominated,
{
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }

    let mut coins: Vec<T> = Vec::new();
    for part in s.split(',') {
        let coin: T = part.parse()?;
        if coins.iter().any(|c| c.denom() == coin.denom()) {
            return Err(TxError::InvalidCoin(format!(
                "duplicate denom {} in {s:?}",
                coin.denom()
            )));
        }
        coins.push(coin);
    }
    Ok(coins)
}

/// Validates a decimal literal and strips redundant zeros.
///
/// Accepts `123`, `0.025`, `.5` and rejects signs, exponents and more than
/// [`MAX_DECIMAL_PRECISION`] fractional digits.
fn normalize_decimal(s: &str) -> Option<String> {
    let (int, frac) = match s.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (s, ""),
    };
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int) || !all_digits(frac) || (int.is_empty() && frac.is_empty()) {
        return None;
    }
    if s.contains('.') && frac.is_empty() {
        return None;
    }
    if frac.len() > MAX_DECIMAL_PRECISION {
        return None;
    }

    let int = int.trim_start_matches('0');
    let int = if int.is_empty() { "0" } else { int };
    let frac = frac.trim_end_matches('0');
    Some(if frac.is_empty() {
        int.to_string()
    } else {
        format!("{int}.{frac}")
    })
}

/// Converts a plain decimal literal into an exact rational.
pub(crate) fn decimal_to_rational(s: &str) -> Option<BigRational> {
    let normalized = normalize_decimal(s)?;
    let (int, frac) = normalized.split_once('.').unwrap_or((&normalized, ""));
    let numer: BigInt = format!("{int}{frac}").parse().ok()?;
    let denom = num::pow(BigInt::from(10u8), frac.len());
    Some(BigRational::new(numer, denom))
}

mod amount_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(amount: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&amount.to_string())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        String::deserialize(d)?.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_coin() {
        let coin: Coin = "10stake".parse().unwrap();
        assert_eq!(coin.amount, 10);
        assert_eq!(coin.denom, "stake");
        assert_eq!(coin.to_string(), "10stake");

        let ibc: Coin = "5ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2"
            .parse()
            .unwrap();
        assert_eq!(ibc.amount, 5);
    }

    #[test]
    fn test_parse_coin_rejects_decimal() {
        assert!("1.5stake".parse::<Coin>().is_err());
        assert!("stake".parse::<Coin>().is_err());
        assert!("10".parse::<Coin>().is_err());
        assert!("10st".parse::<Coin>().is_err());
    }

    #[test]
    fn test_parse_dec_coin() {
        let price: DecCoin = "0.025uatom".parse().unwrap();
        assert_eq!(price.amount(), "0.025");
        assert_eq!(price.denom, "uatom");
        assert_eq!(price.to_rational(), BigRational::new(25.into(), 1000.into()));

        let trailing: DecCoin = "1.500stake".parse().unwrap();
        assert_eq!(trailing.amount(), "1.5");

        let leading: DecCoin = ".5stake".parse().unwrap();
        assert_eq!(leading.amount(), "0.5");
    }

    #[test]
    fn test_dec_coin_precision_limit() {
        assert!("0.000000000000000001stake".parse::<DecCoin>().is_ok());
        assert!("0.0000000000000000001stake".parse::<DecCoin>().is_err());
        assert!("1.stake".parse::<DecCoin>().is_err());
        assert!("-1stake".parse::<DecCoin>().is_err());
        assert!("+1stake".parse::<DecCoin>().is_err());
        assert!("1_000stake".parse::<DecCoin>().is_err());

        // the amount ends at the first letter, so this is 1 of `e5stake`
        let coin: DecCoin = "1e5stake".parse().unwrap();
        assert_eq!(coin.amount(), "1");
        assert_eq!(coin.denom, "e5stake");
    }

    #[test]
    fn test_parse_lists() {
        assert!(Coin::parse_list("").unwrap().is_empty());

        let coins = Coin::parse_list("10stake, 20uatom").unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[1].denom, "uatom");

        let prices = DecCoin::parse_list("10stake,0.025uatom").unwrap();
        assert_eq!(prices[0].amount(), "10");
        assert_eq!(prices[1].amount(), "0.025");

        assert!(Coin::parse_list("10stake,20stake").is_err());
    }

    #[test]
    fn test_coin_json_amount_is_string() {
        let coin = Coin::new(1500, "uatom").unwrap();
        let json = serde_json::to_string(&coin).unwrap();
        assert_eq!(json, r#"{"denom":"uatom","amount":"1500"}"#);
        let back: Coin = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coin);
    }

    proptest! {
        #[test]
        fn prop_coin_display_parses_back(amount in any::<u64>(), denom in "[a-z][a-z0-9]{2,20}") {
            let coin = Coin::new(u128::from(amount), denom).unwrap();
            let parsed: Coin = coin.to_string().parse().unwrap();
            prop_assert_eq!(parsed, coin);
        }

        #[test]
        fn prop_decimal_rational_is_exact(int in 0u64..1_000_000, frac in 0u64..1_000_000) {
            let literal = format!("{int}.{frac:06}");
            let rational = decimal_to_rational(&literal).unwrap();
            let expected = BigRational::new(
                BigInt::from(int) * BigInt::from(1_000_000u64) + BigInt::from(frac),
                BigInt::from(1_000_000u64),
            );
            prop_assert_eq!(rational, expected);
        }
    }
}
