use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits the gateway expects on every amount.
pub const GATEWAY_SCALE: i64 = 2;

/// Longest amount text accepted by the lenient parsers.
pub const MAX_AMOUNT_LEN: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount '{0}' is not a decimal number")]
    Malformed(String),
    #[error("amount '{0}' must have exactly two decimal places")]
    WrongScale(String),
    #[error("amount '{0}' is negative")]
    Negative(String),
    #[error("amount '{0}' has more precision than two decimal places")]
    Precision(String),
}

/// Round a non-negative value half-up to two decimal places.
pub fn round_half_up(value: &BigDecimal) -> BigDecimal {
    let hundred = BigDecimal::from(100);
    let half = BigDecimal::from(5) / BigDecimal::from(10);
    // with_scale(0) truncates, which is a floor for non-negative input
    let cents = (value * &hundred + half).with_scale(0);
    (cents / hundred).with_scale(GATEWAY_SCALE)
}

/// A non-negative amount held at exactly two decimal places.
///
/// The rendered form (`25.00`) is what goes into the gateway hash, so every
/// constructor guarantees the scale and sign before a value exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GatewayAmount(BigDecimal);

impl GatewayAmount {
    /// Accept only `digits.dd`. Anything else (`25`, `25.0`, `-1.00`, `1e2`) is rejected
    /// rather than coerced.
    pub fn parse_strict(raw: &str) -> Result<Self, MoneyError> {
        let Some((whole, fraction)) = raw.split_once('.') else {
            return Err(MoneyError::WrongScale(raw.to_string()));
        };
        if raw.starts_with('-') {
            return Err(MoneyError::Negative(raw.to_string()));
        }
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyError::Malformed(raw.to_string()));
        }
        if fraction.len() != GATEWAY_SCALE as usize || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyError::WrongScale(raw.to_string()));
        }
        let value = BigDecimal::from_str(raw).map_err(|_| MoneyError::Malformed(raw.to_string()))?;
        Ok(Self(value.with_scale(GATEWAY_SCALE)))
    }

    /// Accept any non-negative decimal and round it half-up to two places.
    pub fn parse_rounded(raw: &str) -> Result<Self, MoneyError> {
        let value = parse_decimal(raw)?;
        Ok(Self(round_half_up(&value)))
    }

    /// Accept any non-negative decimal that is representable at two places without loss
    /// (`25`, `25.5`, `25.500` all become `25.50`-style values; `25.005` is rejected).
    pub fn parse_exact(raw: &str) -> Result<Self, MoneyError> {
        let value = parse_decimal(raw)?;
        let scaled = value.with_scale(GATEWAY_SCALE);
        if scaled != value {
            return Err(MoneyError::Precision(raw.trim().to_string()));
        }
        Ok(Self(scaled))
    }

    pub fn from_decimal(value: &BigDecimal) -> Result<Self, MoneyError> {
        if value < &BigDecimal::zero() {
            return Err(MoneyError::Negative(value.to_string()));
        }
        Ok(Self(round_half_up(value)))
    }

    pub fn inner(&self) -> &BigDecimal {
        &self.0
    }

    /// The fixed two-decimal rendering used on the wire and in hashes.
    pub fn as_gateway_string(&self) -> String {
        self.0.with_scale(GATEWAY_SCALE).to_string()
    }
}

/// Plain `digits[.digits]`, optionally signed. No exponent or radix forms.
fn is_plain_decimal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    digits(whole) && fraction.map_or(true, digits)
}

fn parse_decimal(raw: &str) -> Result<BigDecimal, MoneyError> {
    let trimmed = raw.trim();
    if trimmed.len() > MAX_AMOUNT_LEN || !is_plain_decimal(trimmed) {
        return Err(MoneyError::Malformed(trimmed.chars().take(MAX_AMOUNT_LEN).collect()));
    }
    let value = BigDecimal::from_str(trimmed).map_err(|_| MoneyError::Malformed(trimmed.to_string()))?;
    if value < BigDecimal::zero() {
        return Err(MoneyError::Negative(trimmed.to_string()));
    }
    Ok(value)
}

impl fmt::Display for GatewayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_gateway_string())
    }
}

impl FromStr for GatewayAmount {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_strict(s)
    }
}

impl TryFrom<String> for GatewayAmount {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_strict(&value)
    }
}

impl From<GatewayAmount> for String {
    fn from(value: GatewayAmount) -> Self {
        value.as_gateway_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_accepts_two_decimals() {
        let amount = GatewayAmount::parse_strict("25.00").unwrap();
        assert_eq!(amount.as_gateway_string(), "25.00");
        assert_eq!(GatewayAmount::parse_strict("0.05").unwrap().to_string(), "0.05");
    }

    #[test]
    fn strict_rejects_missing_or_extra_decimals() {
        assert_eq!(
            GatewayAmount::parse_strict("25"),
            Err(MoneyError::WrongScale("25".into()))
        );
        assert!(matches!(GatewayAmount::parse_strict("25.0"), Err(MoneyError::WrongScale(_))));
        assert!(matches!(GatewayAmount::parse_strict("25.000"), Err(MoneyError::WrongScale(_))));
        assert!(matches!(GatewayAmount::parse_strict(".50"), Err(MoneyError::Malformed(_))));
        assert!(matches!(GatewayAmount::parse_strict("-1.00"), Err(MoneyError::Negative(_))));
        assert!(matches!(GatewayAmount::parse_strict("1e2.00"), Err(MoneyError::Malformed(_))));
    }

    #[test]
    fn rounded_is_half_up() {
        assert_eq!(GatewayAmount::parse_rounded("12.345").unwrap().to_string(), "12.35");
        assert_eq!(GatewayAmount::parse_rounded("12.344").unwrap().to_string(), "12.34");
        assert_eq!(GatewayAmount::parse_rounded("25").unwrap().to_string(), "25.00");
        assert!(matches!(GatewayAmount::parse_rounded("abc"), Err(MoneyError::Malformed(_))));
        assert!(matches!(GatewayAmount::parse_rounded("-3"), Err(MoneyError::Negative(_))));
    }

    #[test]
    fn exact_refuses_precision_loss() {
        assert_eq!(GatewayAmount::parse_exact("25").unwrap().to_string(), "25.00");
        assert_eq!(GatewayAmount::parse_exact("25.5").unwrap().to_string(), "25.50");
        assert_eq!(GatewayAmount::parse_exact("25.500").unwrap().to_string(), "25.50");
        assert!(matches!(GatewayAmount::parse_exact("25.005"), Err(MoneyError::Precision(_))));
    }

    #[test]
    fn exponent_and_oversized_input_rejected() {
        for raw in ["1e5", "1E2", "2.5e-1", "1e2000000", "+5", "1.", ".5", " ", "0x10"] {
            assert!(matches!(GatewayAmount::parse_exact(raw), Err(MoneyError::Malformed(_))), "{raw}");
            assert!(matches!(GatewayAmount::parse_rounded(raw), Err(MoneyError::Malformed(_))), "{raw}");
        }
        let long = format!("1.{}", "0".repeat(MAX_AMOUNT_LEN));
        assert!(matches!(GatewayAmount::parse_exact(&long), Err(MoneyError::Malformed(_))));
        assert!(matches!(GatewayAmount::parse_rounded("-1e5"), Err(MoneyError::Malformed(_))));
    }

    #[test]
    fn serde_uses_gateway_string() {
        let amount = GatewayAmount::parse_strict("7.10").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"7.10\"");
        let back: GatewayAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
        assert!(serde_json::from_str::<GatewayAmount>("\"7.1\"").is_err());
    }
}
