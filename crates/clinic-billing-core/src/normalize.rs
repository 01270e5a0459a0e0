//! Input normalization at the data-model boundary.
//!
//! Every loosely typed value that enters the model (form fields arriving as
//! `f64` over FFI, JSON columns written by older clients, hand-edited
//! settings) passes through here exactly once. Downstream code only ever
//! sees well-formed `Decimal`/`u32` values and never re-coerces.
//!
//! Coercion rules:
//! - NaN, ±infinity, `null`, booleans, arrays, objects and unparseable
//!   strings become zero
//! - strings parse their leading numeric prefix (`"12.5abc"` → 12.5)
//! - money is clamped to ≥ 0 and rounded to cents
//! - percentages are clamped to `[0, 100]`
//! - quantities truncate toward zero and saturate at `u32::MAX`

use std::str::FromStr;

use rust_decimal::prelude::*;
use serde_json::Value;

/// Decimal places for currency values.
pub const CURRENCY_SCALE: u32 = 2;

/// Round a currency value to cents, half away from zero.
#[inline]
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a `Decimal` to `f64` for FFI output, rounded to cents.
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_currency(value).to_f64().unwrap_or_default()
}

/// Convert an `f64` to `Decimal`. Non-finite or out-of-range values become zero.
#[inline]
pub fn decimal_from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or_default()
}

/// Parse the leading numeric prefix of a string.
///
/// Accepts an optional sign, digits with an optional fraction, and an
/// optional exponent. Anything after the prefix is ignored; an empty prefix
/// yields zero.
pub fn parse_decimal(input: &str) -> Decimal {
    let prefix = numeric_prefix(input.trim_start());
    if prefix.is_empty() {
        return Decimal::ZERO;
    }

    let parsed = if prefix.contains(['e', 'E']) {
        Decimal::from_scientific(prefix)
    } else {
        Decimal::from_str(prefix)
    };
    parsed.unwrap_or_default()
}

/// Longest prefix of `s` that reads as a decimal number.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut digits = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
            digits += 1;
        }
        end = frac_end;
    }
    if digits == 0 {
        return "";
    }

    // Exponent only counts when followed by at least one digit.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    // A trailing '.' ("12.") is not accepted by Decimal::from_str.
    s[..end].trim_end_matches('.')
}

/// Any JSON value as a raw decimal (no clamping).
pub fn decimal_from_value(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => Decimal::ZERO,
    }
}

// =========================================================================
// Money
// =========================================================================

/// Clamp to ≥ 0 and round to cents.
#[inline]
pub fn clamp_money(value: Decimal) -> Decimal {
    round_currency(value.max(Decimal::ZERO))
}

pub fn money_from_f64(value: f64) -> Decimal {
    clamp_money(decimal_from_f64(value))
}

pub fn money_from_str(value: &str) -> Decimal {
    clamp_money(parse_decimal(value))
}

pub fn money_from_value(value: &Value) -> Decimal {
    clamp_money(decimal_from_value(value))
}

// =========================================================================
// Percentages
// =========================================================================

/// Clamp to `[0, 100]`.
#[inline]
pub fn clamp_percentage(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

pub fn percentage_from_f64(value: f64) -> Decimal {
    clamp_percentage(decimal_from_f64(value))
}

pub fn percentage_from_str(value: &str) -> Decimal {
    clamp_percentage(parse_decimal(value))
}

pub fn percentage_from_value(value: &Value) -> Decimal {
    clamp_percentage(decimal_from_value(value))
}

// =========================================================================
// Quantities
// =========================================================================

/// Whole units, truncated toward zero, negatives become zero.
pub fn quantity_from_decimal(value: Decimal) -> u32 {
    if value.is_sign_negative() {
        return 0;
    }
    value.trunc().to_u32().unwrap_or(u32::MAX)
}

pub fn quantity_from_f64(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    quantity_from_decimal(decimal_from_f64(value))
}

pub fn quantity_from_str(value: &str) -> u32 {
    quantity_from_decimal(parse_decimal(value))
}

pub fn quantity_from_value(value: &Value) -> u32 {
    quantity_from_decimal(decimal_from_value(value))
}

// =========================================================================
// Flags
// =========================================================================

/// Booleans, `1`/`0`, and `"true"`/`"yes"`/`"1"` strings. Everything else is false.
pub fn flag_from_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "y" | "1" | "on"
        ),
        _ => false,
    }
}

/// Serde `deserialize_with` adapters applying the rules above.
///
/// Pair with `#[serde(default)]` so missing fields also normalize.
pub mod de {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(super::money_from_value(&value))
    }

    pub fn percentage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(super::percentage_from_value(&value))
    }

    pub fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(super::quantity_from_value(&value))
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(super::flag_from_value(&value))
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}
