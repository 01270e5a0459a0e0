//! Billing configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::billing::DEFAULT_RECONCILIATION_EPSILON;
use crate::models::DEFAULT_SENIOR_DISCOUNT_PERCENTAGE;
use crate::normalize;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Clinic-wide calculation settings.
///
/// Missing keys fall back to their defaults, so a partial JSON document
/// (or `{}`) is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingConfig {
    /// Senior-citizen discount applied to new transactions
    #[serde(
        default = "default_senior_percentage",
        deserialize_with = "crate::models::deserialize_senior_percentage"
    )]
    pub senior_discount_percentage: Decimal,
    /// Largest stored/recomputed difference still treated as agreement
    #[serde(
        default = "default_epsilon",
        deserialize_with = "normalize::de::money"
    )]
    pub reconciliation_epsilon: Decimal,
    /// ISO currency code shown on receipts
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_senior_percentage() -> Decimal {
    DEFAULT_SENIOR_DISCOUNT_PERCENTAGE
}

fn default_epsilon() -> Decimal {
    DEFAULT_RECONCILIATION_EPSILON
}

fn default_currency() -> String {
    "PHP".to_string()
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            senior_discount_percentage: default_senior_percentage(),
            reconciliation_epsilon: default_epsilon(),
            currency: default_currency(),
        }
    }
}

impl BillingConfig {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BillingConfig::default();
        assert_eq!(config.senior_discount_percentage, Decimal::from(20));
        assert_eq!(config.reconciliation_epsilon, Decimal::new(1, 2));
        assert_eq!(config.currency, "PHP");
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = BillingConfig::from_json("{}").unwrap();
        assert_eq!(config, BillingConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config =
            BillingConfig::from_json(r#"{"senior_discount_percentage": "15", "currency": "USD"}"#)
                .unwrap();
        assert_eq!(config.senior_discount_percentage, Decimal::from(15));
        assert_eq!(config.reconciliation_epsilon, Decimal::new(1, 2));
        assert_eq!(config.currency, "USD");
    }

    #[test]
    fn test_out_of_range_percentage_clamped() {
        let config = BillingConfig::from_json(r#"{"senior_discount_percentage": 250}"#).unwrap();
        assert_eq!(config.senior_discount_percentage, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_null_senior_percentage_is_default() {
        let config = BillingConfig::from_json(r#"{"senior_discount_percentage": null}"#).unwrap();
        assert_eq!(config.senior_discount_percentage, Decimal::from(20));
    }

    #[test]
    fn test_invalid_json() {
        assert!(BillingConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = BillingConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(BillingConfig::from_json(&json).unwrap(), config);
    }
}
