//! Discount configuration for a transaction.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::normalize;

/// Senior-citizen discount applied when none is configured (20%).
pub const DEFAULT_SENIOR_DISCOUNT_PERCENTAGE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

fn default_senior_percentage() -> Decimal {
    DEFAULT_SENIOR_DISCOUNT_PERCENTAGE
}

/// Like `normalize::de::percentage`, but an explicit `null` means "not set"
/// and yields the default senior percentage rather than zero.
pub fn deserialize_senior_percentage<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => DEFAULT_SENIOR_DISCOUNT_PERCENTAGE,
        other => normalize::percentage_from_value(&other),
    })
}

/// Regular and senior-citizen discount settings.
///
/// A non-zero `discount_percentage` takes precedence over
/// `discount_amount`; the two never combine. The senior-citizen discount is
/// separate and stacks on top of whichever regular discount applies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscountConfig {
    #[serde(default, deserialize_with = "normalize::de::money")]
    discount_amount: Decimal,
    #[serde(default, deserialize_with = "normalize::de::percentage")]
    discount_percentage: Decimal,
    #[serde(default, deserialize_with = "normalize::de::flag")]
    is_senior_citizen: bool,
    #[serde(
        default = "default_senior_percentage",
        deserialize_with = "deserialize_senior_percentage"
    )]
    senior_discount_percentage: Decimal,
}

impl Default for DiscountConfig {
    fn default() -> Self {
        Self {
            discount_amount: Decimal::ZERO,
            discount_percentage: Decimal::ZERO,
            is_senior_citizen: false,
            senior_discount_percentage: DEFAULT_SENIOR_DISCOUNT_PERCENTAGE,
        }
    }
}

impl DiscountConfig {
    /// Create a config with no discounts and the default senior percentage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config from loosely typed form input.
    pub fn from_input(
        discount_amount: f64,
        discount_percentage: f64,
        is_senior_citizen: bool,
        senior_discount_percentage: f64,
    ) -> Self {
        Self {
            discount_amount: normalize::money_from_f64(discount_amount),
            discount_percentage: normalize::percentage_from_f64(discount_percentage),
            is_senior_citizen,
            senior_discount_percentage: normalize::percentage_from_f64(senior_discount_percentage),
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.set_amount(amount);
        self
    }

    pub fn with_percentage(mut self, percentage: Decimal) -> Self {
        self.set_percentage(percentage);
        self
    }

    pub fn with_senior_citizen(mut self, is_senior_citizen: bool) -> Self {
        self.is_senior_citizen = is_senior_citizen;
        self
    }

    pub fn with_senior_percentage(mut self, percentage: Decimal) -> Self {
        self.set_senior_percentage(percentage);
        self
    }

    pub fn set_amount(&mut self, amount: Decimal) {
        self.discount_amount = normalize::clamp_money(amount);
    }

    pub fn set_percentage(&mut self, percentage: Decimal) {
        self.discount_percentage = normalize::clamp_percentage(percentage);
    }

    pub fn set_senior_citizen(&mut self, is_senior_citizen: bool) {
        self.is_senior_citizen = is_senior_citizen;
    }

    pub fn set_senior_percentage(&mut self, percentage: Decimal) {
        self.senior_discount_percentage = normalize::clamp_percentage(percentage);
    }

    pub fn discount_amount(&self) -> Decimal {
        self.discount_amount
    }

    pub fn discount_percentage(&self) -> Decimal {
        self.discount_percentage
    }

    pub fn is_senior_citizen(&self) -> bool {
        self.is_senior_citizen
    }

    pub fn senior_discount_percentage(&self) -> Decimal {
        self.senior_discount_percentage
    }

    /// Whether the percentage overrides the flat amount.
    pub fn uses_percentage(&self) -> bool {
        self.discount_percentage > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = DiscountConfig::default();
        assert_eq!(config.discount_amount(), Decimal::ZERO);
        assert_eq!(config.discount_percentage(), Decimal::ZERO);
        assert!(!config.is_senior_citizen());
        assert_eq!(config.senior_discount_percentage(), dec("20"));
        assert!(!config.uses_percentage());
    }

    #[test]
    fn test_builder_clamps() {
        let config = DiscountConfig::new()
            .with_amount(dec("-10"))
            .with_percentage(dec("120"))
            .with_senior_percentage(dec("-5"));

        assert_eq!(config.discount_amount(), Decimal::ZERO);
        assert_eq!(config.discount_percentage(), Decimal::ONE_HUNDRED);
        assert_eq!(config.senior_discount_percentage(), Decimal::ZERO);
    }

    #[test]
    fn test_from_input_normalizes_nan() {
        let config = DiscountConfig::from_input(f64::NAN, 12.5, true, f64::INFINITY);
        assert_eq!(config.discount_amount(), Decimal::ZERO);
        assert_eq!(config.discount_percentage(), dec("12.5"));
        assert!(config.is_senior_citizen());
        assert_eq!(config.senior_discount_percentage(), Decimal::ZERO);
    }

    #[test]
    fn test_deserialize_missing_senior_percentage_defaults() {
        let config: DiscountConfig =
            serde_json::from_str(r#"{"discount_amount": "50", "is_senior_citizen": 1}"#).unwrap();
        assert_eq!(config.discount_amount(), dec("50"));
        assert!(config.is_senior_citizen());
        assert_eq!(config.senior_discount_percentage(), dec("20"));
    }

    #[test]
    fn test_deserialize_null_senior_percentage_defaults() {
        let config: DiscountConfig = serde_json::from_str(
            r#"{"is_senior_citizen": true, "senior_discount_percentage": null}"#,
        )
        .unwrap();
        assert_eq!(config.senior_discount_percentage(), dec("20"));
    }

    #[test]
    fn test_deserialize_explicit_zero_senior_percentage_kept() {
        let config: DiscountConfig =
            serde_json::from_str(r#"{"senior_discount_percentage": "0"}"#).unwrap();
        assert_eq!(config.senior_discount_percentage(), Decimal::ZERO);
    }

    #[test]
    fn test_deserialize_empty_object() {
        let config: DiscountConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DiscountConfig::default());
    }
}
