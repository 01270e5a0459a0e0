//! Senior-citizen discount.

use rust_decimal::Decimal;

use super::aggregator::consultation_subtotal;
use super::discount::percent_of;
use crate::models::{DiscountConfig, LineItem};

/// Senior-citizen discount, based on consultation items only.
///
/// Zero unless the config flags a senior citizen. Computed independently of
/// the regular discount.
pub fn senior_discount(items: &[LineItem], config: &DiscountConfig) -> Decimal {
    if !config.is_senior_citizen() {
        return Decimal::ZERO;
    }
    percent_of(
        consultation_subtotal(items),
        config.senior_discount_percentage(),
    )
}
