//! Regular (non-senior) discount resolution.

use rust_decimal::Decimal;

use crate::models::DiscountConfig;
use crate::normalize::round_currency;

/// Effective regular discount for a subtotal.
///
/// A non-zero percentage wins and the flat amount is ignored; otherwise the
/// flat amount applies as-is. Never negative.
pub fn regular_discount(subtotal: Decimal, config: &DiscountConfig) -> Decimal {
    let discount = if config.uses_percentage() {
        percent_of(subtotal, config.discount_percentage())
    } else {
        config.discount_amount()
    };
    discount.max(Decimal::ZERO)
}

/// `base × percentage / 100`, rounded to cents.
pub(crate) fn percent_of(base: Decimal, percentage: Decimal) -> Decimal {
    base.checked_mul(percentage)
        .map(|product| round_currency(product / Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}
