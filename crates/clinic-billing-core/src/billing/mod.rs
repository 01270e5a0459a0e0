//! Billing calculation model.
//!
//! Pure functions shared by the transaction form summary panel and the
//! receipt view:
//!
//! ```text
//! items ──► subtotal ──────────────► regular_discount ─┐
//!   │                                                  ├─► net_total ──► reconcile_display_total
//!   └────► consultation_subtotal ──► senior_discount ──┘                  (receipts only)
//! ```
//!
//! Every function is total: inputs are already normalized by the time they
//! reach here, so there is nothing to fail on.

mod aggregator;
mod discount;
mod net_total;
mod senior;

pub use aggregator::*;
pub use discount::*;
pub use net_total::*;
pub use senior::*;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{DiscountConfig, LineItem};

/// All derived amounts for a set of items and discounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingSummary {
    pub subtotal: Decimal,
    pub consultation_subtotal: Decimal,
    pub regular_discount: Decimal,
    pub senior_discount: Decimal,
    pub total_discount: Decimal,
    pub net_total: Decimal,
}

/// Compute every derived amount in one pass.
pub fn summarize(items: &[LineItem], config: &DiscountConfig) -> BillingSummary {
    let subtotal = subtotal(items);
    let regular = regular_discount(subtotal, config);
    let senior = senior_discount(items, config);

    BillingSummary {
        subtotal,
        consultation_subtotal: consultation_subtotal(items),
        regular_discount: regular,
        senior_discount: senior,
        total_discount: regular.checked_add(senior).unwrap_or(Decimal::MAX),
        net_total: net_total(subtotal, regular, senior),
    }
}
