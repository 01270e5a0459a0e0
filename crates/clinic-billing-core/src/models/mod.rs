//! Domain models for clinic billing.

mod discount;
mod line_item;
mod transaction;

pub use discount::*;
pub use line_item::*;
pub use transaction::*;
