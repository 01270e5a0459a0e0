//! Receipt view model.
//!
//! Receipts recompute every amount from the stored items and discounts and
//! reconcile the net total against the value frozen at submit.

mod builder;
mod document;

pub use builder::*;
pub use document::*;
