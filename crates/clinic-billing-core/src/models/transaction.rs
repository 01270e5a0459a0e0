//! Transaction aggregate: line items, discounts and the draft → submitted lifecycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::discount::DiscountConfig;
use super::line_item::{LineItem, LineItemUpdate};
use crate::billing::{self, BillingSummary};
use crate::config::BillingConfig;

/// Transaction editing errors.
#[derive(Error, Debug, PartialEq)]
pub enum TransactionError {
    #[error("Transaction {0} has been submitted and can no longer be edited")]
    NotEditable(String),

    #[error("Line item not found: {0}")]
    ItemNotFound(String),

    #[error("Transaction {0} has no line items")]
    EmptyTransaction(String),
}

pub type TransactionResult<T> = Result<T, TransactionError>;

/// Transaction lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Being edited; totals are recomputed on every change
    Draft,
    /// Persisted with frozen stored totals
    Submitted,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Draft => "draft",
            TransactionStatus::Submitted => "submitted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(TransactionStatus::Draft),
            "submitted" => Some(TransactionStatus::Submitted),
            _ => None,
        }
    }
}

/// Totals written at submit time.
///
/// Records submitted before a calculation fix may disagree with a fresh
/// recomputation; receipts reconcile at read time instead of rewriting these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredTotals {
    /// Subtotal before discounts
    pub total_amount: Decimal,
    /// Regular discount
    pub discount_amount: Decimal,
    /// Senior-citizen discount
    pub senior_discount_amount: Decimal,
    /// Net payable amount
    pub net_amount: Decimal,
}

impl From<&BillingSummary> for StoredTotals {
    fn from(summary: &BillingSummary) -> Self {
        Self {
            total_amount: summary.subtotal,
            discount_amount: summary.regular_discount,
            senior_discount_amount: summary.senior_discount,
            net_amount: summary.net_total,
        }
    }
}

/// A billing transaction for one patient visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Unique transaction ID
    pub transaction_id: String,
    /// Patient display name
    pub patient_name: String,
    /// HMO covering the visit, if any
    pub hmo_provider: Option<String>,
    /// Line items, in display order
    pub items: Vec<LineItem>,
    /// Discount settings
    pub discount: DiscountConfig,
    /// Lifecycle status
    pub status: TransactionStatus,
    /// Totals frozen at submit (None while draft)
    pub stored_totals: Option<StoredTotals>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Transaction {
    /// Create a new draft transaction with default discounts.
    pub fn new(patient_name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            transaction_id: uuid::Uuid::new_v4().to_string(),
            patient_name: patient_name.into(),
            hmo_provider: None,
            items: Vec::new(),
            discount: DiscountConfig::default(),
            status: TransactionStatus::Draft,
            stored_totals: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Create a new draft using clinic configuration defaults.
    pub fn with_config(patient_name: impl Into<String>, config: &BillingConfig) -> Self {
        let mut transaction = Self::new(patient_name);
        transaction
            .discount
            .set_senior_percentage(config.senior_discount_percentage);
        transaction
    }

    pub fn is_editable(&self) -> bool {
        self.status == TransactionStatus::Draft
    }

    /// Get an item by ID.
    pub fn item(&self, item_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.item_id() == item_id)
    }

    /// Append a line item.
    pub fn add_item(&mut self, item: LineItem) -> TransactionResult<&LineItem> {
        self.ensure_editable()?;
        self.items.push(item);
        self.touch();
        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Apply a partial update to a line item.
    pub fn update_item(
        &mut self,
        item_id: &str,
        update: LineItemUpdate,
    ) -> TransactionResult<&LineItem> {
        self.ensure_editable()?;
        let index = self.item_index(item_id)?;
        update.apply(&mut self.items[index]);
        self.touch();
        Ok(&self.items[index])
    }

    /// Remove a line item, returning it.
    pub fn remove_item(&mut self, item_id: &str) -> TransactionResult<LineItem> {
        self.ensure_editable()?;
        let index = self.item_index(item_id)?;
        let removed = self.items.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Replace the discount settings.
    pub fn set_discount(&mut self, discount: DiscountConfig) -> TransactionResult<()> {
        self.ensure_editable()?;
        self.discount = discount;
        self.touch();
        Ok(())
    }

    /// Recompute all derived amounts from the current items and discounts.
    pub fn summary(&self) -> BillingSummary {
        billing::summarize(&self.items, &self.discount)
    }

    /// Freeze totals and mark the transaction submitted.
    pub fn submit(&mut self) -> TransactionResult<&StoredTotals> {
        self.ensure_editable()?;
        if self.items.is_empty() {
            return Err(TransactionError::EmptyTransaction(
                self.transaction_id.clone(),
            ));
        }

        let totals = StoredTotals::from(&self.summary());
        self.status = TransactionStatus::Submitted;
        self.touch();
        Ok(self.stored_totals.insert(totals))
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    fn ensure_editable(&self) -> TransactionResult<()> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(TransactionError::NotEditable(self.transaction_id.clone()))
        }
    }

    fn item_index(&self, item_id: &str) -> TransactionResult<usize> {
        self.items
            .iter()
            .position(|item| item.item_id() == item_id)
            .ok_or_else(|| TransactionError::ItemNotFound(item_id.to_string()))
    }
}
