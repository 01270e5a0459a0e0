//! Receipt document.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::billing::{reconcile_display_total, ReconciledTotal};
use crate::config::BillingConfig;
use crate::models::{ItemType, Transaction, TransactionStatus};

/// Receipt for a single transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Receipt metadata
    pub metadata: ReceiptMetadata,
    /// Printed lines
    pub lines: Vec<ReceiptLine>,
    /// Totals block
    pub totals: ReceiptTotals,
}

/// Receipt metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptMetadata {
    pub transaction_id: String,
    pub patient_name: String,
    /// HMO covering the visit, if any
    pub hmo_provider: Option<String>,
    pub status: TransactionStatus,
    /// Last update of the transaction (submit time for submitted ones)
    pub transaction_date: String,
    /// When this receipt was generated
    pub generated_at: String,
    /// ISO currency code
    pub currency: String,
}

/// Single printed line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub description: String,
    pub item_type: ItemType,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Totals block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptTotals {
    pub subtotal: Decimal,
    /// Percentage shown next to the regular discount, when one applies
    pub discount_percentage: Option<Decimal>,
    pub regular_discount: Decimal,
    pub is_senior_citizen: bool,
    pub senior_discount_percentage: Decimal,
    pub senior_discount: Decimal,
    /// Net total to display, after reconciliation
    pub net_total: ReconciledTotal,
    /// Net total frozen at submit, if any
    pub stored_net_total: Option<Decimal>,
}

impl Receipt {
    /// Build a receipt from a transaction.
    pub fn from_transaction(transaction: &Transaction, config: &BillingConfig) -> Self {
        let summary = transaction.summary();
        let discount = &transaction.discount;
        let stored_net_total = transaction
            .stored_totals
            .as_ref()
            .map(|totals| totals.net_amount);

        let lines = transaction
            .items
            .iter()
            .map(|item| ReceiptLine {
                description: item.description().to_string(),
                item_type: item.item_type(),
                quantity: item.quantity(),
                unit_price: item.unit_price(),
                total_price: item.total_price(),
            })
            .collect();

        Self {
            metadata: ReceiptMetadata {
                transaction_id: transaction.transaction_id.clone(),
                patient_name: transaction.patient_name.clone(),
                hmo_provider: transaction.hmo_provider.clone(),
                status: transaction.status,
                transaction_date: transaction.updated_at.clone(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                currency: config.currency.clone(),
            },
            lines,
            totals: ReceiptTotals {
                subtotal: summary.subtotal,
                discount_percentage: discount
                    .uses_percentage()
                    .then(|| discount.discount_percentage()),
                regular_discount: summary.regular_discount,
                is_senior_citizen: discount.is_senior_citizen(),
                senior_discount_percentage: discount.senior_discount_percentage(),
                senior_discount: summary.senior_discount,
                net_total: reconcile_display_total(
                    stored_net_total,
                    summary.net_total,
                    config.reconciliation_epsilon,
                ),
                stored_net_total,
            },
        }
    }

    /// Amount to display as payable.
    pub fn display_total(&self) -> Decimal {
        self.totals.net_total.amount
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
