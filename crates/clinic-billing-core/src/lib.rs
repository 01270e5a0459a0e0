//! Clinic Billing Core Library
//!
//! Billing calculation model for clinic transactions: line items, regular
//! and senior-citizen discounts, net totals and receipt reconciliation.
//!
//! # Architecture
//!
//! ```text
//!   Transaction form (f64 / String fields)
//!                 │
//!          [normalize: parse once]
//!                 │
//!     LineItem[] + DiscountConfig ──► billing::summarize ──► summary panel
//!                 │
//!              submit
//!                 │
//!     ┌───────────▼───────────┐
//!     │  transactions table   │
//!     │  stored totals frozen │
//!     └───────────┬───────────┘
//!                 │
//!     recompute + reconcile (|stored − recomputed| > 0.01 → recomputed)
//!                 │
//!                 ▼
//!              Receipt
//! ```
//!
//! # Core Principle
//!
//! **Derived amounts are never trusted.** Subtotals, discounts and net
//! totals are recomputed from items and discount settings whenever they are
//! shown; stored totals are only displayed when they still agree.
//!
//! # Modules
//!
//! - [`billing`]: Pure calculation functions (aggregator, discounts, net total)
//! - [`models`]: Domain types (LineItem, DiscountConfig, Transaction)
//! - [`normalize`]: Coercion of loosely typed input into money, percentages and quantities
//! - [`db`]: SQLite persistence for transactions and settings
//! - [`receipt`]: Receipt view model with read-time reconciliation
//! - [`config`]: Clinic-wide billing settings

pub mod billing;
pub mod config;
pub mod db;
pub mod models;
pub mod normalize;
pub mod receipt;

// Re-export commonly used types
pub use billing::{summarize, BillingSummary, ReconciledTotal, TotalSource};
pub use config::BillingConfig;
pub use db::Database;
pub use models::{
    DiscountConfig, ItemType, LineItem, LineItemUpdate, StoredTotals, Transaction,
    TransactionError, TransactionStatus,
};
pub use receipt::{Receipt, ReceiptBuilder};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use tracing::info;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicBillingError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for ClinicBillingError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(id) => ClinicBillingError::NotFound(id),
            other => ClinicBillingError::DatabaseError(other.to_string()),
        }
    }
}

impl From<TransactionError> for ClinicBillingError {
    fn from(e: TransactionError) -> Self {
        match e {
            TransactionError::ItemNotFound(_) => ClinicBillingError::NotFound(e.to_string()),
            TransactionError::NotEditable(_) | TransactionError::EmptyTransaction(_) => {
                ClinicBillingError::InvalidState(e.to_string())
            }
        }
    }
}

impl From<receipt::ReceiptError> for ClinicBillingError {
    fn from(e: receipt::ReceiptError) -> Self {
        match e {
            receipt::ReceiptError::Database(e) => e.into(),
            receipt::ReceiptError::NotFound(id) => ClinicBillingError::NotFound(id),
        }
    }
}

impl From<config::ConfigError> for ClinicBillingError {
    fn from(e: config::ConfigError) -> Self {
        ClinicBillingError::SerializationError(e.to_string())
    }
}

impl From<serde_json::Error> for ClinicBillingError {
    fn from(e: serde_json::Error) -> Self {
        ClinicBillingError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicBillingError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicBillingError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<ClinicBillingCore>, ClinicBillingError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(ClinicBillingCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<ClinicBillingCore>, ClinicBillingError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(ClinicBillingCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Compute the summary panel for unsaved form state.
#[uniffi::export]
pub fn calculate_billing_summary(
    items: Vec<FfiLineItemInput>,
    discount: FfiDiscount,
) -> FfiBillingSummary {
    let items: Vec<LineItem> = items.into_iter().map(LineItem::from).collect();
    let discount = DiscountConfig::from(discount);
    summarize(&items, &discount).into()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ClinicBillingCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl ClinicBillingCore {
    // =========================================================================
    // Transaction Operations
    // =========================================================================

    /// Create a new draft transaction.
    pub fn create_transaction(
        &self,
        patient_name: String,
        hmo_provider: Option<String>,
    ) -> Result<FfiTransaction, ClinicBillingError> {
        let patient_name = patient_name.trim().to_string();
        if patient_name.is_empty() {
            return Err(ClinicBillingError::InvalidInput(
                "patient name is required".to_string(),
            ));
        }

        let db = self.db.lock()?;
        let config = db.load_config()?;
        let mut transaction = Transaction::with_config(patient_name, &config);
        transaction.hmo_provider = hmo_provider.filter(|hmo| !hmo.trim().is_empty());
        db.insert_transaction(&transaction)?;
        Ok(transaction.into())
    }

    /// Get a transaction by ID.
    pub fn get_transaction(
        &self,
        transaction_id: String,
    ) -> Result<Option<FfiTransaction>, ClinicBillingError> {
        let db = self.db.lock()?;
        let transaction = db.get_transaction(&transaction_id)?;
        Ok(transaction.map(|t| t.into()))
    }

    /// List transactions, optionally filtered by status ("draft" or "submitted").
    pub fn list_transactions(
        &self,
        status: Option<String>,
    ) -> Result<Vec<FfiTransaction>, ClinicBillingError> {
        let db = self.db.lock()?;
        let transactions = match status {
            Some(status) => {
                let status = TransactionStatus::parse(&status).ok_or_else(|| {
                    ClinicBillingError::InvalidInput(format!("unknown status: {}", status))
                })?;
                db.list_transactions_by_status(&status)?
            }
            None => db.list_transactions()?,
        };
        Ok(transactions.into_iter().map(|t| t.into()).collect())
    }

    /// Append a line item to a draft.
    pub fn add_item(
        &self,
        transaction_id: String,
        item: FfiLineItemInput,
    ) -> Result<FfiTransaction, ClinicBillingError> {
        self.edit_transaction(&transaction_id, |transaction| {
            transaction.add_item(item.into()).map(|_| ())
        })
    }

    /// Apply a partial update to a line item on a draft.
    pub fn update_item(
        &self,
        transaction_id: String,
        item_id: String,
        update: FfiLineItemUpdate,
    ) -> Result<FfiTransaction, ClinicBillingError> {
        self.edit_transaction(&transaction_id, |transaction| {
            transaction.update_item(&item_id, update.into()).map(|_| ())
        })
    }

    /// Remove a line item from a draft.
    pub fn remove_item(
        &self,
        transaction_id: String,
        item_id: String,
    ) -> Result<FfiTransaction, ClinicBillingError> {
        self.edit_transaction(&transaction_id, |transaction| {
            transaction.remove_item(&item_id).map(|_| ())
        })
    }

    /// Replace the discount settings on a draft.
    pub fn set_discount(
        &self,
        transaction_id: String,
        discount: FfiDiscount,
    ) -> Result<FfiTransaction, ClinicBillingError> {
        self.edit_transaction(&transaction_id, |transaction| {
            transaction.set_discount(discount.into())
        })
    }

    /// Recompute the summary panel for a stored transaction.
    pub fn get_summary(&self, transaction_id: String) -> Result<FfiBillingSummary, ClinicBillingError> {
        let db = self.db.lock()?;
        let transaction = db.require_transaction(&transaction_id)?;
        Ok(transaction.summary().into())
    }

    /// Discard a draft. Submitted transactions cannot be discarded.
    pub fn discard_transaction(&self, transaction_id: String) -> Result<(), ClinicBillingError> {
        let db = self.db.lock()?;
        if db.delete_transaction(&transaction_id)? {
            info!(transaction_id = %transaction_id, "draft discarded");
            return Ok(());
        }
        match db.get_transaction(&transaction_id)? {
            Some(_) => Err(TransactionError::NotEditable(transaction_id).into()),
            None => Err(ClinicBillingError::NotFound(transaction_id)),
        }
    }

    /// Freeze totals and submit a draft.
    pub fn submit_transaction(
        &self,
        transaction_id: String,
    ) -> Result<FfiTransaction, ClinicBillingError> {
        let transaction = self.edit_transaction(&transaction_id, |transaction| {
            transaction.submit().map(|_| ())
        })?;
        info!(
            transaction_id = %transaction.transaction_id,
            net_amount = transaction.summary.net_total,
            "transaction submitted"
        );
        Ok(transaction)
    }

    // =========================================================================
    // Receipt Operations
    // =========================================================================

    /// Build the receipt for a transaction.
    pub fn get_receipt(&self, transaction_id: String) -> Result<FfiReceipt, ClinicBillingError> {
        let db = self.db.lock()?;
        let receipt = ReceiptBuilder::new(&db).receipt_for(&transaction_id)?;
        Ok(receipt.into())
    }

    /// Build the receipt for a transaction as JSON.
    pub fn get_receipt_json(&self, transaction_id: String) -> Result<String, ClinicBillingError> {
        let db = self.db.lock()?;
        let receipt = ReceiptBuilder::new(&db).receipt_for(&transaction_id)?;
        Ok(receipt.to_json()?)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Get the clinic billing settings.
    pub fn get_config(&self) -> Result<FfiBillingConfig, ClinicBillingError> {
        let db = self.db.lock()?;
        Ok(db.load_config()?.into())
    }

    /// Replace the clinic billing settings, returning the normalized values.
    pub fn update_config(
        &self,
        config: FfiBillingConfig,
    ) -> Result<FfiBillingConfig, ClinicBillingError> {
        let config = BillingConfig::from(config);
        let db = self.db.lock()?;
        db.save_config(&config)?;
        Ok(config.into())
    }
}

impl ClinicBillingCore {
    /// Load a draft, apply an edit and write it back.
    fn edit_transaction<F>(
        &self,
        transaction_id: &str,
        edit: F,
    ) -> Result<FfiTransaction, ClinicBillingError>
    where
        F: FnOnce(&mut Transaction) -> models::TransactionResult<()>,
    {
        let db = self.db.lock()?;
        let mut transaction = db.require_transaction(transaction_id)?;
        edit(&mut transaction)?;
        if !db.update_transaction(&transaction)? {
            return Err(TransactionError::NotEditable(transaction_id.to_string()).into());
        }
        Ok(transaction.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// Line item as entered on the form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLineItemInput {
    pub description: String,
    pub item_type: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl From<FfiLineItemInput> for LineItem {
    fn from(item: FfiLineItemInput) -> Self {
        LineItem::from_input(
            &item.description,
            &item.item_type,
            item.quantity,
            item.unit_price,
        )
    }
}

/// Partial line item update; `None` leaves a field unchanged.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLineItemUpdate {
    pub description: Option<String>,
    pub item_type: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
}

impl From<FfiLineItemUpdate> for LineItemUpdate {
    fn from(update: FfiLineItemUpdate) -> Self {
        LineItemUpdate {
            description: update.description,
            item_type: update.item_type.as_deref().map(ItemType::parse),
            quantity: update.quantity.map(normalize::quantity_from_f64),
            unit_price: update.unit_price.map(normalize::money_from_f64),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLineItem {
    pub item_id: String,
    pub description: String,
    pub item_type: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
}

impl From<&LineItem> for FfiLineItem {
    fn from(item: &LineItem) -> Self {
        Self {
            item_id: item.item_id().to_string(),
            description: item.description().to_string(),
            item_type: item.item_type().as_str().to_string(),
            quantity: item.quantity(),
            unit_price: normalize::to_f64(item.unit_price()),
            total_price: normalize::to_f64(item.total_price()),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDiscount {
    pub discount_amount: f64,
    pub discount_percentage: f64,
    pub is_senior_citizen: bool,
    pub senior_discount_percentage: f64,
}

impl From<FfiDiscount> for DiscountConfig {
    fn from(discount: FfiDiscount) -> Self {
        DiscountConfig::from_input(
            discount.discount_amount,
            discount.discount_percentage,
            discount.is_senior_citizen,
            discount.senior_discount_percentage,
        )
    }
}

impl From<&DiscountConfig> for FfiDiscount {
    fn from(discount: &DiscountConfig) -> Self {
        Self {
            discount_amount: normalize::to_f64(discount.discount_amount()),
            discount_percentage: normalize::to_f64(discount.discount_percentage()),
            is_senior_citizen: discount.is_senior_citizen(),
            senior_discount_percentage: normalize::to_f64(discount.senior_discount_percentage()),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBillingSummary {
    pub subtotal: f64,
    pub consultation_subtotal: f64,
    pub regular_discount: f64,
    pub senior_discount: f64,
    pub total_discount: f64,
    pub net_total: f64,
}

impl From<BillingSummary> for FfiBillingSummary {
    fn from(summary: BillingSummary) -> Self {
        Self {
            subtotal: normalize::to_f64(summary.subtotal),
            consultation_subtotal: normalize::to_f64(summary.consultation_subtotal),
            regular_discount: normalize::to_f64(summary.regular_discount),
            senior_discount: normalize::to_f64(summary.senior_discount),
            total_discount: normalize::to_f64(summary.total_discount),
            net_total: normalize::to_f64(summary.net_total),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStoredTotals {
    pub total_amount: f64,
    pub discount_amount: f64,
    pub senior_discount_amount: f64,
    pub net_amount: f64,
}

impl From<&StoredTotals> for FfiStoredTotals {
    fn from(totals: &StoredTotals) -> Self {
        Self {
            total_amount: normalize::to_f64(totals.total_amount),
            discount_amount: normalize::to_f64(totals.discount_amount),
            senior_discount_amount: normalize::to_f64(totals.senior_discount_amount),
            net_amount: normalize::to_f64(totals.net_amount),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTransaction {
    pub transaction_id: String,
    pub patient_name: String,
    pub hmo_provider: Option<String>,
    pub items: Vec<FfiLineItem>,
    pub discount: FfiDiscount,
    pub status: String,
    /// Totals frozen at submit
    pub stored_totals: Option<FfiStoredTotals>,
    /// Freshly recomputed totals
    pub summary: FfiBillingSummary,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Transaction> for FfiTransaction {
    fn from(transaction: Transaction) -> Self {
        let summary = transaction.summary().into();
        Self {
            items: transaction.items.iter().map(FfiLineItem::from).collect(),
            discount: FfiDiscount::from(&transaction.discount),
            status: transaction.status.as_str().to_string(),
            stored_totals: transaction.stored_totals.as_ref().map(FfiStoredTotals::from),
            summary,
            transaction_id: transaction.transaction_id,
            patient_name: transaction.patient_name,
            hmo_provider: transaction.hmo_provider,
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReceiptLine {
    pub description: String,
    pub item_type: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReceipt {
    pub transaction_id: String,
    pub patient_name: String,
    pub hmo_provider: Option<String>,
    pub status: String,
    pub transaction_date: String,
    pub currency: String,
    pub lines: Vec<FfiReceiptLine>,
    pub subtotal: f64,
    pub discount_percentage: Option<f64>,
    pub regular_discount: f64,
    pub is_senior_citizen: bool,
    pub senior_discount_percentage: f64,
    pub senior_discount: f64,
    /// Net total to display
    pub net_total: f64,
    pub stored_net_total: Option<f64>,
    /// True when the stored total was replaced by the recomputed one
    pub corrected: bool,
}

impl From<Receipt> for FfiReceipt {
    fn from(receipt: Receipt) -> Self {
        let totals = receipt.totals;
        Self {
            transaction_id: receipt.metadata.transaction_id,
            patient_name: receipt.metadata.patient_name,
            hmo_provider: receipt.metadata.hmo_provider,
            status: receipt.metadata.status.as_str().to_string(),
            transaction_date: receipt.metadata.transaction_date,
            currency: receipt.metadata.currency,
            lines: receipt
                .lines
                .into_iter()
                .map(|line| FfiReceiptLine {
                    description: line.description,
                    item_type: line.item_type.as_str().to_string(),
                    quantity: line.quantity,
                    unit_price: normalize::to_f64(line.unit_price),
                    total_price: normalize::to_f64(line.total_price),
                })
                .collect(),
            subtotal: normalize::to_f64(totals.subtotal),
            discount_percentage: totals.discount_percentage.map(normalize::to_f64),
            regular_discount: normalize::to_f64(totals.regular_discount),
            is_senior_citizen: totals.is_senior_citizen,
            senior_discount_percentage: normalize::to_f64(totals.senior_discount_percentage),
            senior_discount: normalize::to_f64(totals.senior_discount),
            corrected: totals.net_total.has_drift(),
            net_total: normalize::to_f64(totals.net_total.amount),
            stored_net_total: totals.stored_net_total.map(normalize::to_f64),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBillingConfig {
    pub senior_discount_percentage: f64,
    pub reconciliation_epsilon: f64,
    pub currency: String,
}

impl From<BillingConfig> for FfiBillingConfig {
    fn from(config: BillingConfig) -> Self {
        Self {
            senior_discount_percentage: normalize::to_f64(config.senior_discount_percentage),
            reconciliation_epsilon: normalize::to_f64(config.reconciliation_epsilon),
            currency: config.currency,
        }
    }
}

impl From<FfiBillingConfig> for BillingConfig {
    fn from(config: FfiBillingConfig) -> Self {
        let currency = config.currency.trim().to_uppercase();
        let defaults = BillingConfig::default();
        Self {
            senior_discount_percentage: normalize::percentage_from_f64(
                config.senior_discount_percentage,
            ),
            reconciliation_epsilon: match normalize::money_from_f64(config.reconciliation_epsilon) {
                epsilon if epsilon > Decimal::ZERO => epsilon,
                _ => defaults.reconciliation_epsilon,
            },
            currency: if currency.is_empty() {
                defaults.currency
            } else {
                currency
            },
        }
    }
}
