//! Transaction database operations.

use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Database, DbError, DbResult};
use crate::models::{DiscountConfig, LineItem, StoredTotals, Transaction, TransactionStatus};
use crate::normalize;

const SELECT_TRANSACTION: &str = r#"
    SELECT transaction_id, patient_name, hmo_provider, line_items, discount, status,
           total_amount, discount_amount, senior_discount_amount, net_amount,
           created_at, updated_at
    FROM transactions
"#;

impl Database {
    /// Insert a new transaction.
    pub fn insert_transaction(&self, transaction: &Transaction) -> DbResult<()> {
        let line_items_json = serde_json::to_string(&transaction.items)?;
        let discount_json = serde_json::to_string(&transaction.discount)?;
        let totals = TotalsColumns::from(transaction.stored_totals.as_ref());

        self.conn.execute(
            r#"
            INSERT INTO transactions (
                transaction_id, patient_name, hmo_provider, line_items, discount, status,
                total_amount, discount_amount, senior_discount_amount, net_amount,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                transaction.transaction_id,
                transaction.patient_name,
                transaction.hmo_provider,
                line_items_json,
                discount_json,
                transaction.status.as_str(),
                totals.total_amount,
                totals.discount_amount,
                totals.senior_discount_amount,
                totals.net_amount,
                transaction.created_at,
                transaction.updated_at,
            ],
        )?;
        debug!(
            transaction_id = %transaction.transaction_id,
            status = transaction.status.as_str(),
            "inserted transaction"
        );
        Ok(())
    }

    /// Update a draft transaction (including submitting it).
    ///
    /// Returns `false` when no draft with that ID exists; submitted rows are
    /// never rewritten.
    pub fn update_transaction(&self, transaction: &Transaction) -> DbResult<bool> {
        let line_items_json = serde_json::to_string(&transaction.items)?;
        let discount_json = serde_json::to_string(&transaction.discount)?;
        let totals = TotalsColumns::from(transaction.stored_totals.as_ref());

        let rows_affected = self.conn.execute(
            r#"
            UPDATE transactions SET
                patient_name = ?2,
                hmo_provider = ?3,
                line_items = ?4,
                discount = ?5,
                status = ?6,
                total_amount = ?7,
                discount_amount = ?8,
                senior_discount_amount = ?9,
                net_amount = ?10,
                updated_at = ?11
            WHERE transaction_id = ?1 AND status = 'draft'
            "#,
            params![
                transaction.transaction_id,
                transaction.patient_name,
                transaction.hmo_provider,
                line_items_json,
                discount_json,
                transaction.status.as_str(),
                totals.total_amount,
                totals.discount_amount,
                totals.senior_discount_amount,
                totals.net_amount,
                transaction.updated_at,
            ],
        )?;
        debug!(
            transaction_id = %transaction.transaction_id,
            rows_affected,
            "updated transaction"
        );
        Ok(rows_affected > 0)
    }

    /// Get a transaction by ID.
    pub fn get_transaction(&self, transaction_id: &str) -> DbResult<Option<Transaction>> {
        self.conn
            .query_row(
                &format!("{SELECT_TRANSACTION} WHERE transaction_id = ?"),
                [transaction_id],
                TransactionRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Get a transaction by ID, failing if it does not exist.
    pub fn require_transaction(&self, transaction_id: &str) -> DbResult<Transaction> {
        self.get_transaction(transaction_id)?
            .ok_or_else(|| DbError::NotFound(transaction_id.to_string()))
    }

    /// List all transactions, newest first.
    pub fn list_transactions(&self) -> DbResult<Vec<Transaction>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_TRANSACTION} ORDER BY created_at DESC"))?;
        let rows = stmt.query_map([], TransactionRow::from_row)?;

        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(row?.try_into()?);
        }
        Ok(transactions)
    }

    /// List transactions by status, newest first.
    pub fn list_transactions_by_status(
        &self,
        status: &TransactionStatus,
    ) -> DbResult<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_TRANSACTION} WHERE status = ? ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([status.as_str()], TransactionRow::from_row)?;

        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(row?.try_into()?);
        }
        Ok(transactions)
    }

    /// Delete a draft transaction. Submitted transactions are kept.
    pub fn delete_transaction(&self, transaction_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "DELETE FROM transactions WHERE transaction_id = ? AND status = 'draft'",
            [transaction_id],
        )?;
        Ok(rows_affected > 0)
    }
}

/// Stored totals as nullable TEXT columns.
struct TotalsColumns {
    total_amount: Option<String>,
    discount_amount: Option<String>,
    senior_discount_amount: Option<String>,
    net_amount: Option<String>,
}

impl From<Option<&StoredTotals>> for TotalsColumns {
    fn from(totals: Option<&StoredTotals>) -> Self {
        let text = |value: Option<Decimal>| value.map(|v| v.to_string());
        Self {
            total_amount: text(totals.map(|t| t.total_amount)),
            discount_amount: text(totals.map(|t| t.discount_amount)),
            senior_discount_amount: text(totals.map(|t| t.senior_discount_amount)),
            net_amount: text(totals.map(|t| t.net_amount)),
        }
    }
}

/// Intermediate row struct for database mapping.
struct TransactionRow {
    transaction_id: String,
    patient_name: String,
    hmo_provider: Option<String>,
    line_items: String,
    discount: String,
    status: String,
    totals: TotalsColumns,
    created_at: String,
    updated_at: String,
}

impl TransactionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            transaction_id: row.get(0)?,
            patient_name: row.get(1)?,
            hmo_provider: row.get(2)?,
            line_items: row.get(3)?,
            discount: row.get(4)?,
            status: row.get(5)?,
            totals: TotalsColumns {
                total_amount: row.get(6)?,
                discount_amount: row.get(7)?,
                senior_discount_amount: row.get(8)?,
                net_amount: row.get(9)?,
            },
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let items = items_from_column(&row.transaction_id, &row.line_items);
        let discount = discount_from_column(&row.transaction_id, &row.discount);
        let status = TransactionStatus::parse(&row.status).ok_or_else(|| {
            DbError::Constraint(format!("Unknown transaction status: {}", row.status))
        })?;

        // Legacy rows may hold loose text; absent columns read as zero.
        let money = |v: &Option<String>| {
            v.as_deref()
                .map(normalize::money_from_str)
                .unwrap_or_default()
        };
        let stored_totals = row.totals.net_amount.as_deref().map(|net| StoredTotals {
            total_amount: money(&row.totals.total_amount),
            discount_amount: money(&row.totals.discount_amount),
            senior_discount_amount: money(&row.totals.senior_discount_amount),
            net_amount: normalize::money_from_str(net),
        });

        Ok(Transaction {
            transaction_id: row.transaction_id,
            patient_name: row.patient_name,
            hmo_provider: row.hmo_provider,
            items,
            discount,
            status,
            stored_totals,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Decode the `line_items` column, dropping elements that are not items.
///
/// A column that is not a JSON array reads as no items.
fn items_from_column(transaction_id: &str, json: &str) -> Vec<LineItem> {
    let elements = match serde_json::from_str::<Value>(json) {
        Ok(Value::Array(elements)) => elements,
        _ => {
            warn!(transaction_id, "line_items column is not a JSON array, reading as empty");
            return Vec::new();
        }
    };

    let total = elements.len();
    let items: Vec<LineItem> = elements
        .into_iter()
        .filter_map(|element| serde_json::from_value(element).ok())
        .collect();
    if items.len() < total {
        warn!(
            transaction_id,
            dropped = total - items.len(),
            "skipped malformed line items"
        );
    }
    items
}

/// Decode the `discount` column; anything that is not an object reads as no discount.
fn discount_from_column(transaction_id: &str, json: &str) -> DiscountConfig {
    match serde_json::from_str::<Value>(json) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        _ => {
            warn!(transaction_id, "discount column is not a JSON object, using defaults");
            DiscountConfig::default()
        }
    }
}
