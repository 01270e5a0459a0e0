//! Receipt lookup against the transaction store.

use thiserror::Error;

use super::document::Receipt;
use crate::db::{Database, DbError};

/// Receipt errors.
#[derive(Error, Debug)]
pub enum ReceiptError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Transaction not found: {0}")]
    NotFound(String),
}

pub type ReceiptResult<T> = Result<T, ReceiptError>;

/// Builds receipts for stored transactions.
pub struct ReceiptBuilder<'a> {
    db: &'a Database,
}

impl<'a> ReceiptBuilder<'a> {
    /// Create a new receipt builder.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Build the receipt for a transaction, using the stored configuration.
    pub fn receipt_for(&self, transaction_id: &str) -> ReceiptResult<Receipt> {
        let transaction = self
            .db
            .get_transaction(transaction_id)?
            .ok_or_else(|| ReceiptError::NotFound(transaction_id.to_string()))?;
        let config = self.db.load_config()?;

        Ok(Receipt::from_transaction(&transaction, &config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemType, LineItem, Transaction};
    use rust_decimal::Decimal;

    #[test]
    fn test_receipt_for_stored_transaction() {
        let db = Database::open_in_memory().unwrap();
        let mut transaction = Transaction::new("Carlos");
        transaction
            .add_item(LineItem::new("Consultation", ItemType::Consultation, 1, Decimal::from(400)))
            .unwrap();
        transaction.submit().unwrap();
        db.insert_transaction(&transaction).unwrap();

        let receipt = ReceiptBuilder::new(&db)
            .receipt_for(&transaction.transaction_id)
            .unwrap();
        assert_eq!(receipt.metadata.patient_name, "Carlos");
        assert_eq!(receipt.display_total(), Decimal::from(400));
    }

    #[test]
    fn test_receipt_for_missing_transaction() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            ReceiptBuilder::new(&db).receipt_for("nope"),
            Err(ReceiptError::NotFound(_))
        ));
    }
}
