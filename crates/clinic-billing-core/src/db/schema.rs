//! SQLite schema definition.

/// Complete database schema for clinic billing.
///
/// Money columns are TEXT so cents survive exactly; they are read back
/// through the normalizer, so legacy rows holding loose values still load.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Transactions
-- ============================================================================

CREATE TABLE IF NOT EXISTS transactions (
    transaction_id TEXT PRIMARY KEY,
    patient_name TEXT NOT NULL,
    hmo_provider TEXT,
    line_items TEXT NOT NULL DEFAULT '[]',          -- JSON array of LineItem
    discount TEXT NOT NULL DEFAULT '{}',            -- JSON DiscountConfig
    status TEXT NOT NULL DEFAULT 'draft'
        CHECK (status IN ('draft', 'submitted')),
    -- Stored totals: NULL while draft, frozen at submit
    total_amount TEXT,
    discount_amount TEXT,
    senior_discount_amount TEXT,
    net_amount TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_transactions_status ON transactions(status);
CREATE INDEX IF NOT EXISTS idx_transactions_created ON transactions(created_at);

-- Submitted transactions are immutable.
CREATE TRIGGER IF NOT EXISTS transactions_submitted_immutable
BEFORE UPDATE ON transactions
WHEN old.status = 'submitted'
BEGIN
    SELECT RAISE(ABORT, 'Submitted transactions cannot be modified');
END;

-- ============================================================================
-- Settings
-- ============================================================================

CREATE TABLE IF NOT EXISTS billing_settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_status_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO transactions (transaction_id, patient_name, status) VALUES ('t1', 'A', 'void')",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "INSERT INTO transactions (transaction_id, patient_name) VALUES ('t1', 'A')",
            [],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_submitted_rows_immutable() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO transactions (transaction_id, patient_name, status, net_amount) VALUES ('t1', 'A', 'submitted', '900')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "UPDATE transactions SET net_amount = '950' WHERE transaction_id = 't1'",
            [],
        );
        assert!(result.is_err());
    }
}
