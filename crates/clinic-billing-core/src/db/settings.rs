//! Billing settings persistence.

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{Database, DbResult};
use crate::config::BillingConfig;

const BILLING_CONFIG_KEY: &str = "billing_config";

impl Database {
    /// Get a raw setting value.
    pub fn get_setting(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM billing_settings WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Set a raw setting value.
    pub fn set_setting(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO billing_settings (key, value, updated_at) VALUES (?, ?, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    /// Load the billing configuration, falling back to defaults when unset.
    pub fn load_config(&self) -> DbResult<BillingConfig> {
        match self.get_setting(BILLING_CONFIG_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(BillingConfig::default()),
        }
    }

    /// Persist the billing configuration.
    pub fn save_config(&self, config: &BillingConfig) -> DbResult<()> {
        let json = serde_json::to_string(config)?;
        self.set_setting(BILLING_CONFIG_KEY, &json)?;
        debug!(currency = %config.currency, "saved billing config");
        Ok(())
    }
}
