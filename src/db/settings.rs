use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::{optional, Database};
use crate::error::Result;
use crate::models::{SettingKey, Settings, Theme};

/// Store `value` JSON-encoded under `key`.
pub(crate) fn write_setting<T: Serialize + ?Sized>(
    conn: &Connection,
    key: SettingKey,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key.as_str(), json],
    )?;
    Ok(())
}

pub(crate) fn read_setting<T: DeserializeOwned>(conn: &Connection, key: SettingKey) -> Result<Option<T>> {
    let raw: Option<String> = optional(conn.query_row(
        "SELECT value FROM settings WHERE key = ?1",
        params![key.as_str()],
        |row| row.get(0),
    ))?;
    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Missing keys and unreadable values both yield `None`; the latter is logged.
pub(crate) fn read_setting_or_none<T: DeserializeOwned>(conn: &Connection, key: SettingKey) -> Option<T> {
    match read_setting(conn, key) {
        Ok(v) => v,
        Err(e) => {
            warn!(key = key.as_str(), error = %e, "falling back to default setting");
            None
        }
    }
}

impl Database {
    pub fn get_setting<T: DeserializeOwned>(&self, key: SettingKey) -> Option<T> {
        read_setting_or_none(&self.conn, key)
    }

    pub fn set_setting<T: Serialize + ?Sized>(&self, key: SettingKey, value: &T) -> Result<()> {
        write_setting(&self.conn, key, value)
    }

    pub fn clear_setting(&self, key: SettingKey) -> Result<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key.as_str()])?;
        Ok(())
    }

    /// All settings, each falling back to its default when absent or unreadable.
    pub fn get_settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            default_account_id: self.get_setting(SettingKey::DefaultAccountId),
            theme: self.get_setting(SettingKey::Theme).unwrap_or(defaults.theme),
            currency: self
                .get_setting(SettingKey::Currency)
                .unwrap_or(defaults.currency),
            savings_goals_last_update: self.get_setting(SettingKey::SavingsGoalsLastUpdate),
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.set_setting(SettingKey::Theme, &theme)
    }

    pub fn set_currency(&self, currency: &str) -> Result<()> {
        let currency = currency.trim().to_uppercase();
        if currency.is_empty() {
            return Err(crate::error::LedgerError::validation("currency cannot be empty"));
        }
        self.set_setting(SettingKey::Currency, &currency)
    }

    /// Make `account_id` the default account. The account must exist.
    pub fn set_default_account(&self, account_id: &str) -> Result<()> {
        if super::fetch_account(&self.conn, account_id)?.is_none() {
            return Err(crate::error::LedgerError::not_found("Account", account_id));
        }
        self.set_setting(SettingKey::DefaultAccountId, account_id)
    }
}
