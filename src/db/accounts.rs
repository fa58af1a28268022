use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use tracing::info;

use super::{decimal_at, next_order, optional, read_setting_or_none, write_setting, Database};
use crate::error::{LedgerError, Result};
use crate::id::new_id;
use crate::models::{Account, AccountPatch, AccountType, NewAccount, SettingKey};

const ACCOUNT_COLUMNS: &str =
    "id, name, account_type, balance, initial_balance, icon, color, sort_order";

fn row_to_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        account_type: AccountType::parse(&row.get::<_, String>(2)?),
        balance: decimal_at(row, 3)?,
        initial_balance: decimal_at(row, 4)?,
        icon: row.get(5)?,
        color: row.get(6)?,
        order: row.get(7)?,
    })
}

pub(crate) fn fetch_account(conn: &Connection, id: &str) -> Result<Option<Account>> {
    optional(conn.query_row(
        &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
        params![id],
        row_to_account,
    ))
}

pub(crate) fn fetch_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY sort_order, name"
    ))?;
    let rows = stmt.query_map([], row_to_account)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("account name cannot be empty"));
    }
    Ok(name.to_string())
}

impl Database {
    // ── Accounts ──────────────────────────────────────────────

    /// Create an account. Its balance always starts at `initial_balance`.
    pub fn insert_account(&self, account: &NewAccount) -> Result<String> {
        let name = validate_name(&account.name)?;
        let order = match account.order {
            Some(o) => o,
            None => next_order(&self.conn, "accounts")?,
        };
        let id = new_id();
        self.conn.execute(
            "INSERT INTO accounts (id, name, account_type, balance, initial_balance, icon, color, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6, ?7)",
            params![
                id,
                name,
                account.account_type.as_str(),
                account.initial_balance.to_string(),
                account.icon,
                account.color,
                order,
            ],
        )?;
        info!(account_id = %id, initial_balance = %account.initial_balance, "account created");
        Ok(id)
    }

    /// All accounts ordered by position, then name.
    pub fn get_accounts(&self) -> Result<Vec<Account>> {
        fetch_accounts(&self.conn)
    }

    pub fn get_account_by_id(&self, id: &str) -> Result<Option<Account>> {
        fetch_account(&self.conn, id)
    }

    pub fn account_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?)
    }

    /// Update account metadata. Changing `initial_balance` shifts the running
    /// balance by the same delta so recorded transaction effects are kept.
    pub fn update_account(&self, id: &str, patch: &AccountPatch) -> Result<()> {
        let mut account =
            fetch_account(&self.conn, id)?.ok_or_else(|| LedgerError::not_found("Account", id))?;

        if let Some(name) = &patch.name {
            account.name = validate_name(name)?;
        }
        if let Some(t) = patch.account_type {
            account.account_type = t;
        }
        if let Some(icon) = &patch.icon {
            account.icon = icon.clone();
        }
        if let Some(color) = &patch.color {
            account.color = color.clone();
        }
        if let Some(order) = patch.order {
            account.order = order;
        }
        if let Some(new_initial) = patch.initial_balance {
            let delta = new_initial - account.initial_balance;
            if delta != Decimal::ZERO {
                account.balance += delta;
                info!(account_id = %id, %delta, "initial balance changed, shifting balance");
            }
            account.initial_balance = new_initial;
        }

        self.conn.execute(
            "UPDATE accounts SET name = ?1, account_type = ?2, balance = ?3, initial_balance = ?4,
                    icon = ?5, color = ?6, sort_order = ?7
             WHERE id = ?8",
            params![
                account.name,
                account.account_type.as_str(),
                account.balance.to_string(),
                account.initial_balance.to_string(),
                account.icon,
                account.color,
                account.order,
                id,
            ],
        )?;
        Ok(())
    }

    /// Delete an account that no transaction references. The last remaining
    /// account can never be deleted.
    pub fn delete_account(&mut self, id: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        if fetch_account(&tx, id)?.is_none() {
            return Err(LedgerError::not_found("Account", id));
        }

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM transactions WHERE account_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Err(LedgerError::ReferencedEntity {
                entity: "Account",
                id: id.to_string(),
                count,
            });
        }

        let total: i64 = tx.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;
        if total <= 1 {
            return Err(LedgerError::LastAccount);
        }

        tx.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;

        let default_id: Option<String> = read_setting_or_none(&tx, SettingKey::DefaultAccountId);
        if default_id.as_deref() == Some(id) {
            if let Some(next) = fetch_accounts(&tx)?.into_iter().next() {
                write_setting(&tx, SettingKey::DefaultAccountId, &next.id)?;
                info!(account_id = %next.id, "default account moved");
            }
        }

        tx.commit()?;
        info!(account_id = %id, "account deleted");
        Ok(())
    }
}
