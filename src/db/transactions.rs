use rusqlite::{params, Connection, Row};

use super::{decimal_at, optional, Database};
use crate::error::Result;
use crate::models::{Transaction, TransactionType};

pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, kind, amount, category_id, account_id, date, note, created_at, updated_at";

pub(crate) fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(1)?;
    Ok(Transaction {
        id: row.get(0)?,
        kind: TransactionType::parse(&kind).unwrap_or(TransactionType::Expense),
        amount: decimal_at(row, 2)?,
        category_id: row.get(3)?,
        account_id: row.get(4)?,
        date: row.get(5)?,
        note: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub(crate) fn fetch_transaction(conn: &Connection, id: &str) -> Result<Option<Transaction>> {
    optional(conn.query_row(
        &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"),
        params![id],
        row_to_transaction,
    ))
}

// Raw writes. These never touch account balances; callers outside the
// ledger must go through `Database::add_transaction` and friends.

pub(crate) fn insert_transaction_row(conn: &Connection, txn: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (id, kind, amount, category_id, account_id, date, note, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            txn.id,
            txn.kind.as_str(),
            txn.amount.to_string(),
            txn.category_id,
            txn.account_id,
            txn.date,
            txn.note,
            txn.created_at,
            txn.updated_at,
        ],
    )?;
    Ok(())
}

/// Rewrite every mutable column. `id` and `created_at` are never touched.
pub(crate) fn update_transaction_row(conn: &Connection, txn: &Transaction) -> Result<()> {
    conn.execute(
        "UPDATE transactions
         SET kind = ?1, amount = ?2, category_id = ?3, account_id = ?4, date = ?5, note = ?6, updated_at = ?7
         WHERE id = ?8",
        params![
            txn.kind.as_str(),
            txn.amount.to_string(),
            txn.category_id,
            txn.account_id,
            txn.date,
            txn.note,
            txn.updated_at,
            txn.id,
        ],
    )?;
    Ok(())
}

pub(crate) fn delete_transaction_row(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
    Ok(())
}

impl Database {
    // ── Transactions ──────────────────────────────────────────

    pub fn get_transaction(&self, id: &str) -> Result<Option<Transaction>> {
        fetch_transaction(&self.conn, id)
    }

    pub fn get_transaction_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    pub fn account_transaction_count(&self, account_id: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE account_id = ?1",
            params![account_id],
            |row| row.get(0),
        )?)
    }
}
