//! Balance reconciliation.
//!
//! Every transaction mutation that can move money goes through this module,
//! which keeps each account's running balance equal to
//! `initial_balance + Σ income − Σ expense` over the transactions that
//! reference it. Balances are adjusted incrementally: one full reversal or
//! application per affected transaction, never a rescan.
//!
//! Each single-transaction operation writes the transaction record and the
//! balance inside one SQLite transaction, so a failure in the second write
//! leaves neither applied. Bulk delete commits item by item: a failure stops
//! the batch and keeps the items already reconciled.
//!
//! [`Database::audit_balances`] recomputes balances from a full scan and
//! [`Database::repair_balances`] rewrites any that drifted. Opening a file
//! database runs the repair.

use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::db::{
    delete_transaction_row, fetch_account, fetch_transaction, insert_transaction_row,
    now_rfc3339, update_transaction_row, Database,
};
use crate::error::{LedgerError, Result};
use crate::id::new_id;
use crate::models::{NewTransaction, Transaction, TransactionPatch, TransactionType};

/// An account whose stored balance disagrees with its transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDrift {
    pub account_id: String,
    pub account_name: String,
    pub stored: Decimal,
    pub expected: Decimal,
}

/// `balance += is_income ? amount : -amount` on one account.
fn update_balance(
    conn: &Connection,
    account_id: &str,
    amount: Decimal,
    is_income: bool,
) -> Result<Decimal> {
    let account = fetch_account(conn, account_id)?
        .ok_or_else(|| LedgerError::not_found("Account", account_id))?;
    let delta = if is_income { amount.abs() } else { -amount.abs() };
    let balance = account.balance + delta;
    conn.execute(
        "UPDATE accounts SET balance = ?1 WHERE id = ?2",
        params![balance.to_string(), account_id],
    )?;
    debug!(account_id, %delta, %balance, "balance updated");
    Ok(balance)
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation("amount must be greater than zero"));
    }
    Ok(())
}

fn ensure_category(conn: &Connection, category_id: &str) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)",
        params![category_id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(LedgerError::not_found("Category", category_id));
    }
    Ok(())
}

/// Whether an edit from `old` to `new` changes any balance.
fn affects_balance(old: &Transaction, new: &Transaction) -> bool {
    old.amount != new.amount || old.account_id != new.account_id || old.kind != new.kind
}

impl Database {
    /// Record a transaction and apply it to its account. Returns the new id.
    pub fn add_transaction(&mut self, new: &NewTransaction) -> Result<String> {
        validate_amount(new.amount)?;

        let tx = self.conn.transaction()?;
        if fetch_account(&tx, &new.account_id)?.is_none() {
            return Err(LedgerError::not_found("Account", &new.account_id));
        }
        ensure_category(&tx, &new.category_id)?;

        let now = now_rfc3339();
        let txn = Transaction {
            id: new_id(),
            kind: new.kind,
            amount: new.amount,
            category_id: new.category_id.clone(),
            account_id: new.account_id.clone(),
            date: new.date.clone(),
            note: new.note.clone(),
            created_at: now.clone(),
            updated_at: now,
        };

        insert_transaction_row(&tx, &txn)?;
        update_balance(&tx, &txn.account_id, txn.amount, txn.is_income())?;
        tx.commit()?;

        info!(
            transaction_id = %txn.id,
            account_id = %txn.account_id,
            kind = %txn.kind,
            amount = %txn.amount,
            "transaction added"
        );
        Ok(txn.id)
    }

    /// Edit a transaction. When amount, account or type change, the old
    /// effect is fully reversed on the old account and the new effect fully
    /// applied on the new one before the record itself is rewritten.
    pub fn update_transaction(&mut self, id: &str, patch: &TransactionPatch) -> Result<()> {
        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
        }

        let tx = self.conn.transaction()?;
        let old =
            fetch_transaction(&tx, id)?.ok_or_else(|| LedgerError::not_found("Transaction", id))?;

        let mut new = old.clone();
        if let Some(kind) = patch.kind {
            new.kind = kind;
        }
        if let Some(amount) = patch.amount {
            new.amount = amount;
        }
        if let Some(category_id) = &patch.category_id {
            if *category_id != old.category_id {
                ensure_category(&tx, category_id)?;
            }
            new.category_id = category_id.clone();
        }
        if let Some(account_id) = &patch.account_id {
            new.account_id = account_id.clone();
        }
        if let Some(date) = &patch.date {
            new.date = date.clone();
        }
        if let Some(note) = &patch.note {
            new.note = note.clone();
        }
        new.updated_at = now_rfc3339();

        let rebalanced = affects_balance(&old, &new);
        if rebalanced {
            update_balance(&tx, &old.account_id, old.amount, !old.is_income())?;
            update_balance(&tx, &new.account_id, new.amount, new.is_income())?;
        }

        update_transaction_row(&tx, &new)?;
        tx.commit()?;

        info!(transaction_id = %id, rebalanced, "transaction updated");
        Ok(())
    }

    /// Reverse a transaction's effect and remove it. Deleting a transaction
    /// that does not exist is a no-op; returns whether anything was removed.
    pub fn delete_transaction(&mut self, id: &str) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let Some(txn) = fetch_transaction(&tx, id)? else {
            debug!(transaction_id = %id, "delete of missing transaction ignored");
            return Ok(false);
        };

        update_balance(&tx, &txn.account_id, txn.amount, !txn.is_income())?;
        delete_transaction_row(&tx, id)?;
        tx.commit()?;

        info!(transaction_id = %id, account_id = %txn.account_id, "transaction deleted");
        Ok(true)
    }

    /// Delete transactions one at a time, in order. The first failure aborts
    /// the rest; earlier deletions stay committed. Returns how many
    /// transactions were removed.
    pub fn bulk_delete_transactions<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<usize> {
        let mut removed = 0;
        for (index, id) in ids.iter().enumerate() {
            let id = id.as_ref();
            match self.delete_transaction(id) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        transaction_id = %id,
                        index,
                        removed,
                        error = %e,
                        "bulk delete aborted"
                    );
                    return Err(e);
                }
            }
        }
        info!(requested = ids.len(), removed, "bulk delete finished");
        Ok(removed)
    }

    /// Compare every stored balance with a full recomputation from the
    /// transaction history.
    pub fn audit_balances(&self) -> Result<Vec<BalanceDrift>> {
        let mut sums: HashMap<String, Decimal> = HashMap::new();
        let mut stmt = self
            .conn
            .prepare("SELECT account_id, kind, amount FROM transactions")?;
        let rows = stmt.query_map([], |row| {
            let account_id: String = row.get(0)?;
            let kind: String = row.get(1)?;
            let amount = crate::db::decimal_at(row, 2)?;
            Ok((account_id, kind, amount))
        })?;
        for row in rows {
            let (account_id, kind, amount) = row?;
            let kind = TransactionType::parse(&kind).unwrap_or(TransactionType::Expense);
            *sums.entry(account_id).or_default() += kind.signed(amount);
        }

        let mut drift = Vec::new();
        for account in self.get_accounts()? {
            let expected =
                account.initial_balance + sums.get(&account.id).copied().unwrap_or_default();
            if expected != account.balance {
                drift.push(BalanceDrift {
                    account_id: account.id,
                    account_name: account.name,
                    stored: account.balance,
                    expected,
                });
            }
        }
        Ok(drift)
    }

    /// Rewrite drifted balances with their recomputed values. Returns the
    /// accounts that were corrected.
    pub fn repair_balances(&mut self) -> Result<Vec<BalanceDrift>> {
        let drift = self.audit_balances()?;
        if drift.is_empty() {
            return Ok(drift);
        }

        let tx = self.conn.transaction()?;
        for d in &drift {
            warn!(
                account_id = %d.account_id,
                stored = %d.stored,
                expected = %d.expected,
                "repairing account balance"
            );
            tx.execute(
                "UPDATE accounts SET balance = ?1 WHERE id = ?2",
                params![d.expected.to_string(), d.account_id],
            )?;
        }
        tx.commit()?;
        Ok(drift)
    }
}

#[cfg(test)]
mod tests;
