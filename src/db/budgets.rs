use rusqlite::{params, Row};
use rust_decimal::Decimal;
use tracing::info;

use super::{decimal_at, optional, Database};
use crate::error::{LedgerError, Result};
use crate::id::new_id;
use crate::models::{Budget, BudgetPeriod};

const BUDGET_COLUMNS: &str = "id, category_id, amount, period, start_date";

fn row_to_budget(row: &Row<'_>) -> rusqlite::Result<Budget> {
    let period: String = row.get(3)?;
    Ok(Budget {
        id: row.get(0)?,
        category_id: row.get(1)?,
        amount: decimal_at(row, 2)?,
        period: BudgetPeriod::parse(&period).unwrap_or(BudgetPeriod::Monthly),
        start_date: row.get(4)?,
    })
}

impl Database {
    // ── Budgets ───────────────────────────────────────────────

    /// Insert or update the budget for `(category_id, period)`. Returns the id
    /// of the budget that now holds the amount.
    pub fn set_budget(
        &self,
        category_id: Option<&str>,
        amount: Decimal,
        period: BudgetPeriod,
        start_date: &str,
    ) -> Result<String> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::validation("budget amount cannot be negative"));
        }
        if let Some(cid) = category_id {
            if self.get_category_by_id(cid)?.is_none() {
                return Err(LedgerError::not_found("Category", cid));
            }
        }

        let existing: Option<String> = optional(self.conn.query_row(
            "SELECT id FROM budgets WHERE category_id IS ?1 AND period = ?2",
            params![category_id, period.as_str()],
            |row| row.get(0),
        ))?;

        match existing {
            Some(id) => {
                self.conn.execute(
                    "UPDATE budgets SET amount = ?1, start_date = ?2 WHERE id = ?3",
                    params![amount.to_string(), start_date, id],
                )?;
                info!(budget_id = %id, %amount, "budget updated");
                Ok(id)
            }
            None => {
                let id = new_id();
                self.conn.execute(
                    "INSERT INTO budgets (id, category_id, amount, period, start_date)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![id, category_id, amount.to_string(), period.as_str(), start_date],
                )?;
                info!(budget_id = %id, %amount, "budget created");
                Ok(id)
            }
        }
    }

    /// Budgets, optionally restricted to one period.
    pub fn get_budgets(&self, period: Option<BudgetPeriod>) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets
             WHERE ?1 IS NULL OR period = ?1
             ORDER BY period, category_id"
        ))?;
        let rows = stmt.query_map(params![period.map(|p| p.as_str())], row_to_budget)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn get_budget_by_id(&self, id: &str) -> Result<Option<Budget>> {
        optional(self.conn.query_row(
            &format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = ?1"),
            params![id],
            row_to_budget,
        ))
    }

    pub fn delete_budget(&self, id: &str) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM budgets WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(LedgerError::not_found("Budget", id));
        }
        Ok(())
    }
}
