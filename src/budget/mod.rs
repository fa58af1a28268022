//! Budget consumption, recomputed on every read.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::dates::{month_bounds, year_bounds};
use crate::db::Database;
use crate::error::Result;
use crate::models::{Budget, BudgetPeriod, BudgetProgress, Transaction, TransactionType};
use crate::query::{SortOrder, TransactionFilter};

/// Spend-vs-limit for each budget over `transactions`.
///
/// Only expenses in the budget's category count. General budgets (no
/// category) always report zero spent. A zero limit reports 100% once
/// anything is spent and 0% otherwise.
pub fn summarize_budgets(budgets: &[Budget], transactions: &[Transaction]) -> Vec<BudgetProgress> {
    budgets
        .iter()
        .map(|budget| {
            let spent: Decimal = match &budget.category_id {
                Some(cid) => transactions
                    .iter()
                    .filter(|t| t.kind == TransactionType::Expense && t.category_id == *cid)
                    .map(|t| t.amount)
                    .sum(),
                None => Decimal::ZERO,
            };
            BudgetProgress {
                budget: budget.clone(),
                spent,
                remaining: budget.amount - spent,
                percentage: spent_percentage(spent, budget.amount),
            }
        })
        .collect()
}

fn spent_percentage(spent: Decimal, limit: Decimal) -> Decimal {
    if limit <= Decimal::ZERO {
        return if spent > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
    }
    (spent / limit * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Inclusive date window of the budget period that contains `today`.
pub fn period_window(period: BudgetPeriod, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match period {
        BudgetPeriod::Monthly => month_bounds(today),
        BudgetPeriod::Yearly => year_bounds(today),
    }
}

impl Database {
    /// Progress of every `period` budget over the current period window.
    pub fn budget_status(&self, period: BudgetPeriod, today: NaiveDate) -> Result<Vec<BudgetProgress>> {
        let budgets = self.get_budgets(Some(period))?;
        let (start, end) = period_window(period, today);
        let filter = TransactionFilter::default()
            .kind(TransactionType::Expense)
            .between(start, end);
        let txns = self.list_transactions(&filter, SortOrder::Descending)?;
        Ok(summarize_budgets(&budgets, &txns))
    }
}

#[cfg(test)]
mod tests;
