//! Filtering over the transaction collection.
//!
//! Every predicate in a [`TransactionFilter`] is optional and they combine
//! with AND. Date bounds are inclusive and compared as "YYYY-MM-DD" strings;
//! callers must store dates in exactly that layout.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::dates::{add_months, format_day, month_bounds, month_key};
use crate::db::Database;
use crate::error::Result;
use crate::models::{Transaction, TransactionType};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
}

impl TransactionFilter {
    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn since(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    pub fn until(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    pub fn between(self, start: NaiveDate, end: NaiveDate) -> Self {
        self.since(format_day(start)).until(format_day(end))
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// In-memory equivalent of the SQL predicate (ignores `limit`).
    pub fn matches(&self, txn: &Transaction) -> bool {
        self.kind.map_or(true, |k| txn.kind == k)
            && self.category_id.as_ref().map_or(true, |c| txn.category_id == *c)
            && self.account_id.as_ref().map_or(true, |a| txn.account_id == *a)
            && self.start_date.as_ref().map_or(true, |s| txn.date.as_str() >= s.as_str())
            && self.end_date.as_ref().map_or(true, |e| txn.date.as_str() <= e.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest first, for listings.
    #[default]
    Descending,
    /// Oldest first, for trend aggregation.
    Ascending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

impl Totals {
    pub fn from_transactions<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut totals = Self::default();
        for t in txns {
            match t.kind {
                TransactionType::Income => totals.income += t.amount,
                TransactionType::Expense => totals.expense += t.amount,
            }
        }
        totals.net = totals.income - totals.expense;
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotals {
    /// Format: "YYYY-MM"
    pub month: String,
    pub totals: Totals,
}

impl Database {
    pub fn list_transactions(
        &self,
        filter: &TransactionFilter,
        order: SortOrder,
    ) -> Result<Vec<Transaction>> {
        let mut sql = format!(
            "SELECT {} FROM transactions t WHERE 1=1",
            crate::db::TRANSACTION_COLUMNS
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(kind) = filter.kind {
            sql.push_str(&format!(" AND t.kind = ?{}", param_values.len() + 1));
            param_values.push(Box::new(kind.as_str()));
        }
        if let Some(cid) = &filter.category_id {
            sql.push_str(&format!(" AND t.category_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(cid.clone()));
        }
        if let Some(aid) = &filter.account_id {
            sql.push_str(&format!(" AND t.account_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(aid.clone()));
        }
        if let Some(start) = &filter.start_date {
            sql.push_str(&format!(" AND t.date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(start.clone()));
        }
        if let Some(end) = &filter.end_date {
            sql.push_str(&format!(" AND t.date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(end.clone()));
        }

        match order {
            SortOrder::Descending => sql.push_str(" ORDER BY t.date DESC, t.created_at DESC, t.id DESC"),
            SortOrder::Ascending => sql.push_str(" ORDER BY t.date ASC, t.created_at ASC, t.id ASC"),
        }
        if let Some(l) = filter.limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), crate::db::row_to_transaction)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Income, expense and net over the filtered transactions.
    pub fn totals(&self, filter: &TransactionFilter) -> Result<Totals> {
        let txns = self.list_transactions(filter, SortOrder::Ascending)?;
        Ok(Totals::from_transactions(&txns))
    }

    /// Per-month totals for the `months` calendar months ending with the month
    /// of `today`, oldest first. Months without activity are zero.
    pub fn monthly_trend(&self, months: u32, today: NaiveDate) -> Result<Vec<MonthlyTotals>> {
        if months == 0 {
            return Ok(Vec::new());
        }
        let (first_of_current, last_of_current) = month_bounds(today);
        let start = add_months(first_of_current, -(months as i32 - 1));

        let filter = TransactionFilter::default().between(start, last_of_current);
        let txns = self.list_transactions(&filter, SortOrder::Ascending)?;

        let mut trend: Vec<MonthlyTotals> = (0..months)
            .map(|i| MonthlyTotals {
                month: month_key(add_months(start, i as i32)),
                totals: Totals::default(),
            })
            .collect();

        for t in &txns {
            let key = t.date.get(..7).unwrap_or_default();
            if let Some(bucket) = trend.iter_mut().find(|m| m.month == key) {
                match t.kind {
                    TransactionType::Income => bucket.totals.income += t.amount,
                    TransactionType::Expense => bucket.totals.expense += t.amount,
                }
            }
        }
        for m in &mut trend {
            m.totals.net = m.totals.income - m.totals.expense;
        }
        Ok(trend)
    }
}
