use rusqlite::{params, TransactionBehavior};
use std::sync::Mutex;
use tracing::info;

use super::{write_setting, Database};
use crate::error::Result;
use crate::id::new_id;
use crate::models::{SettingKey, TransactionType};

/// Serializes first-run seeding across every `Database` opened by this
/// process. The IMMEDIATE transaction below covers other processes.
static BOOTSTRAP: Mutex<()> = Mutex::new(());

/// (name, kind, icon, color)
const DEFAULT_CATEGORIES: &[(&str, TransactionType, &str, &str)] = &[
    ("Food & Dining", TransactionType::Expense, "utensils", "#f97316"),
    ("Transportation", TransactionType::Expense, "car", "#3b82f6"),
    ("Shopping", TransactionType::Expense, "shopping-bag", "#ec4899"),
    ("Housing", TransactionType::Expense, "home", "#8b5cf6"),
    ("Bills & Utilities", TransactionType::Expense, "receipt", "#eab308"),
    ("Entertainment", TransactionType::Expense, "film", "#14b8a6"),
    ("Health", TransactionType::Expense, "heart-pulse", "#ef4444"),
    ("Education", TransactionType::Expense, "book", "#6366f1"),
    ("Other Expense", TransactionType::Expense, "ellipsis", "#6b7280"),
    ("Salary", TransactionType::Income, "briefcase", "#22c55e"),
    ("Bonus", TransactionType::Income, "gift", "#10b981"),
    ("Investment", TransactionType::Income, "trending-up", "#0ea5e9"),
    ("Other Income", TransactionType::Income, "plus-circle", "#84cc16"),
];

const DEFAULT_ACCOUNT: (&str, &str, &str, &str) = ("Cash", "Cash", "wallet", "#22c55e");

impl Database {
    /// Seed system categories and the default account exactly once.
    pub(crate) fn seed_defaults(&mut self) -> Result<()> {
        let _guard = BOOTSTRAP.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let categories: i64 = tx.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if categories == 0 {
            for (order, (name, kind, icon, color)) in DEFAULT_CATEGORIES.iter().enumerate() {
                tx.execute(
                    "INSERT INTO categories (id, name, kind, icon, color, sort_order, is_custom)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
                    params![new_id(), name, kind.as_str(), icon, color, order as i64],
                )?;
            }
            info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
        }

        let accounts: i64 = tx.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;
        if accounts == 0 {
            let (name, account_type, icon, color) = DEFAULT_ACCOUNT;
            let id = new_id();
            tx.execute(
                "INSERT INTO accounts (id, name, account_type, balance, initial_balance, icon, color, sort_order)
                 VALUES (?1, ?2, ?3, '0', '0', ?4, ?5, 0)",
                params![id, name, account_type, icon, color],
            )?;
            write_setting(&tx, SettingKey::DefaultAccountId, &id)?;
            info!(account_id = %id, "seeded default account");
        }

        tx.commit()?;
        Ok(())
    }
}
