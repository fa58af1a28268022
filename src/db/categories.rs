use rusqlite::{params, Connection, Row};
use tracing::info;

use super::{next_order, optional, Database};
use crate::error::{LedgerError, Result};
use crate::id::new_id;
use crate::models::{Category, CategoryPatch, NewCategory, TransactionType};

const CATEGORY_COLUMNS: &str = "id, name, kind, icon, color, sort_order, is_custom";

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    let kind: String = row.get(2)?;
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: TransactionType::parse(&kind).unwrap_or(TransactionType::Expense),
        icon: row.get(3)?,
        color: row.get(4)?,
        order: row.get(5)?,
        is_custom: row.get(6)?,
    })
}

pub(crate) fn fetch_category(conn: &Connection, id: &str) -> Result<Option<Category>> {
    optional(conn.query_row(
        &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
        params![id],
        row_to_category,
    ))
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("category name cannot be empty"));
    }
    Ok(name.to_string())
}

impl Database {
    // ── Categories ────────────────────────────────────────────

    pub fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY sort_order, name"
        ))?;
        let rows = stmt.query_map([], row_to_category)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn get_categories_by_type(&self, kind: TransactionType) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE kind = ?1 ORDER BY sort_order, name"
        ))?;
        let rows = stmt.query_map(params![kind.as_str()], row_to_category)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn get_category_by_id(&self, id: &str) -> Result<Option<Category>> {
        fetch_category(&self.conn, id)
    }

    /// Add a user-defined category at the end of the list.
    pub fn insert_category(&self, cat: &NewCategory) -> Result<String> {
        let name = validate_name(&cat.name)?;
        let order = next_order(&self.conn, "categories")?;
        let id = new_id();
        self.conn.execute(
            "INSERT INTO categories (id, name, kind, icon, color, sort_order, is_custom)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
            params![id, name, cat.kind.as_str(), cat.icon, cat.color, order],
        )?;
        info!(category_id = %id, "category created");
        Ok(id)
    }

    pub fn update_category(&self, id: &str, patch: &CategoryPatch) -> Result<()> {
        let mut cat =
            fetch_category(&self.conn, id)?.ok_or_else(|| LedgerError::not_found("Category", id))?;
        if let Some(name) = &patch.name {
            cat.name = validate_name(name)?;
        }
        if let Some(icon) = &patch.icon {
            cat.icon = icon.clone();
        }
        if let Some(color) = &patch.color {
            cat.color = color.clone();
        }
        if let Some(order) = patch.order {
            cat.order = order;
        }
        self.conn.execute(
            "UPDATE categories SET name = ?1, icon = ?2, color = ?3, sort_order = ?4 WHERE id = ?5",
            params![cat.name, cat.icon, cat.color, cat.order, id],
        )?;
        Ok(())
    }

    pub fn category_transaction_count(&self, id: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE category_id = ?1",
            params![id],
            |row| row.get(0),
        )?)
    }

    /// Delete a custom category that no transaction references. Budgets on
    /// the category go with it.
    pub fn delete_category(&self, id: &str) -> Result<()> {
        let cat =
            fetch_category(&self.conn, id)?.ok_or_else(|| LedgerError::not_found("Category", id))?;

        let count = self.category_transaction_count(id)?;
        if count > 0 {
            return Err(LedgerError::ReferencedEntity {
                entity: "Category",
                id: id.to_string(),
                count,
            });
        }
        if !cat.is_custom {
            return Err(LedgerError::ProtectedEntity {
                entity: "Category",
                id: id.to_string(),
            });
        }

        self.conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        info!(category_id = %id, "category deleted");
        Ok(())
    }
}
