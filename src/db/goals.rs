use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use tracing::info;

use super::{decimal_at, now_rfc3339, optional, Database};
use crate::error::{LedgerError, Result};
use crate::id::new_id;
use crate::models::{NewSavingsGoal, SavingsGoal, SavingsGoalPatch, GOAL_NAME_MAX_CHARS};

const GOAL_COLUMNS: &str = "id, name, target_amount, current_amount, start_date, target_date,
     achieved, achieved_at, icon, color, created_at, updated_at";

fn row_to_goal(row: &Row<'_>) -> rusqlite::Result<SavingsGoal> {
    Ok(SavingsGoal {
        id: row.get(0)?,
        name: row.get(1)?,
        target_amount: decimal_at(row, 2)?,
        current_amount: decimal_at(row, 3)?,
        start_date: row.get(4)?,
        target_date: row.get(5)?,
        achieved: row.get(6)?,
        achieved_at: row.get(7)?,
        icon: row.get(8)?,
        color: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

pub(crate) fn fetch_goal(conn: &Connection, id: &str) -> Result<Option<SavingsGoal>> {
    optional(conn.query_row(
        &format!("SELECT {GOAL_COLUMNS} FROM savings_goals WHERE id = ?1"),
        params![id],
        row_to_goal,
    ))
}

/// Persist the progress fields of `goal`.
pub(crate) fn write_goal_progress(conn: &Connection, goal: &SavingsGoal) -> Result<()> {
    conn.execute(
        "UPDATE savings_goals
         SET current_amount = ?1, achieved = ?2, achieved_at = ?3, updated_at = ?4
         WHERE id = ?5",
        params![
            goal.current_amount.to_string(),
            goal.achieved,
            goal.achieved_at,
            goal.updated_at,
            goal.id,
        ],
    )?;
    Ok(())
}

pub(crate) fn validate_goal_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("goal name cannot be empty"));
    }
    if name.chars().count() > GOAL_NAME_MAX_CHARS {
        return Err(LedgerError::validation(format!(
            "goal name cannot exceed {GOAL_NAME_MAX_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

pub(crate) fn validate_goal_target(target: Decimal) -> Result<Decimal> {
    if target <= Decimal::ZERO {
        return Err(LedgerError::validation("goal target amount must be positive"));
    }
    Ok(target)
}

impl Database {
    // ── Savings goals ─────────────────────────────────────────

    pub fn insert_goal(&self, goal: &NewSavingsGoal) -> Result<String> {
        let name = validate_goal_name(&goal.name)?;
        let target = validate_goal_target(goal.target_amount)?;
        let id = new_id();
        let now = now_rfc3339();
        self.conn.execute(
            "INSERT INTO savings_goals (id, name, target_amount, current_amount, start_date, target_date,
                                        achieved, achieved_at, icon, color, created_at, updated_at)
             VALUES (?1, ?2, ?3, '0', ?4, ?5, 0, NULL, ?6, ?7, ?8, ?8)",
            params![
                id,
                name,
                target.to_string(),
                goal.start_date,
                goal.target_date,
                goal.icon,
                goal.color,
                now,
            ],
        )?;
        info!(goal_id = %id, %target, "savings goal created");
        Ok(id)
    }

    /// All goals, oldest first.
    pub fn get_goals(&self) -> Result<Vec<SavingsGoal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM savings_goals ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map([], row_to_goal)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Goals filtered by achievement state, oldest first.
    pub fn get_goals_by_status(&self, achieved: bool) -> Result<Vec<SavingsGoal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM savings_goals WHERE achieved = ?1 ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map(params![achieved], row_to_goal)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn get_goal_by_id(&self, id: &str) -> Result<Option<SavingsGoal>> {
        fetch_goal(&self.conn, id)
    }

    /// Update the user-editable fields of a goal. Progress fields are owned
    /// by [`Database::update_goal_progress`].
    pub fn update_goal(&self, id: &str, patch: &SavingsGoalPatch) -> Result<()> {
        let mut goal =
            fetch_goal(&self.conn, id)?.ok_or_else(|| LedgerError::not_found("SavingsGoal", id))?;

        if let Some(name) = &patch.name {
            goal.name = validate_goal_name(name)?;
        }
        if let Some(target) = patch.target_amount {
            goal.target_amount = validate_goal_target(target)?;
        }
        if let Some(start) = &patch.start_date {
            goal.start_date = start.clone();
        }
        if let Some(target_date) = &patch.target_date {
            goal.target_date = target_date.clone();
        }
        if let Some(icon) = &patch.icon {
            goal.icon = icon.clone();
        }
        if let Some(color) = &patch.color {
            goal.color = color.clone();
        }

        self.conn.execute(
            "UPDATE savings_goals
             SET name = ?1, target_amount = ?2, start_date = ?3, target_date = ?4,
                 icon = ?5, color = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                goal.name,
                goal.target_amount.to_string(),
                goal.start_date,
                goal.target_date,
                goal.icon,
                goal.color,
                now_rfc3339(),
                id,
            ],
        )?;
        Ok(())
    }

    pub fn delete_goal(&self, id: &str) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM savings_goals WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(LedgerError::not_found("SavingsGoal", id));
        }
        info!(goal_id = %id, "savings goal deleted");
        Ok(())
    }
}
