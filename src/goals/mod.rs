//! Savings goal progress and completion projection.
//!
//! A goal moves from active to achieved at most once. `current_amount` is
//! only written here, from observed net savings since the goal's start date.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::dates::{add_months, format_day};
use crate::db::{
    fetch_goal, now_rfc3339, read_setting_or_none, write_goal_progress, write_setting, Database,
};
use crate::error::{LedgerError, Result};
use crate::models::{GoalProjection, GoalSummary, SavingsGoal, SettingKey};
use crate::query::{Totals, TransactionFilter};

/// Length of the trailing window used for projections.
pub const PROJECTION_WINDOW_MONTHS: u32 = 3;

/// Apply a new observed amount to `goal` in memory. Negative amounts are
/// floored at zero. Returns true when this call achieved the goal.
pub fn apply_progress(goal: &mut SavingsGoal, amount: Decimal, stamp: &str) -> bool {
    goal.current_amount = amount.max(Decimal::ZERO);
    goal.updated_at = stamp.to_string();
    if !goal.achieved && goal.current_amount >= goal.target_amount {
        goal.achieved = true;
        goal.achieved_at = Some(stamp.to_string());
        return true;
    }
    false
}

/// Linear completion estimate from the net savings of the trailing window.
///
/// The estimate is undefined unless the window saved money. Months are
/// `ceil(remaining * window_months / net)`; only the reported average is
/// rounded.
pub fn project_goal(goal: &SavingsGoal, window: &Totals, today: NaiveDate) -> GoalProjection {
    let window_months = Decimal::from(PROJECTION_WINDOW_MONTHS);
    let avg = (window.net / window_months).round_dp(2);

    let months_remaining = if window.net <= Decimal::ZERO {
        None
    } else {
        (goal.remaining() * window_months / window.net).ceil().to_u32()
    };

    let Some(months) = months_remaining else {
        return GoalProjection {
            avg_monthly_savings: avg,
            months_remaining: None,
            predicted_date: None,
            is_on_track: Some(false),
        };
    };

    let predicted = add_months(today, months.try_into().unwrap_or(i32::MAX));
    let is_on_track = goal
        .target_date
        .as_deref()
        .map(|target| format_day(predicted).as_str() <= target);

    GoalProjection {
        avg_monthly_savings: avg,
        months_remaining: Some(months),
        predicted_date: Some(predicted),
        is_on_track,
    }
}

impl Database {
    /// Set a goal's observed amount. Achievement is sticky: a later lower
    /// amount keeps `achieved` and `achieved_at` as they were.
    pub fn update_goal_progress(&self, id: &str, amount: Decimal) -> Result<SavingsGoal> {
        let mut goal =
            fetch_goal(&self.conn, id)?.ok_or_else(|| LedgerError::not_found("SavingsGoal", id))?;
        if apply_progress(&mut goal, amount, &now_rfc3339()) {
            info!(goal_id = %id, amount = %goal.current_amount, "savings goal achieved");
        }
        write_goal_progress(&self.conn, &goal)?;
        Ok(goal)
    }

    /// Net income minus expense over every transaction dated on or after
    /// `start_date`.
    pub fn net_savings_since(&self, start_date: &str) -> Result<Decimal> {
        Ok(self.totals(&TransactionFilter::default().since(start_date))?.net)
    }

    /// Recompute every active goal from the full history since its start.
    /// Runs at most once per calendar day; returns whether it ran.
    pub fn run_daily_goal_update(&self, today: NaiveDate) -> Result<bool> {
        let today_key = format_day(today);
        let last: Option<String> = read_setting_or_none(&self.conn, SettingKey::SavingsGoalsLastUpdate);
        if last.as_deref() == Some(today_key.as_str()) {
            debug!(day = %today_key, "savings goals already updated today");
            return Ok(false);
        }

        let active = self.get_goals_by_status(false)?;
        for goal in &active {
            let net = self.net_savings_since(&goal.start_date)?;
            self.update_goal_progress(&goal.id, net)?;
        }
        write_setting(&self.conn, SettingKey::SavingsGoalsLastUpdate, &today_key)?;

        info!(day = %today_key, goals = active.len(), "savings goals updated");
        Ok(true)
    }

    /// Projection for one goal from the last three months of activity.
    pub fn predict_goal(&self, id: &str, today: NaiveDate) -> Result<GoalProjection> {
        let goal = fetch_goal(&self.conn, id)?.ok_or_else(|| LedgerError::not_found("SavingsGoal", id))?;
        let window = self.projection_window_totals(today)?;
        Ok(project_goal(&goal, &window, today))
    }

    /// Every goal with its progress and projection, oldest first.
    pub fn goal_summary(&self, today: NaiveDate) -> Result<Vec<GoalSummary>> {
        let window = self.projection_window_totals(today)?;
        Ok(self
            .get_goals()?
            .into_iter()
            .map(|goal| GoalSummary {
                percentage: goal.progress_percentage(),
                remaining: goal.remaining(),
                projection: project_goal(&goal, &window, today),
                goal,
            })
            .collect())
    }

    fn projection_window_totals(&self, today: NaiveDate) -> Result<Totals> {
        let start = add_months(today, -(PROJECTION_WINDOW_MONTHS as i32));
        self.totals(&TransactionFilter::default().between(start, today))
    }
}
