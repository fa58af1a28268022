use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const GOAL_NAME_MAX_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    pub id: String,
    pub name: String,
    pub target_amount: Decimal,
    /// Written only by the progress engine from observed net savings.
    pub current_amount: Decimal,
    /// Format: "YYYY-MM-DD"
    pub start_date: String,
    pub target_date: Option<String>,
    pub achieved: bool,
    pub achieved_at: Option<String>,
    pub icon: String,
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
}

impl SavingsGoal {
    pub fn remaining(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    /// Progress towards the target as a percentage, capped at 100.
    pub fn progress_percentage(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.current_amount / self.target_amount * Decimal::ONE_HUNDRED)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }
}

#[derive(Debug, Clone)]
pub struct NewSavingsGoal {
    pub name: String,
    pub target_amount: Decimal,
    pub start_date: String,
    pub target_date: Option<String>,
    pub icon: String,
    pub color: String,
}

impl NewSavingsGoal {
    pub fn new(name: impl Into<String>, target_amount: Decimal, start_date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_amount,
            start_date: start_date.into(),
            target_date: None,
            icon: String::new(),
            color: String::new(),
        }
    }

    pub fn with_target_date(mut self, date: impl Into<String>) -> Self {
        self.target_date = Some(date.into());
        self
    }
}

/// Partial update for a goal. `current_amount`, `achieved` and
/// `achieved_at` are deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct SavingsGoalPatch {
    pub name: Option<String>,
    pub target_amount: Option<Decimal>,
    pub start_date: Option<String>,
    pub target_date: Option<Option<String>>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Linear completion estimate derived from recent net savings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProjection {
    pub avg_monthly_savings: Decimal,
    /// `None` when recent savings are not positive.
    pub months_remaining: Option<u32>,
    pub predicted_date: Option<NaiveDate>,
    /// `None` when the goal has no target date to compare against.
    pub is_on_track: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub goal: SavingsGoal,
    pub percentage: Decimal,
    pub remaining: Decimal,
    pub projection: GoalProjection,
}
