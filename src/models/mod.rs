mod account;
mod budget;
mod category;
mod savings_goal;
mod settings;
mod transaction;

pub use account::{Account, AccountPatch, AccountType, NewAccount};
pub use budget::{Budget, BudgetPeriod, BudgetProgress};
pub use category::{Category, CategoryPatch, NewCategory};
pub use savings_goal::{
    GoalProjection, GoalSummary, NewSavingsGoal, SavingsGoal, SavingsGoalPatch,
    GOAL_NAME_MAX_CHARS,
};
pub use settings::{SettingKey, Settings, Theme};
pub use transaction::{NewTransaction, Transaction, TransactionPatch, TransactionType};
