//! Local personal-finance ledger: accounts, categories, transactions,
//! budgets and savings goals on an embedded SQLite database, with account
//! balances kept consistent across every transaction write.

pub mod budget;
pub mod dates;
pub mod db;
pub mod error;
pub mod goals;
pub mod id;
pub mod ledger;
pub mod models;
pub mod query;

pub use db::Database;
pub use error::{LedgerError, Result};
