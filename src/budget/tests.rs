#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::dates::parse_day;
use crate::models::{Category, NewTransaction};

fn budget(category_id: Option<&str>, amount: Decimal) -> Budget {
    Budget {
        id: "b1".into(),
        category_id: category_id.map(str::to_string),
        amount,
        period: BudgetPeriod::Monthly,
        start_date: "2024-01-01".into(),
    }
}

fn txn(kind: TransactionType, amount: Decimal, category_id: &str) -> Transaction {
    Transaction {
        id: format!("t-{amount}-{category_id}"),
        kind,
        amount,
        category_id: category_id.into(),
        account_id: "a1".into(),
        date: "2024-01-10".into(),
        note: None,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

// ── Pure aggregation ─────────────────────────────────────────

#[test]
fn test_spent_counts_matching_expenses_only() {
    let budgets = [budget(Some("food"), dec!(200))];
    let txns = [
        txn(TransactionType::Expense, dec!(50), "food"),
        txn(TransactionType::Expense, dec!(25), "food"),
        txn(TransactionType::Expense, dec!(90), "rent"),
        txn(TransactionType::Income, dec!(500), "food"),
    ];
    let progress = summarize_budgets(&budgets, &txns);
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].spent, dec!(75));
    assert_eq!(progress[0].remaining, dec!(125));
    assert_eq!(progress[0].percentage, dec!(37.5));
    assert!(!progress[0].is_over());
}

#[test]
fn test_percentage_clamped_on_overspend() {
    let budgets = [budget(Some("food"), dec!(100))];
    let txns = [txn(TransactionType::Expense, dec!(1000), "food")];
    let progress = summarize_budgets(&budgets, &txns);
    assert_eq!(progress[0].percentage, dec!(100));
    assert_eq!(progress[0].remaining, dec!(-900));
    assert!(progress[0].is_over());
}

#[test]
fn test_percentage_always_in_range() {
    for spent in [dec!(0), dec!(0.01), dec!(50), dec!(99.99), dec!(100), dec!(12345)] {
        let progress = summarize_budgets(
            &[budget(Some("c"), dec!(100))],
            &[txn(TransactionType::Expense, spent, "c")],
        );
        let pct = progress[0].percentage;
        assert!(pct >= Decimal::ZERO && pct <= dec!(100), "{spent} -> {pct}");
    }
}

#[test]
fn test_zero_limit_is_guarded() {
    let empty = summarize_budgets(&[budget(Some("c"), Decimal::ZERO)], &[]);
    assert_eq!(empty[0].percentage, Decimal::ZERO);

    let spent = summarize_budgets(
        &[budget(Some("c"), Decimal::ZERO)],
        &[txn(TransactionType::Expense, dec!(1), "c")],
    );
    assert_eq!(spent[0].percentage, dec!(100));
    assert_eq!(spent[0].remaining, dec!(-1));
}

#[test]
fn test_general_budget_reports_nothing_spent() {
    let progress = summarize_budgets(
        &[budget(None, dec!(300))],
        &[txn(TransactionType::Expense, dec!(40), "food")],
    );
    assert_eq!(progress[0].spent, Decimal::ZERO);
    assert_eq!(progress[0].remaining, dec!(300));
    assert_eq!(progress[0].percentage, Decimal::ZERO);
}

#[test]
fn test_period_window() {
    let today = parse_day("2024-02-20").unwrap();
    assert_eq!(
        period_window(BudgetPeriod::Monthly, today),
        (parse_day("2024-02-01").unwrap(), parse_day("2024-02-29").unwrap())
    );
    assert_eq!(
        period_window(BudgetPeriod::Yearly, today),
        (parse_day("2024-01-01").unwrap(), parse_day("2024-12-31").unwrap())
    );
}

// ── Database-backed status ───────────────────────────────────

#[test]
fn test_budget_status_uses_current_window() {
    let mut db = Database::open_in_memory().unwrap();
    let account = db.get_accounts().unwrap()[0].id.clone();
    let cats = db.get_categories().unwrap();
    let food = Category::find_by_name(&cats, "Food & Dining").unwrap().id.clone();

    db.set_budget(Some(food.as_str()), dec!(300), BudgetPeriod::Monthly, "2024-01-01")
        .unwrap();
    db.set_budget(Some(food.as_str()), dec!(3000), BudgetPeriod::Yearly, "2024-01-01")
        .unwrap();

    for (amount, date) in [(dec!(100), "2024-01-15"), (dec!(50), "2024-02-03"), (dec!(20), "2024-02-28")] {
        db.add_transaction(&NewTransaction::expense(amount, food.as_str(), account.as_str(), date))
            .unwrap();
    }

    let today = parse_day("2024-02-15").unwrap();
    let monthly = db.budget_status(BudgetPeriod::Monthly, today).unwrap();
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0].spent, dec!(70));
    assert_eq!(monthly[0].remaining, dec!(230));

    let yearly = db.budget_status(BudgetPeriod::Yearly, today).unwrap();
    assert_eq!(yearly.len(), 1);
    assert_eq!(yearly[0].spent, dec!(170));
}
