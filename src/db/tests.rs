#![allow(clippy::unwrap_used)]

use super::*;
use crate::error::LedgerError;
use crate::models::{
    AccountPatch, AccountType, BudgetPeriod, Category, CategoryPatch, NewAccount, NewCategory,
    NewTransaction, SettingKey, Theme, TransactionPatch, TransactionType,
};
use rust_decimal_macros::dec;

fn category_id(db: &Database, name: &str) -> String {
    Category::find_by_name(&db.get_categories().unwrap(), name)
        .unwrap()
        .id
        .clone()
}

// ── Default data ──────────────────────────────────────────────

#[test]
fn test_default_data_seeded() {
    let db = Database::open_in_memory().unwrap();
    let cats = db.get_categories().unwrap();
    assert_eq!(cats.len(), 13);
    assert!(cats.iter().all(|c| !c.is_custom));
    assert_eq!(db.get_categories_by_type(TransactionType::Income).unwrap().len(), 4);
    assert_eq!(db.get_categories_by_type(TransactionType::Expense).unwrap().len(), 9);

    let accounts = db.get_accounts().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Cash");
    assert_eq!(accounts[0].account_type, AccountType::Cash);
    assert_eq!(accounts[0].balance(), Decimal::ZERO);
    assert_eq!(
        db.get_settings().default_account_id.as_deref(),
        Some(accounts[0].id.as_str())
    );
}

#[test]
fn test_seeding_runs_once() {
    let mut db = Database::open_in_memory().unwrap();
    db.seed_defaults().unwrap();
    assert_eq!(db.get_categories().unwrap().len(), 13);
    assert_eq!(db.account_count().unwrap(), 1);
}

#[test]
fn test_reopen_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    let bank = {
        let db = Database::open(&path).unwrap();
        db.insert_account(&NewAccount::new("Bank", AccountType::Checking, dec!(250)))
            .unwrap()
    };

    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_categories().unwrap().len(), 13);
    assert_eq!(db.account_count().unwrap(), 2);
    assert_eq!(db.get_account_by_id(&bank).unwrap().unwrap().balance(), dec!(250));
}

// ── Accounts ──────────────────────────────────────────────────

#[test]
fn test_account_crud() {
    let db = Database::open_in_memory().unwrap();
    let mut new = NewAccount::new("  Savings  ", AccountType::Savings, dec!(500));
    new.icon = "piggy-bank".into();
    let id = db.insert_account(&new).unwrap();

    let fetched = db.get_account_by_id(&id).unwrap().unwrap();
    assert_eq!(fetched.name, "Savings");
    assert_eq!(fetched.balance(), dec!(500));
    assert_eq!(fetched.initial_balance, dec!(500));
    assert_eq!(fetched.order, 1);

    let patch = AccountPatch {
        name: Some("Rainy Day".into()),
        ..Default::default()
    };
    db.update_account(&id, &patch).unwrap();
    let fetched = db.get_account_by_id(&id).unwrap().unwrap();
    assert_eq!(fetched.name, "Rainy Day");
    assert_eq!(fetched.balance(), dec!(500));

    assert!(db.get_account_by_id("missing").unwrap().is_none());
    assert!(matches!(
        db.update_account("missing", &patch).unwrap_err(),
        LedgerError::NotFound { entity: "Account", .. }
    ));
    assert!(matches!(
        db.insert_account(&NewAccount::new(" ", AccountType::Cash, dec!(0)))
            .unwrap_err(),
        LedgerError::Validation(_)
    ));
}

#[test]
fn test_last_account_cannot_be_deleted() {
    let mut db = Database::open_in_memory().unwrap();
    let only = db.get_accounts().unwrap()[0].id.clone();
    assert!(matches!(
        db.delete_account(&only).unwrap_err(),
        LedgerError::LastAccount
    ));
    assert_eq!(db.account_count().unwrap(), 1);
}

#[test]
fn test_referenced_account_cannot_be_deleted() {
    let mut db = Database::open_in_memory().unwrap();
    let cash = db.get_accounts().unwrap()[0].id.clone();
    let bank = db
        .insert_account(&NewAccount::new("Bank", AccountType::Checking, dec!(0)))
        .unwrap();
    let food = category_id(&db, "Food & Dining");
    db.add_transaction(&NewTransaction::expense(dec!(9), food.as_str(), bank.as_str(), "2024-01-01"))
        .unwrap();
    db.add_transaction(&NewTransaction::expense(dec!(3), food.as_str(), cash.as_str(), "2024-01-01"))
        .unwrap();

    match db.delete_account(&bank).unwrap_err() {
        LedgerError::ReferencedEntity { entity, count, .. } => {
            assert_eq!(entity, "Account");
            assert_eq!(count, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(db.get_account_by_id(&bank).unwrap().is_some());
}

#[test]
fn test_delete_default_account_moves_default() {
    let mut db = Database::open_in_memory().unwrap();
    let cash = db.get_accounts().unwrap()[0].id.clone();
    let bank = db
        .insert_account(&NewAccount::new("Bank", AccountType::Checking, dec!(0)))
        .unwrap();

    db.delete_account(&cash).unwrap();
    assert!(db.get_account_by_id(&cash).unwrap().is_none());
    assert_eq!(db.get_settings().default_account_id, Some(bank));
    assert!(matches!(
        db.delete_account(&cash).unwrap_err(),
        LedgerError::NotFound { .. }
    ));
}

// ── Categories ────────────────────────────────────────────────

#[test]
fn test_system_category_is_protected() {
    let db = Database::open_in_memory().unwrap();
    let food = category_id(&db, "Food & Dining");
    assert!(matches!(
        db.delete_category(&food).unwrap_err(),
        LedgerError::ProtectedEntity { entity: "Category", .. }
    ));
    assert!(db.get_category_by_id(&food).unwrap().is_some());
}

#[test]
fn test_custom_category_lifecycle() {
    let mut db = Database::open_in_memory().unwrap();
    let pets = db
        .insert_category(&NewCategory::new("Pets", TransactionType::Expense))
        .unwrap();
    let cat = db.get_category_by_id(&pets).unwrap().unwrap();
    assert!(cat.is_custom);
    assert_eq!(cat.order, 13);

    db.update_category(
        &pets,
        &CategoryPatch {
            name: Some("Pet Care".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(db.get_category_by_id(&pets).unwrap().unwrap().name, "Pet Care");

    let cash = db.get_accounts().unwrap()[0].id.clone();
    let txn = db
        .add_transaction(&NewTransaction::expense(dec!(20), pets.as_str(), cash.as_str(), "2024-01-01"))
        .unwrap();
    assert!(matches!(
        db.delete_category(&pets).unwrap_err(),
        LedgerError::ReferencedEntity { count: 1, .. }
    ));

    db.set_budget(Some(pets.as_str()), dec!(50), BudgetPeriod::Monthly, "2024-01-01")
        .unwrap();
    db.delete_transaction(&txn).unwrap();
    db.delete_category(&pets).unwrap();
    assert!(db.get_category_by_id(&pets).unwrap().is_none());
    assert!(db.get_budgets(None).unwrap().is_empty());
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_transaction_timestamps() {
    let mut db = Database::open_in_memory().unwrap();
    let cash = db.get_accounts().unwrap()[0].id.clone();
    let food = category_id(&db, "Food & Dining");
    let id = db
        .add_transaction(
            &NewTransaction::expense(dec!(4.5), food.as_str(), cash.as_str(), "2024-01-01")
                .with_note("coffee"),
        )
        .unwrap();

    let added = db.get_transaction(&id).unwrap().unwrap();
    assert_eq!(added.created_at, added.updated_at);
    assert_eq!(added.note.as_deref(), Some("coffee"));

    db.update_transaction(
        &id,
        &TransactionPatch {
            date: Some("2024-01-02".into()),
            ..Default::default()
        },
    )
    .unwrap();
    let edited = db.get_transaction(&id).unwrap().unwrap();
    assert_eq!(edited.id, added.id);
    assert_eq!(edited.created_at, added.created_at);
    assert!(edited.updated_at >= added.updated_at);
    assert_eq!(db.account_transaction_count(&cash).unwrap(), 1);
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_budget_upsert_never_duplicates() {
    let db = Database::open_in_memory().unwrap();
    let food = category_id(&db, "Food & Dining");

    let first = db
        .set_budget(Some(food.as_str()), dec!(300), BudgetPeriod::Monthly, "2024-01-01")
        .unwrap();
    let second = db
        .set_budget(Some(food.as_str()), dec!(350), BudgetPeriod::Monthly, "2024-02-01")
        .unwrap();
    assert_eq!(first, second);

    let budget = db.get_budget_by_id(&first).unwrap().unwrap();
    assert_eq!(budget.amount, dec!(350));
    assert_eq!(budget.start_date, "2024-02-01");

    let yearly = db
        .set_budget(Some(food.as_str()), dec!(4000), BudgetPeriod::Yearly, "2024-01-01")
        .unwrap();
    assert_ne!(yearly, first);

    let general = db
        .set_budget(None, dec!(2000), BudgetPeriod::Monthly, "2024-01-01")
        .unwrap();
    let general_again = db
        .set_budget(None, dec!(2100), BudgetPeriod::Monthly, "2024-01-01")
        .unwrap();
    assert_eq!(general, general_again);

    assert_eq!(db.get_budgets(None).unwrap().len(), 3);
    assert_eq!(db.get_budgets(Some(BudgetPeriod::Monthly)).unwrap().len(), 2);
}

#[test]
fn test_budget_validation() {
    let db = Database::open_in_memory().unwrap();
    let food = category_id(&db, "Food & Dining");
    assert!(matches!(
        db.set_budget(Some(food.as_str()), dec!(-1), BudgetPeriod::Monthly, "2024-01-01")
            .unwrap_err(),
        LedgerError::Validation(_)
    ));
    assert!(matches!(
        db.set_budget(Some("missing"), dec!(10), BudgetPeriod::Monthly, "2024-01-01")
            .unwrap_err(),
        LedgerError::NotFound { entity: "Category", .. }
    ));
    assert!(matches!(
        db.delete_budget("missing").unwrap_err(),
        LedgerError::NotFound { .. }
    ));
}

// ── Settings ──────────────────────────────────────────────────

#[test]
fn test_settings_round_trip() {
    let db = Database::open_in_memory().unwrap();
    db.set_theme(Theme::Dark).unwrap();
    db.set_currency(" eur ").unwrap();
    let settings = db.get_settings();
    assert_eq!(settings.theme, Theme::Dark);
    assert_eq!(settings.currency, "EUR");
    assert!(db.set_currency("  ").is_err());

    db.clear_setting(SettingKey::Theme).unwrap();
    assert_eq!(db.get_settings().theme, Theme::System);
}

#[test]
fn test_unreadable_setting_falls_back() {
    let db = Database::open_in_memory().unwrap();
    db.conn
        .execute(
            "INSERT INTO settings (key, value) VALUES ('theme', 'not json')
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [],
        )
        .unwrap();
    db.conn
        .execute(
            "INSERT INTO settings (key, value) VALUES ('currency', '42')
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [],
        )
        .unwrap();

    let settings = db.get_settings();
    assert_eq!(settings.theme, Theme::System);
    assert_eq!(settings.currency, "USD");
    assert!(settings.default_account_id.is_some());
}

#[test]
fn test_default_account_must_exist() {
    let db = Database::open_in_memory().unwrap();
    assert!(matches!(
        db.set_default_account("missing").unwrap_err(),
        LedgerError::NotFound { .. }
    ));
    let bank = db
        .insert_account(&NewAccount::new("Bank", AccountType::Checking, dec!(0)))
        .unwrap();
    db.set_default_account(&bank).unwrap();
    assert_eq!(db.get_settings().default_account_id, Some(bank));
}
