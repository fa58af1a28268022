#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::models::{AccountPatch, AccountType, Category, NewAccount};

struct Fixture {
    db: Database,
    a: String,
    b: String,
    food: String,
    salary: String,
}

fn fixture() -> Fixture {
    let db = Database::open_in_memory().unwrap();
    let a = db
        .insert_account(&NewAccount::new("Checking", AccountType::Checking, dec!(100)))
        .unwrap();
    let b = db
        .insert_account(&NewAccount::new("Wallet", AccountType::Cash, dec!(0)))
        .unwrap();
    let cats = db.get_categories().unwrap();
    let food = Category::find_by_name(&cats, "Food & Dining").unwrap().id.clone();
    let salary = Category::find_by_name(&cats, "Salary").unwrap().id.clone();
    Fixture {
        db,
        a,
        b,
        food,
        salary,
    }
}

impl Fixture {
    fn balance(&self, account_id: &str) -> Decimal {
        self.db.get_account_by_id(account_id).unwrap().unwrap().balance()
    }

    fn expense(&mut self, amount: Decimal, account_id: &str) -> String {
        let new = NewTransaction::expense(amount, self.food.as_str(), account_id, "2024-03-10");
        self.db.add_transaction(&new).unwrap()
    }

    fn income(&mut self, amount: Decimal, account_id: &str) -> String {
        let new = NewTransaction::income(amount, self.salary.as_str(), account_id, "2024-03-11");
        self.db.add_transaction(&new).unwrap()
    }

    fn assert_consistent(&self) {
        assert_eq!(self.db.audit_balances().unwrap(), Vec::new());
    }
}

// ── Add / delete ─────────────────────────────────────────────

#[test]
fn test_add_applies_to_balance() {
    let mut f = fixture();
    let a = f.a.clone();
    f.expense(dec!(30), &a);
    assert_eq!(f.balance(&a), dec!(70));
    f.income(dec!(50), &a);
    assert_eq!(f.balance(&a), dec!(120));
    f.assert_consistent();
}

#[test]
fn test_delete_reverses_income() {
    let mut f = fixture();
    let a = f.a.clone();
    f.expense(dec!(30), &a);
    let income = f.income(dec!(50), &a);
    assert_eq!(f.balance(&a), dec!(120));

    assert!(f.db.delete_transaction(&income).unwrap());
    assert_eq!(f.balance(&a), dec!(70));
    assert!(f.db.get_transaction(&income).unwrap().is_none());
    f.assert_consistent();
}

#[test]
fn test_add_then_delete_is_identity() {
    let mut f = fixture();
    let b = f.b.clone();
    let before = f.balance(&b);
    let id = f.expense(dec!(12.34), &b);
    assert_ne!(f.balance(&b), before);
    f.db.delete_transaction(&id).unwrap();
    assert_eq!(f.balance(&b), before);
}

#[test]
fn test_delete_missing_is_noop() {
    let mut f = fixture();
    assert!(!f.db.delete_transaction("nope").unwrap());
    assert_eq!(f.balance(&f.a.clone()), dec!(100));
}

#[test]
fn test_add_rejects_bad_input() {
    let mut f = fixture();
    let before = f.db.get_transaction_count().unwrap();

    for amount in [dec!(0), dec!(-5)] {
        let new = NewTransaction::expense(amount, f.food.as_str(), f.a.as_str(), "2024-03-10");
        assert!(matches!(
            f.db.add_transaction(&new).unwrap_err(),
            LedgerError::Validation(_)
        ));
    }

    let no_account = NewTransaction::expense(dec!(5), f.food.as_str(), "missing", "2024-03-10");
    assert!(matches!(
        f.db.add_transaction(&no_account).unwrap_err(),
        LedgerError::NotFound { entity: "Account", .. }
    ));

    let no_category = NewTransaction::expense(dec!(5), "missing", f.a.as_str(), "2024-03-10");
    assert!(matches!(
        f.db.add_transaction(&no_category).unwrap_err(),
        LedgerError::NotFound { entity: "Category", .. }
    ));

    assert_eq!(f.db.get_transaction_count().unwrap(), before);
    assert_eq!(f.balance(&f.a.clone()), dec!(100));
}

// ── Edit ─────────────────────────────────────────────────────

#[test]
fn test_edit_moves_between_accounts() {
    let mut f = fixture();
    let (a, b) = (f.a.clone(), f.b.clone());
    let id = f.expense(dec!(30), &a);
    assert_eq!(f.balance(&a), dec!(70));
    assert_eq!(f.balance(&b), dec!(0));

    let patch = TransactionPatch {
        account_id: Some(b.clone()),
        ..Default::default()
    };
    f.db.update_transaction(&id, &patch).unwrap();

    assert_eq!(f.balance(&a), dec!(100));
    assert_eq!(f.balance(&b), dec!(-30));
    assert_eq!(f.db.get_transaction(&id).unwrap().unwrap().account_id, b);
    f.assert_consistent();
}

#[test]
fn test_edit_amount_and_type() {
    let mut f = fixture();
    let a = f.a.clone();
    let id = f.expense(dec!(30), &a);

    let bigger = TransactionPatch {
        amount: Some(dec!(45)),
        ..Default::default()
    };
    f.db.update_transaction(&id, &bigger).unwrap();
    assert_eq!(f.balance(&a), dec!(55));

    let flipped = TransactionPatch {
        kind: Some(TransactionType::Income),
        category_id: Some(f.salary.clone()),
        ..Default::default()
    };
    f.db.update_transaction(&id, &flipped).unwrap();
    assert_eq!(f.balance(&a), dec!(145));
    f.assert_consistent();
}

#[test]
fn test_edit_without_money_fields_keeps_balance() {
    let mut f = fixture();
    let a = f.a.clone();
    let id = f.expense(dec!(30), &a);
    let other = Category::find_by_name(&f.db.get_categories().unwrap(), "Shopping")
        .unwrap()
        .id
        .clone();

    let patch = TransactionPatch {
        category_id: Some(other.clone()),
        date: Some("2024-03-01".into()),
        note: Some(Some("groceries".into())),
        ..Default::default()
    };
    f.db.update_transaction(&id, &patch).unwrap();
    assert_eq!(f.balance(&a), dec!(70));

    let stored = f.db.get_transaction(&id).unwrap().unwrap();
    assert_eq!(stored.category_id, other);
    assert_eq!(stored.date, "2024-03-01");
    assert_eq!(stored.note.as_deref(), Some("groceries"));

    f.db.update_transaction(&id, &TransactionPatch::default()).unwrap();
    assert_eq!(f.balance(&a), dec!(70));

    let cleared = TransactionPatch {
        note: Some(None),
        ..Default::default()
    };
    f.db.update_transaction(&id, &cleared).unwrap();
    assert_eq!(f.db.get_transaction(&id).unwrap().unwrap().note, None);
}

#[test]
fn test_edit_missing_transaction() {
    let mut f = fixture();
    let err = f
        .db
        .update_transaction("nope", &TransactionPatch::default())
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "Transaction", .. }));
}

#[test]
fn test_failed_edit_leaves_everything_untouched() {
    let mut f = fixture();
    let a = f.a.clone();
    let id = f.expense(dec!(30), &a);

    let patch = TransactionPatch {
        account_id: Some("missing".into()),
        amount: Some(dec!(10)),
        ..Default::default()
    };
    let err = f.db.update_transaction(&id, &patch).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "Account", .. }));

    assert_eq!(f.balance(&a), dec!(70));
    let stored = f.db.get_transaction(&id).unwrap().unwrap();
    assert_eq!(stored.account_id, a);
    assert_eq!(stored.amount, dec!(30));
    f.assert_consistent();
}

// ── Bulk delete ──────────────────────────────────────────────

#[test]
fn test_bulk_delete_counts_removed() {
    let mut f = fixture();
    let a = f.a.clone();
    let ids = vec![f.expense(dec!(10), &a), f.income(dec!(40), &a), "gone".to_string()];
    assert_eq!(f.db.bulk_delete_transactions(&ids).unwrap(), 2);
    assert_eq!(f.balance(&a), dec!(100));
    assert_eq!(f.db.get_transaction_count().unwrap(), 0);
}

#[test]
fn test_bulk_delete_stops_at_first_failure() {
    let mut f = fixture();
    let (a, b) = (f.a.clone(), f.b.clone());
    let first = f.expense(dec!(10), &a);
    let broken = f.expense(dec!(5), &b);
    let last = f.expense(dec!(20), &a);
    assert_eq!(f.balance(&a), dec!(70));

    f.db
        .conn
        .execute("UPDATE accounts SET balance = 'oops' WHERE id = ?1", params![b])
        .unwrap();

    let err = f
        .db
        .bulk_delete_transactions(&[first.as_str(), broken.as_str(), last.as_str()])
        .unwrap_err();
    assert!(matches!(err, LedgerError::Storage(_)));

    assert!(f.db.get_transaction(&first).unwrap().is_none());
    assert!(f.db.get_transaction(&broken).unwrap().is_some());
    assert!(f.db.get_transaction(&last).unwrap().is_some());
    assert_eq!(f.balance(&a), dec!(80));
}

// ── Audit / repair ───────────────────────────────────────────

#[test]
fn test_repair_fixes_drift() {
    let mut f = fixture();
    let a = f.a.clone();
    f.expense(dec!(30), &a);
    f.income(dec!(5), &a);
    f.db
        .conn
        .execute("UPDATE accounts SET balance = '999' WHERE id = ?1", params![a])
        .unwrap();

    let drift = f.db.audit_balances().unwrap();
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].account_id, a);
    assert_eq!(drift[0].stored, dec!(999));
    assert_eq!(drift[0].expected, dec!(75));

    let repaired = f.db.repair_balances().unwrap();
    assert_eq!(repaired, drift);
    assert_eq!(f.balance(&a), dec!(75));
    f.assert_consistent();
    assert!(f.db.repair_balances().unwrap().is_empty());
}

#[test]
fn test_initial_balance_change_keeps_history() {
    let mut f = fixture();
    let a = f.a.clone();
    f.expense(dec!(30), &a);
    let patch = AccountPatch {
        initial_balance: Some(dec!(150)),
        ..Default::default()
    };
    f.db.update_account(&a, &patch).unwrap();
    assert_eq!(f.balance(&a), dec!(120));
    f.assert_consistent();
}

#[test]
fn test_mixed_sequence_stays_consistent() {
    let mut f = fixture();
    let (a, b) = (f.a.clone(), f.b.clone());
    let t1 = f.income(dec!(1000), &a);
    let t2 = f.expense(dec!(250.50), &a);
    let t3 = f.expense(dec!(19.99), &b);
    f.db
        .update_transaction(
            &t2,
            &TransactionPatch {
                account_id: Some(b.clone()),
                amount: Some(dec!(200)),
                ..Default::default()
            },
        )
        .unwrap();
    f.db.delete_transaction(&t3).unwrap();
    f.db
        .update_transaction(
            &t1,
            &TransactionPatch {
                kind: Some(TransactionType::Expense),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(f.balance(&a), dec!(-900));
    assert_eq!(f.balance(&b), dec!(-200));
    f.assert_consistent();
}
