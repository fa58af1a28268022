use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Some(Self::Income),
            "expense" | "out" => Some(Self::Expense),
            _ => None,
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self, Self::Income)
    }

    /// Signed effect of `amount` on an account balance.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            Self::Income => amount.abs(),
            Self::Expense => -amount.abs(),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Always a positive magnitude; direction comes from `kind`.
    pub amount: Decimal,
    pub category_id: String,
    pub account_id: String,
    /// Format: "YYYY-MM-DD"
    pub date: String,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind.is_income()
    }

    pub fn is_expense(&self) -> bool {
        !self.kind.is_income()
    }

    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

/// Input for recording a new transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub amount: Decimal,
    pub category_id: String,
    pub account_id: String,
    pub date: String,
    pub note: Option<String>,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionType,
        amount: Decimal,
        category_id: impl Into<String>,
        account_id: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount,
            category_id: category_id.into(),
            account_id: account_id.into(),
            date: date.into(),
            note: None,
        }
    }

    pub fn income(
        amount: Decimal,
        category_id: impl Into<String>,
        account_id: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self::new(TransactionType::Income, amount, category_id, account_id, date)
    }

    pub fn expense(
        amount: Decimal,
        category_id: impl Into<String>,
        account_id: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self::new(TransactionType::Expense, amount, category_id, account_id, date)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Partial update for a transaction. `None` leaves a field unchanged;
/// `note: Some(None)` clears the note.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub kind: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub date: Option<String>,
    pub note: Option<Option<String>>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.category_id.is_none()
            && self.account_id.is_none()
            && self.date.is_none()
            && self.note.is_none()
    }
}
