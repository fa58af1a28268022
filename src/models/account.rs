use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Serialized with the same names as [`AccountType::as_str`], which is also
/// what the database stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Cash,
    Checking,
    Savings,
    #[serde(rename = "Credit Card")]
    CreditCard,
    Investment,
    Other,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Checking => "Checking",
            Self::Savings => "Savings",
            Self::CreditCard => "Credit Card",
            Self::Investment => "Investment",
            Self::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "cash" => Self::Cash,
            "checking" | "bank" => Self::Checking,
            "savings" => Self::Savings,
            "credit card" | "creditcard" | "credit" => Self::CreditCard,
            "investment" => Self::Investment,
            _ => Self::Other,
        }
    }

    pub fn all() -> &'static [AccountType] {
        &[
            Self::Cash,
            Self::Checking,
            Self::Savings,
            Self::CreditCard,
            Self::Investment,
            Self::Other,
        ]
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account and its running balance.
///
/// `balance` is maintained by the ledger (see [`crate::ledger`]) and is
/// read-only everywhere else: it has no setter and is not part of
/// [`AccountPatch`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub account_type: AccountType,
    pub(crate) balance: Decimal,
    pub initial_balance: Decimal,
    pub icon: String,
    pub color: String,
    pub order: i64,
}

impl Account {
    pub fn balance(&self) -> Decimal {
        self.balance
    }
}

/// Input for creating an account. The starting balance is always
/// `initial_balance`.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub account_type: AccountType,
    pub initial_balance: Decimal,
    pub icon: String,
    pub color: String,
    /// Appended after existing accounts when `None`.
    pub order: Option<i64>,
}

impl NewAccount {
    pub fn new(name: impl Into<String>, account_type: AccountType, initial_balance: Decimal) -> Self {
        Self {
            name: name.into(),
            account_type,
            initial_balance,
            icon: String::new(),
            color: String::new(),
            order: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub initial_balance: Option<Decimal>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub order: Option<i64>,
}
