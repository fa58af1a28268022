use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" | "auto" => Some(Self::System),
            _ => None,
        }
    }
}

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub default_account_id: Option<String>,
    pub theme: Theme,
    pub currency: String,
    /// Format: "YYYY-MM-DD". Day of the last savings goal refresh.
    pub savings_goals_last_update: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_account_id: None,
            theme: Theme::System,
            currency: "USD".to_string(),
            savings_goals_last_update: None,
        }
    }
}

/// Keys of the settings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    DefaultAccountId,
    Theme,
    Currency,
    SavingsGoalsLastUpdate,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefaultAccountId => "defaultAccountId",
            Self::Theme => "theme",
            Self::Currency => "currency",
            Self::SavingsGoalsLastUpdate => "savingsGoalsLastUpdate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.as_str().eq_ignore_ascii_case(s))
    }

    pub fn all() -> &'static [SettingKey] {
        &[
            Self::DefaultAccountId,
            Self::Theme,
            Self::Currency,
            Self::SavingsGoalsLastUpdate,
        ]
    }
}
