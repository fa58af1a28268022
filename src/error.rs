/// Errors raised by the ledger engine and its repositories.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Caller input failed validation (non-positive amount, bad name, ...).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Delete blocked because transactions still reference the entity.
    #[error("{entity} {id} is used by {count} transaction(s)")]
    ReferencedEntity {
        entity: &'static str,
        id: String,
        count: i64,
    },

    /// Delete blocked because the entity is seeded system data.
    #[error("{entity} {id} is a system default and cannot be deleted")]
    ProtectedEntity { entity: &'static str, id: String },

    /// Delete blocked because it would remove the last account.
    #[error("Cannot delete the last remaining account")]
    LastAccount,

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Settings encoding error: {0}")]
    Settings(#[from] serde_json::Error),
}

impl LedgerError {
    pub(crate) fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
