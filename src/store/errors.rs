use thiserror::Error;

// STORE ERROR
// ================================================================================================

/// Errors generated from the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to decode base64 data: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),
    #[error("unique constraint violated: {0}")]
    ConstraintViolation(String),
    #[error("database-related non-query error: {0}")]
    DatabaseError(String),
    #[error("invalid transaction filter `{0}`")]
    InvalidTransactionFilter(String),
    #[error("migration error: {0}")]
    MigrationError(String),
    #[error("transaction script hash is required")]
    MissingScriptHash,
    #[error("failed to parse data retrieved from the database: {0}")]
    ParsingError(String),
    #[error("failed to retrieve data from the database: {0}")]
    QueryError(String),
}

impl StoreError {
    /// Returns `true` if the error was raised by a uniqueness constraint of the storage engine.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::ConstraintViolation(_))
    }
}
