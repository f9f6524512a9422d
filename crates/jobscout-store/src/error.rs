use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transaction conflict after {attempts} attempts")]
    TransactionConflict { attempts: u32 },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Database(_) => "DATABASE_ERROR",
            StoreError::Io(_) => "IO_ERROR",
            StoreError::Serialization(_) => "SERIALIZATION_ERROR",
            StoreError::NotFound(_) => "NOT_FOUND",
            StoreError::TransactionConflict { .. } => "TRANSACTION_CONFLICT",
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
