use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account not found: {0}")]
    NotFound(i64),

    #[error("account {0} is already leased")]
    AlreadyLeased(i64),

    #[error("account {0} is banned")]
    Banned(i64),

    #[error("account {0} has reached its daily join quota")]
    JoinQuotaExceeded(i64),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl AccountError {
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::NotFound(_) => "ACCOUNT_NOT_FOUND",
            AccountError::AlreadyLeased(_) => "ACCOUNT_ALREADY_LEASED",
            AccountError::Banned(_) => "ACCOUNT_BANNED",
            AccountError::JoinQuotaExceeded(_) => "JOIN_QUOTA_EXCEEDED",
            AccountError::Database(_) => "DATABASE_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, AccountError>;
