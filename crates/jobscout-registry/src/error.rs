use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("channel not found: {0}")]
    NotFound(String),

    #[error("channel {0} already has an assigned account")]
    AlreadyAssigned(i64),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl RegistryError {
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::NotFound(_) => "CHANNEL_NOT_FOUND",
            RegistryError::AlreadyAssigned(_) => "CHANNEL_ALREADY_ASSIGNED",
            RegistryError::Database(_) => "DATABASE_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
