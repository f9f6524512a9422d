use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("account pool error: {0}")]
    Account(#[from] jobscout_accounts::AccountError),

    #[error("channel registry error: {0}")]
    Registry(#[from] jobscout_registry::RegistryError),

    #[error("rate-limit governor error: {0}")]
    Governor(#[from] jobscout_governor::GovernorError),

    #[error("platform client error: {0}")]
    Platform(#[from] jobscout_platform::PlatformError),

    #[error("store error: {0}")]
    Store(#[from] jobscout_store::StoreError),
}

impl WorkerError {
    pub fn code(&self) -> &'static str {
        match self {
            WorkerError::Account(e) => e.code(),
            WorkerError::Registry(e) => e.code(),
            WorkerError::Governor(e) => e.code(),
            WorkerError::Platform(e) => e.code(),
            WorkerError::Store(e) => e.code(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkerError>;
