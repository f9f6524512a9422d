use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("store error: {0}")]
    Store(#[from] jobscout_store::StoreError),

    #[error("registry error: {0}")]
    Registry(#[from] jobscout_registry::RegistryError),

    #[error("transaction conflict after {attempts} attempts")]
    TransactionConflict { attempts: u32 },
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Store(e) => e.code(),
            PipelineError::Registry(e) => e.code(),
            PipelineError::TransactionConflict { .. } => "TRANSACTION_CONFLICT",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
