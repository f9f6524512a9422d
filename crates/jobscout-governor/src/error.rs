use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernorError {
    #[error("flood-wait of {seconds}s exceeds the configured ceiling of {ceiling}s")]
    CeilingExceeded { seconds: u64, ceiling: u64 },

    #[error("wait cancelled")]
    Cancelled,
}

impl GovernorError {
    pub fn code(&self) -> &'static str {
        match self {
            GovernorError::CeilingExceeded { .. } => "FLOOD_WAIT_CEILING_EXCEEDED",
            GovernorError::Cancelled => "WAIT_CANCELLED",
        }
    }
}

pub type Result<T> = std::result::Result<T, GovernorError>;
