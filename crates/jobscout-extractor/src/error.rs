use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("invalid regex pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl ExtractorError {
    pub fn code(&self) -> &'static str {
        match self {
            ExtractorError::Pattern(_) => "EXTRACTOR_PATTERN_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractorError>;
