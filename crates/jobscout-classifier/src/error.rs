use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to read model file at {path}: {source}")]
    ModelIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model weights at {path}: {source}")]
    ModelParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid regex pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl ClassifierError {
    pub fn code(&self) -> &'static str {
        match self {
            ClassifierError::ModelIo { .. } => "CLASSIFIER_MODEL_IO",
            ClassifierError::ModelParse { .. } => "CLASSIFIER_MODEL_PARSE",
            ClassifierError::Pattern(_) => "CLASSIFIER_PATTERN_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
