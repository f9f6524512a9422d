//! `jobscout-classifier` — the "is this a job posting?" stage:
//! feature extraction, fast-path rules, and the trained fallback model.

pub mod classifier;
pub mod error;
pub mod features;
pub mod lexicon;
pub mod model;
pub mod training;

pub use classifier::{Classifier, ClassificationResult};
pub use error::{ClassifierError, Result};
pub use features::{extract_features, FeatureSet};
pub use model::LogisticModel;
pub use training::{train, evaluate, LabeledExample, Metrics};
