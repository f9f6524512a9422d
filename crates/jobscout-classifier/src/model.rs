//! The trained half of the classifier: a calibrated
//! logistic-regression-style scorer over handcrafted features plus a
//! hashed bag-of-words approximation of a fitted TF-IDF vector.
//!
//! No `sklearn`-equivalent crate is in the dependency pack, so the model
//! is a flat weight vector serialized as plain JSON — simple enough to
//! hand-roll the fit step in [`crate::training`] without pulling in an
//! ML framework for one linear model.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};
use crate::features::FeatureSet;

/// Number of buckets in the hashed bag-of-words vector. Fixed so the
/// weight vector has a stable length independent of vocabulary size.
pub const HASH_BUCKETS: usize = 64;

/// Total input dimensionality the model operates on.
pub const MODEL_VECTOR_LEN: usize = FeatureSet::VECTOR_LEN + HASH_BUCKETS;

/// Hash each lowercased word of `text` into one of [`HASH_BUCKETS`]
/// buckets and return a length-normalized frequency vector — a cheap
/// stand-in for a fitted TF-IDF vectorizer that still needs no saved
/// vocabulary, only the bucket count.
pub fn hashed_bow_vector(text: &str) -> Vec<f64> {
    let mut buckets = vec![0.0_f64; HASH_BUCKETS];
    let mut total = 0.0_f64;
    for word in text.split_whitespace() {
        let mut hasher = DefaultHasher::new();
        word.to_lowercase().hash(&mut hasher);
        let bucket = (hasher.finish() as usize) % HASH_BUCKETS;
        buckets[bucket] += 1.0;
        total += 1.0;
    }
    if total > 0.0 {
        for b in buckets.iter_mut() {
            *b /= total;
        }
    }
    buckets
}

/// Concatenate the handcrafted feature vector with the hashed
/// bag-of-words vector, in that order, to produce the model input.
pub fn model_input(features: &FeatureSet, text: &str) -> Vec<f64> {
    let mut v = features.to_vector();
    v.extend(hashed_bow_vector(text));
    debug_assert_eq!(v.len(), MODEL_VECTOR_LEN);
    v
}

/// A calibrated logistic-regression weight vector, fit offline by
/// [`crate::training::train`] and loaded at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogisticModel {
    /// A zero-initialized model — every input maps to probability 0.5.
    /// Used as the starting point for gradient descent, not shipped.
    pub fn zeroed() -> Self {
        Self { weights: vec![0.0; MODEL_VECTOR_LEN], bias: 0.0 }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path).map_err(|source| ClassifierError::ModelIo {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| ClassifierError::ModelParse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let body = serde_json::to_string_pretty(self).map_err(|source| ClassifierError::ModelParse {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, body).map_err(|source| ClassifierError::ModelIo {
            path: path.display().to_string(),
            source,
        })
    }

    /// Probability the input vector is a job posting.
    pub fn predict_proba(&self, vector: &[f64]) -> f64 {
        let z: f64 = self
            .weights
            .iter()
            .zip(vector.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_bow_vector_sums_to_one_when_nonempty() {
        let v = hashed_bow_vector("hiring backend engineer hiring");
        let sum: f64 = v.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(v.len(), HASH_BUCKETS);
    }

    #[test]
    fn hashed_bow_vector_of_empty_text_is_all_zero() {
        let v = hashed_bow_vector("");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn zeroed_model_predicts_point_five() {
        let model = LogisticModel::zeroed();
        let vector = vec![1.0; MODEL_VECTOR_LEN];
        assert!((model.predict_proba(&vector) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut model = LogisticModel::zeroed();
        model.weights[0] = 2.5;
        model.bias = -1.0;
        model.save_to_file(&path).unwrap();
        let loaded = LogisticModel::load_from_file(&path).unwrap();
        assert_eq!(loaded.weights[0], 2.5);
        assert_eq!(loaded.bias, -1.0);
    }

    #[test]
    fn missing_file_is_model_io_error() {
        let err = LogisticModel::load_from_file(Path::new("/nonexistent/model.json")).unwrap_err();
        assert_eq!(err.code(), "CLASSIFIER_MODEL_IO");
    }

    #[test]
    fn malformed_file_is_model_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "not json").unwrap();
        let err = LogisticModel::load_from_file(&path).unwrap_err();
        assert_eq!(err.code(), "CLASSIFIER_MODEL_PARSE");
    }
}
