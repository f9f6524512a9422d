//! The classify pipeline: normalize → extract features → fast-path
//! checks → trained model, mirroring `app/ml/sklearn_classifier.py`'s
//! fast-path order (non-job-dominant exit, then strong-job-signal exit,
//! then the model).

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::features::{dedupe_consecutive_tokens, extract_features, FeatureSet};
use crate::model::{model_input, LogisticModel};

const NON_JOB_DOMINANT_CONFIDENCE: f64 = 0.9;
const STRONG_JOB_SIGNAL_CONFIDENCE: f64 = 0.95;
const MODEL_NOT_LOADED_REASON: &str = "model not loaded";

/// Output of one classify call, ready to hand to the Extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub is_job: bool,
    pub confidence: f64,
    pub reason: String,
    pub features: FeatureSet,
    pub processing_time_ms: f64,
}

/// Stateless classification over a loaded model. Constructed once at
/// process start and shared across worker tasks.
pub struct Classifier {
    model: Option<LogisticModel>,
}

impl Classifier {
    /// Load the trained model from `path`. Failing to load is treated as
    /// fatal by the caller: propagate this error out of process startup
    /// rather than falling back silently.
    pub fn load(path: &Path) -> Result<Self> {
        let model = LogisticModel::load_from_file(path)?;
        Ok(Self { model: Some(model) })
    }

    /// A classifier with no model loaded. `classify` on this instance
    /// always returns the `"model not loaded"` fallback; exists so
    /// fast-path behavior is testable independent of a weights file and
    /// so a caller that chooses to degrade gracefully has somewhere to
    /// land instead of panicking mid-batch.
    pub fn unloaded() -> Self {
        Self { model: None }
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let start = Instant::now();
        let normalized = dedupe_consecutive_tokens(text);
        let features = extract_features(&normalized);

        if features.has_non_job_keywords && !features.has_job_keywords {
            return self.finish(features, start, false, NON_JOB_DOMINANT_CONFIDENCE, "non-job keywords dominant");
        }

        if features.has_job_keywords
            && features.has_job_title
            && features.has_tech_skills
            && features.has_application_method
        {
            return self.finish(features, start, true, STRONG_JOB_SIGNAL_CONFIDENCE, "strong job signals");
        }

        let Some(model) = &self.model else {
            return self.finish(features, start, false, 0.0, MODEL_NOT_LOADED_REASON);
        };

        let vector = model_input(&features, &normalized);
        let probability = model.predict_proba(&vector);
        let is_job = probability >= 0.5;
        self.finish(features, start, is_job, probability, "trained model")
    }

    fn finish(
        &self,
        features: FeatureSet,
        start: Instant,
        is_job: bool,
        confidence: f64,
        reason: &str,
    ) -> ClassificationResult {
        ClassificationResult {
            is_job,
            confidence,
            reason: reason.to_string(),
            features,
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_job_dominant_text_short_circuits() {
        let classifier = Classifier::unloaded();
        let result = classifier.classify(
            "Happy birthday! Wishing you all the best on your special day, congratulations.",
        );
        assert!(!result.is_job);
        assert_eq!(result.confidence, NON_JOB_DOMINANT_CONFIDENCE);
        assert_eq!(result.reason, "non-job keywords dominant");
    }

    #[test]
    fn strong_job_signal_short_circuits_even_without_model() {
        let classifier = Classifier::unloaded();
        let text = "We are hiring a Backend Engineer with python experience. \
            Apply here: https://acme.co/apply";
        let result = classifier.classify(text);
        assert!(result.is_job);
        assert_eq!(result.confidence, STRONG_JOB_SIGNAL_CONFIDENCE);
        assert_eq!(result.reason, "strong job signals");
    }

    #[test]
    fn ambiguous_text_without_model_reports_not_loaded() {
        let classifier = Classifier::unloaded();
        let result = classifier.classify("Backend Engineer role available, details inside.");
        assert!(!result.is_job);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.reason, MODEL_NOT_LOADED_REASON);
    }

    #[test]
    fn ambiguous_text_with_model_invokes_scorer() {
        let mut model = LogisticModel::zeroed();
        model.bias = 5.0;
        let classifier = Classifier { model: Some(model) };
        let result = classifier.classify("Backend Engineer role available, details inside.");
        assert_eq!(result.reason, "trained model");
        assert!(result.is_job);
    }
}
