//! Refit the model weights from a labeled corpus (`retrain` CLI command),
//! mirroring `scripts/retrain_classifier.py`'s shape: read labeled
//! examples, fit, write the weights file, report metrics — without
//! carrying over `scikit-learn` itself.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::features::{dedupe_consecutive_tokens, extract_features};
use crate::model::{model_input, LogisticModel};

/// One row of a labeled training corpus (CSV/JSONL, one per line).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledExample {
    pub text: String,
    pub is_job: bool,
}

/// Precision/recall/F1 over a held-out (or training) set, printed by the
/// `retrain` CLI after a fit the same way the original script reports
/// accuracy after retraining.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Fit a logistic-regression weight vector via full-batch gradient
/// descent over the handcrafted + hashed-bow feature vectors. No
/// randomness in initialization: weights start at zero, which is the
/// standard (and workspace-dependency-friendly, since there is no `rand`
/// crate here) starting point for a convex loss like logistic cross-entropy.
pub fn train(examples: &[LabeledExample], epochs: usize, learning_rate: f64) -> LogisticModel {
    let mut model = LogisticModel::zeroed();
    if examples.is_empty() {
        return model;
    }

    let vectors: Vec<Vec<f64>> = examples
        .iter()
        .map(|e| {
            let normalized = dedupe_consecutive_tokens(&e.text);
            let features = extract_features(&normalized);
            model_input(&features, &normalized)
        })
        .collect();
    let labels: Vec<f64> = examples.iter().map(|e| if e.is_job { 1.0 } else { 0.0 }).collect();
    let n = examples.len() as f64;

    for epoch in 0..epochs {
        let mut weight_grad = vec![0.0_f64; model.weights.len()];
        let mut bias_grad = 0.0_f64;

        for (vector, label) in vectors.iter().zip(labels.iter()) {
            let prediction = model.predict_proba(vector);
            let error = prediction - label;
            for (g, x) in weight_grad.iter_mut().zip(vector.iter()) {
                *g += error * x;
            }
            bias_grad += error;
        }

        for (w, g) in model.weights.iter_mut().zip(weight_grad.iter()) {
            *w -= learning_rate * (g / n);
        }
        model.bias -= learning_rate * (bias_grad / n);

        if epoch % 50 == 0 || epoch + 1 == epochs {
            let metrics = evaluate(&model, examples);
            info!(epoch, accuracy = metrics.accuracy, f1 = metrics.f1, "retrain progress");
        }
    }

    model
}

/// Score `model` against `examples`, using a 0.5 decision threshold.
pub fn evaluate(model: &LogisticModel, examples: &[LabeledExample]) -> Metrics {
    if examples.is_empty() {
        return Metrics::default();
    }

    let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);
    for example in examples {
        let normalized = dedupe_consecutive_tokens(&example.text);
        let features = extract_features(&normalized);
        let vector = model_input(&features, &normalized);
        let predicted = sigmoid_decision(model.predict_proba(&vector));
        match (predicted, example.is_job) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, false) => tn += 1,
            (false, true) => fn_ += 1,
        }
    }

    let total = (tp + fp + tn + fn_) as f64;
    let accuracy = if total > 0.0 { (tp + tn) as f64 / total } else { 0.0 };
    let precision = if tp + fp > 0 { tp as f64 / (tp + fp) as f64 } else { 0.0 };
    let recall = if tp + fn_ > 0 { tp as f64 / (tp + fn_) as f64 } else { 0.0 };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    Metrics { accuracy, precision, recall, f1 }
}

fn sigmoid_decision(probability: f64) -> bool {
    probability >= 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<LabeledExample> {
        vec![
            LabeledExample {
                text: "We are hiring a Backend Engineer, 3-5 years python sql experience. \
                    Apply here: https://acme.co/apply"
                    .to_string(),
                is_job: true,
            },
            LabeledExample {
                text: "Happy birthday! Wishing you all the best, congratulations on your big day."
                    .to_string(),
                is_job: false,
            },
            LabeledExample {
                text: "Acme is hiring a Data Scientist with sql and python skills. Email resume to hr@acme.com"
                    .to_string(),
                is_job: true,
            },
            LabeledExample {
                text: "Good morning everyone, hope you have a wonderful and blessed day today."
                    .to_string(),
                is_job: false,
            },
        ]
    }

    #[test]
    fn train_improves_accuracy_over_zeroed_model() {
        let examples = corpus();
        let before = evaluate(&LogisticModel::zeroed(), &examples);
        let model = train(&examples, 200, 0.5);
        let after = evaluate(&model, &examples);
        assert!(after.accuracy >= before.accuracy);
    }

    #[test]
    fn evaluate_on_empty_corpus_is_zeroed() {
        let metrics = evaluate(&LogisticModel::zeroed(), &[]);
        assert_eq!(metrics.accuracy, 0.0);
    }
}
