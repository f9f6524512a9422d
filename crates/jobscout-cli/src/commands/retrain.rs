//! `retrain` — refit the classifier's weight vector from a labeled JSONL
//! corpus and overwrite the model file the `process` command loads.

use std::fs;
use std::path::Path;

use jobscout_classifier::{evaluate, train, LabeledExample};
use jobscout_core::config::JobScoutConfig;
use tracing::info;

pub fn run(config: &JobScoutConfig, corpus_path: &str, epochs: usize, learning_rate: f64) -> anyhow::Result<()> {
    let body = fs::read_to_string(corpus_path)
        .map_err(|e| anyhow::anyhow!("failed to read training corpus {corpus_path}: {e}"))?;

    let mut examples = Vec::new();
    for (line_no, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let example: LabeledExample = serde_json::from_str(line)
            .map_err(|e| anyhow::anyhow!("{corpus_path}:{}: invalid labeled example: {e}", line_no + 1))?;
        examples.push(example);
    }

    if examples.is_empty() {
        anyhow::bail!("training corpus {corpus_path} contained no labeled examples");
    }

    info!(examples = examples.len(), epochs, learning_rate, "retraining classifier");

    let model = train(&examples, epochs, learning_rate);
    let metrics = evaluate(&model, &examples);

    let model_path = Path::new(&config.classifier.model_path);
    if let Some(parent) = model_path.parent() {
        fs::create_dir_all(parent)?;
    }
    model.save_to_file(model_path)?;

    info!(
        accuracy = metrics.accuracy,
        precision = metrics.precision,
        recall = metrics.recall,
        f1 = metrics.f1,
        path = %model_path.display(),
        "classifier retrained"
    );
    Ok(())
}
