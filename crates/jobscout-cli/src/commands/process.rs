//! `process` — run Classifier + Extractor + Persister over pending
//! RawMessages, independent of the scraper's own schedule.

use std::path::Path;
use std::time::Duration;

use jobscout_classifier::Classifier;
use jobscout_core::config::JobScoutConfig;
use jobscout_core::types::ProcessingOutcome;
use jobscout_pipeline::Persister;
use tracing::info;

use crate::context;

/// Cap on how many pending messages a single invocation walks, so an
/// operator can run `process` repeatedly against a large backlog without
/// one invocation running unbounded.
pub fn run(config: &JobScoutConfig, limit: usize) -> anyhow::Result<()> {
    let relational = context::open_relational(config)?;
    let documents = context::open_documents(config)?;
    let registry = context::open_registry(config)?;

    let model_path = Path::new(&config.classifier.model_path);
    let classifier = Classifier::load(model_path).map_err(|e| {
        anyhow::anyhow!("classifier model failed to load at {}: {e}", model_path.display())
    })?;

    let prefs = relational.active_preferences()?;
    let persister = Persister::new(
        &relational,
        &documents,
        &registry,
        Duration::from_secs(config.pipeline.dedup_window_hours as u64 * 3600),
        config.quality.min_quality,
    );

    let mut processed = 0usize;
    let mut jobs_extracted = 0usize;
    let mut duplicates = 0usize;
    let mut not_job = 0usize;

    'channels: for channel in registry.all()? {
        let remaining = limit.saturating_sub(processed);
        if remaining == 0 {
            break;
        }
        let pending = documents.unprocessed_for_channel(&channel.handle, remaining)?;
        for raw in pending {
            let classification = classifier.classify(&raw.body);

            if !classification.is_job {
                documents.mark_processed(&channel.handle, raw.platform_message_id, ProcessingOutcome::NotAJob, None)?;
                not_job += 1;
            } else {
                let candidates = jobscout_extractor::extract(&raw.body, &[]);
                if candidates.is_empty() {
                    documents.mark_processed(&channel.handle, raw.platform_message_id, ProcessingOutcome::NotAJob, None)?;
                    not_job += 1;
                } else {
                    for candidate in candidates {
                        let outcome =
                            persister.persist(&raw, &channel, candidate, classification.confidence, &prefs)?;
                        match outcome.outcome {
                            ProcessingOutcome::Job => jobs_extracted += 1,
                            ProcessingOutcome::Duplicate => duplicates += 1,
                            ProcessingOutcome::NotAJob => not_job += 1,
                        }
                    }
                }
            }

            processed += 1;
            if processed >= limit {
                break 'channels;
            }
        }
    }

    info!(processed, jobs_extracted, duplicates, not_job, "process complete");
    Ok(())
}
