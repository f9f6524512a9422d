//! `score-channels` — run the periodic channel-health sweep on
//! demand, outside its usual once-a-day schedule.

use jobscout_core::config::JobScoutConfig;
use jobscout_pipeline::{ChannelScorer, ChannelScorerConfig};
use tracing::{debug, info};

use crate::context;

pub fn run(config: &JobScoutConfig) -> anyhow::Result<()> {
    let registry = context::open_registry(config)?;
    let relational = context::open_relational(config)?;

    let scorer = ChannelScorer::new(ChannelScorerConfig {
        window_days: config.pipeline.channel_score_window_days,
        health_threshold: config.pipeline.channel_health_threshold,
        demote_after_windows: config.pipeline.channel_demote_after_windows,
    });

    let summary = scorer.sweep(&registry, &relational)?;
    for outcome in &summary.outcomes {
        debug!(
            channel_id = outcome.channel_id,
            health_score = outcome.health_score,
            status = %outcome.status,
            "channel scored"
        );
    }
    info!(
        channels_scored = summary.channels_scored,
        moved_to_probation = summary.moved_to_probation,
        recovered_to_active = summary.recovered_to_active,
        deactivated = summary.deactivated,
        "channel scoring sweep complete"
    );
    Ok(())
}
