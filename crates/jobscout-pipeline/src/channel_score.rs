//! Periodic channel-health sweep: recompute `relevance_ratio` and
//! `avg_job_quality_score`, derive a clamped `health_score`, and walk the
//! active↔probation↔deactivated state machine.
//!
//! Run as its own `Schedule::Daily` job dispatched through
//! `jobscout-scheduler`, not inline with message processing.

use chrono::Utc;
use jobscout_core::types::{ChannelId, ChannelStatus};
use jobscout_registry::ChannelRegistry;
use jobscout_store::RelationalStore;
use tracing::{info, instrument};

use crate::error::Result;

const WEIGHT_RELEVANCE: f64 = 0.6;
const WEIGHT_QUALITY: f64 = 0.4;

#[derive(Debug, Clone, Copy)]
pub struct ChannelScorerConfig {
    pub window_days: i64,
    pub health_threshold: f64,
    pub demote_after_windows: u32,
}

/// Result of scoring one channel in a sweep.
#[derive(Debug, Clone, Copy)]
pub struct ChannelScoreOutcome {
    pub channel_id: ChannelId,
    pub relevance_ratio: f64,
    pub avg_job_quality_score: f64,
    pub health_score: f64,
    pub status: ChannelStatus,
    pub consecutive_poor_windows: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    pub channels_scored: u32,
    pub moved_to_probation: u32,
    pub recovered_to_active: u32,
    pub deactivated: u32,
    pub outcomes: Vec<ChannelScoreOutcome>,
}

pub struct ChannelScorer {
    config: ChannelScorerConfig,
}

impl ChannelScorer {
    pub fn new(config: ChannelScorerConfig) -> Self {
        Self { config }
    }

    /// Score every non-deactivated channel and apply any resulting status
    /// transition. Deactivated channels are permanently excluded — a
    /// deactivated channel never returns to rotation.
    #[instrument(skip(self, registry, relational))]
    pub fn sweep(&self, registry: &ChannelRegistry, relational: &RelationalStore) -> Result<SweepSummary> {
        let mut summary = SweepSummary::default();
        let since = Utc::now() - chrono::Duration::days(self.config.window_days);

        for channel in registry.all()? {
            if channel.status == ChannelStatus::Deactivated {
                continue;
            }

            let relevance_ratio = channel.relevant_jobs_count as f64 / (channel.total_jobs_posted.max(1)) as f64;
            let recent = relational.recent_jobs_for_channel(&channel.handle, since)?;
            let quality_jobs: Vec<f64> = recent.iter().filter(|j| j.is_active).map(|j| j.quality_score).collect();
            let avg_job_quality_score = if quality_jobs.is_empty() {
                0.0
            } else {
                quality_jobs.iter().sum::<f64>() / quality_jobs.len() as f64
            };
            let health_score = (WEIGHT_RELEVANCE * relevance_ratio * 100.0 + WEIGHT_QUALITY * avg_job_quality_score * 100.0).clamp(0.0, 100.0);

            let mut consecutive_poor_windows = channel.consecutive_poor_windows;
            let mut status = channel.status;

            if health_score < self.config.health_threshold {
                consecutive_poor_windows += 1;
                if status == ChannelStatus::Active {
                    registry.set_status(channel.id, ChannelStatus::Probation)?;
                    status = ChannelStatus::Probation;
                    summary.moved_to_probation += 1;
                }
                if consecutive_poor_windows >= self.config.demote_after_windows {
                    registry.deactivate(channel.id, "low yield")?;
                    status = ChannelStatus::Deactivated;
                    summary.deactivated += 1;
                    info!(channel = %channel.handle, windows = consecutive_poor_windows, "channel deactivated for chronic low yield");
                }
            } else {
                if status == ChannelStatus::Probation {
                    registry.set_status(channel.id, ChannelStatus::Active)?;
                    status = ChannelStatus::Active;
                    summary.recovered_to_active += 1;
                }
                consecutive_poor_windows = 0;
            }

            registry.update_health(channel.id, relevance_ratio, avg_job_quality_score, health_score, consecutive_poor_windows)?;
            summary.channels_scored += 1;

            summary.outcomes.push(ChannelScoreOutcome {
                channel_id: channel.id,
                relevance_ratio,
                avg_job_quality_score,
                health_score,
                status,
                consecutive_poor_windows,
            });
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_core::types::{GeographicScope, Job, JobCategory};
    use rusqlite::Connection;

    fn config() -> ChannelScorerConfig {
        ChannelScorerConfig { window_days: 30, health_threshold: 30.0, demote_after_windows: 3 }
    }

    fn harness() -> (ChannelRegistry, RelationalStore) {
        let registry = ChannelRegistry::new(Connection::open_in_memory().unwrap()).unwrap();
        let relational = RelationalStore::new(Connection::open_in_memory().unwrap()).unwrap();
        (registry, relational)
    }

    fn insert_quality_job(relational: &RelationalStore, channel_handle: &str, quality: f64, hash: &str) {
        let company = relational.resolve_company("Acme").unwrap();
        let now = Utc::now();
        let job = Job {
            id: 0,
            company_id: company.id,
            raw_message_platform_id: 1,
            raw_message_channel_handle: channel_handle.to_string(),
            title: Some("Engineer".into()),
            location_raw: None,
            cities: vec![],
            is_remote: false,
            is_hybrid: false,
            is_onsite_only: false,
            geographic_scope: GeographicScope::Unspecified,
            experience_raw: None,
            experience_min_years: None,
            experience_max_years: None,
            is_fresher: false,
            salary_monthly_inr: None,
            skills: vec![],
            category: JobCategory::Tech,
            apply_url: None,
            apply_emails: vec![],
            apply_phones: vec![],
            quality_score: quality,
            relevance_score: quality,
            extraction_completeness_score: quality,
            meets_relevance_criteria: true,
            content_hash: hash.to_string(),
            is_active: true,
            created_at: now,
            last_seen_at: now,
        };
        relational.insert_job(&job).unwrap();
    }

    #[test]
    fn healthy_channel_stays_active() {
        let (registry, relational) = harness();
        let id = registry.register("jobs-good", None, None).unwrap();
        insert_quality_job(&relational, "jobs-good", 0.9, "h1");
        registry
            .mark_scraped(id, None, jobscout_registry::ScrapeDelta { messages_scraped: 10, relevant_jobs_found: 9, jobs_posted: 9 })
            .unwrap();

        let scorer = ChannelScorer::new(config());
        let summary = scorer.sweep(&registry, &relational).unwrap();
        assert_eq!(summary.channels_scored, 1);
        assert_eq!(summary.moved_to_probation, 0);
        let channel = registry.get(id).unwrap().unwrap();
        assert_eq!(channel.status, ChannelStatus::Active);
    }

    #[test]
    fn zero_quality_jobs_over_three_windows_deactivates_with_low_yield_reason() {
        let (registry, relational) = harness();
        let id = registry.register("jobs-bad", None, None).unwrap();
        registry
            .mark_scraped(id, None, jobscout_registry::ScrapeDelta { messages_scraped: 10, relevant_jobs_found: 0, jobs_posted: 10 })
            .unwrap();

        let scorer = ChannelScorer::new(config());
        scorer.sweep(&registry, &relational).unwrap();
        assert_eq!(registry.get(id).unwrap().unwrap().status, ChannelStatus::Probation);

        scorer.sweep(&registry, &relational).unwrap();
        assert_eq!(registry.get(id).unwrap().unwrap().status, ChannelStatus::Probation);

        let summary = scorer.sweep(&registry, &relational).unwrap();
        let channel = registry.get(id).unwrap().unwrap();
        assert_eq!(channel.status, ChannelStatus::Deactivated);
        assert_eq!(channel.deactivation_reason.as_deref(), Some("low yield"));
        assert_eq!(summary.deactivated, 1);

        // Deactivated channels are excluded from subsequent sweeps and
        // from `active_channels()`.
        let second_summary = scorer.sweep(&registry, &relational).unwrap();
        assert_eq!(second_summary.channels_scored, 0);
        assert!(registry.active_channels().unwrap().is_empty());
    }

    #[test]
    fn recovering_channel_returns_to_active_from_probation() {
        let (registry, relational) = harness();
        let id = registry.register("jobs-recovering", None, None).unwrap();
        registry
            .mark_scraped(id, None, jobscout_registry::ScrapeDelta { messages_scraped: 10, relevant_jobs_found: 0, jobs_posted: 10 })
            .unwrap();

        let scorer = ChannelScorer::new(config());
        scorer.sweep(&registry, &relational).unwrap();
        assert_eq!(registry.get(id).unwrap().unwrap().status, ChannelStatus::Probation);

        insert_quality_job(&relational, "jobs-recovering", 0.95, "h-recover");
        registry
            .mark_scraped(id, None, jobscout_registry::ScrapeDelta { messages_scraped: 5, relevant_jobs_found: 5, jobs_posted: 5 })
            .unwrap();

        scorer.sweep(&registry, &relational).unwrap();
        let channel = registry.get(id).unwrap().unwrap();
        assert_eq!(channel.status, ChannelStatus::Active);
        assert_eq!(channel.consecutive_poor_windows, 0);
    }
}
