//! Transactional commit of one `JobCandidate`: resolve the
//! company, insert (or collapse into) the canonical `Job` row, flip the
//! originating `RawMessage`'s processing flag, and bump the owning
//! channel's counters.

use std::thread::sleep;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use jobscout_core::types::{Channel, ChannelId, Job, JobCandidate, JobId, Preferences, ProcessingOutcome, RawMessage};
use jobscout_registry::{ChannelRegistry, ScrapeDelta};
use jobscout_store::{companies, jobs, DocumentStore, RelationalStore};
use tracing::{instrument, warn};

use crate::dedupe::Deduper;
use crate::error::{PipelineError, Result};
use crate::quality::{QualityBreakdown, QualityScorer};

const MAX_TXN_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 20;
const JITTER_FRACTION: f64 = 0.10;

/// What happened to one candidate after `Persister::persist` returns.
#[derive(Debug, Clone)]
pub struct PersistOutcome {
    pub job_id: Option<JobId>,
    pub outcome: ProcessingOutcome,
    /// `true` if a new `jobs` row was inserted; `false` if the candidate
    /// collapsed into an existing row within the dedup window.
    pub created_job: bool,
    pub quality_score: f64,
    pub relevance_score: f64,
}

pub struct Persister<'a> {
    relational: &'a RelationalStore,
    documents: &'a DocumentStore,
    registry: &'a ChannelRegistry,
    deduper: Deduper,
    scorer: QualityScorer,
    min_quality: f64,
}

impl<'a> Persister<'a> {
    pub fn new(
        relational: &'a RelationalStore,
        documents: &'a DocumentStore,
        registry: &'a ChannelRegistry,
        dedup_window: Duration,
        min_quality: f64,
    ) -> Self {
        Self {
            relational,
            documents,
            registry,
            deduper: Deduper::new(dedup_window),
            scorer: QualityScorer::new(),
            min_quality,
        }
    }

    /// Commit one extracted candidate. `classifier_confidence` is the
    /// originating message's classification confidence, threaded through
    /// for relevance scoring.
    ///
    /// Never returns `Err` for data-shape reasons — a candidate that fails
    /// quality/relevance gates is still persisted as `is_active = false`
    /// for auditability, exactly as the source system does. `Err`
    /// is reserved for store/registry failures after retry is exhausted.
    #[instrument(skip(self, candidate, prefs), fields(channel = %raw.channel_handle, platform_message_id = raw.platform_message_id))]
    pub fn persist(
        &self,
        raw: &RawMessage,
        channel: &Channel,
        mut candidate: JobCandidate,
        classifier_confidence: f64,
        prefs: &Preferences,
    ) -> Result<PersistOutcome> {
        self.deduper.hash(&mut candidate);
        let now = Utc::now();
        let breakdown = self.scorer.score(&candidate, classifier_confidence, prefs);

        if let Some(existing) = self.deduper.find_collision(self.relational, &candidate.content_hash, now)? {
            // The earlier record stays canonical and absorbs any
            // previously-null fields; the newer candidate still gets its
            // own row, inactive, for audit trail — the same way a
            // low-quality candidate is persisted rather than suppressed.
            self.relational.touch_and_merge_job(
                existing.id,
                now,
                candidate.salary_monthly_inr,
                candidate.location.as_ref().map(|l| l.raw.as_str()),
            )?;
            let duplicate_job_id = self.insert_with_retry(raw, &candidate, &breakdown, false, now)?;
            self.mark_processed(raw, ProcessingOutcome::Duplicate, Some(duplicate_job_id))?;
            self.bump_channel(channel.id, false, false)?;
            return Ok(PersistOutcome {
                job_id: Some(duplicate_job_id),
                outcome: ProcessingOutcome::Duplicate,
                created_job: true,
                quality_score: breakdown.quality_score,
                relevance_score: breakdown.relevance_score,
            });
        }

        let is_active = breakdown.meets_relevance_criteria && breakdown.quality_score >= self.min_quality;

        let job_id = self.insert_with_retry(raw, &candidate, &breakdown, is_active, now)?;

        let outcome = if is_active { ProcessingOutcome::Job } else { ProcessingOutcome::NotAJob };
        self.mark_processed(raw, outcome, Some(job_id))?;
        self.bump_channel(channel.id, is_active, true)?;

        Ok(PersistOutcome {
            job_id: Some(job_id),
            outcome,
            created_job: true,
            quality_score: breakdown.quality_score,
            relevance_score: breakdown.relevance_score,
        })
    }

    /// Resolve-company + insert-job, retried with jittered backoff on a
    /// transaction conflict. Grounded on the jitter helper the channel
    /// manager uses to spread reconnect attempts, applied here to spread
    /// retries when two workers commit against the same SQLite file at once.
    fn insert_with_retry(
        &self,
        raw: &RawMessage,
        candidate: &JobCandidate,
        breakdown: &QualityBreakdown,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<JobId> {
        let company_name = candidate.company_name.as_deref().unwrap_or("Unknown");
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.relational.with_transaction(|tx| {
                let company = companies::resolve_or_create(tx, company_name)?;
                let job = candidate_to_job(candidate, raw, company.id, breakdown, is_active, now);
                jobs::insert(tx, &job)
            });
            match result {
                Ok(id) => return Ok(id),
                Err(err) if attempt < MAX_TXN_ATTEMPTS => {
                    let delay = backoff_with_jitter(attempt);
                    warn!(attempt, error = %err, delay_ms = delay.as_millis() as u64, "job insert failed, retrying");
                    sleep(delay);
                }
                Err(_) => return Err(PipelineError::TransactionConflict { attempts: attempt }),
            }
        }
    }

    fn mark_processed(&self, raw: &RawMessage, outcome: ProcessingOutcome, job_id: Option<JobId>) -> Result<()> {
        self.documents
            .mark_processed(&raw.channel_handle, raw.platform_message_id, outcome, job_id)
            .map_err(PipelineError::Store)
    }

    fn bump_channel(&self, channel_id: ChannelId, is_relevant: bool, is_new_job: bool) -> Result<()> {
        self.registry
            .mark_scraped(
                channel_id,
                None,
                ScrapeDelta {
                    messages_scraped: 0,
                    relevant_jobs_found: is_relevant as u64,
                    jobs_posted: is_new_job as u64,
                },
            )
            .map_err(PipelineError::Registry)
    }
}

fn candidate_to_job(
    candidate: &JobCandidate,
    raw: &RawMessage,
    company_id: jobscout_core::types::CompanyId,
    breakdown: &QualityBreakdown,
    is_active: bool,
    now: DateTime<Utc>,
) -> Job {
    let location = candidate.location.as_ref();
    Job {
        id: 0,
        company_id,
        raw_message_platform_id: raw.platform_message_id,
        raw_message_channel_handle: raw.channel_handle.clone(),
        title: candidate.title.clone(),
        location_raw: location.map(|l| l.raw.clone()),
        cities: location.map(|l| l.cities.clone()).unwrap_or_default(),
        is_remote: location.map(|l| l.is_remote).unwrap_or(false),
        is_hybrid: location.map(|l| l.is_hybrid).unwrap_or(false),
        is_onsite_only: location.map(|l| l.is_onsite_only).unwrap_or(false),
        geographic_scope: location.map(|l| l.geographic_scope).unwrap_or(jobscout_core::types::GeographicScope::Unspecified),
        experience_raw: candidate.experience.raw.clone(),
        experience_min_years: candidate.experience.min_years,
        experience_max_years: candidate.experience.max_years,
        is_fresher: candidate.experience.is_fresher,
        salary_monthly_inr: candidate.salary_monthly_inr,
        skills: candidate.skills.iter().cloned().collect(),
        category: candidate.category,
        apply_url: candidate.apply.url.clone(),
        apply_emails: candidate.apply.emails.clone(),
        apply_phones: candidate.apply.phones.clone(),
        quality_score: breakdown.quality_score,
        relevance_score: breakdown.relevance_score,
        extraction_completeness_score: breakdown.extraction_completeness,
        meets_relevance_criteria: breakdown.meets_relevance_criteria,
        content_hash: candidate.content_hash.clone(),
        is_active,
        created_at: now,
        last_seen_at: now,
    }
}

/// Exponential backoff (base 20 ms, doubling) plus ±10 % jitter, matching
/// the jitter-on-reconnect pattern: a timestamp subsecond-nanos derived
/// offset rather than a `rand` dependency.
fn backoff_with_jitter(attempt: u32) -> Duration {
    let base_ms = BACKOFF_BASE_MS * 2u64.pow(attempt.saturating_sub(1));
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.subsec_nanos()).unwrap_or(0);
    let max_jitter = ((base_ms as f64) * JITTER_FRACTION) as u64;
    let jitter = if max_jitter == 0 { 0 } else { (nanos as u64) % max_jitter };
    Duration::from_millis(base_ms + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_core::types::{ApplyChannel, ChannelStatus, Experience, GeographicScope, JobCategory, LocationBlock};
    use rusqlite::Connection;
    use std::collections::HashSet;

    fn sample_candidate(apply_seed: &str) -> JobCandidate {
        JobCandidate {
            title: Some("Backend Engineer".into()),
            company_name: Some("Acme".into()),
            location: Some(LocationBlock {
                raw: "Bangalore".into(),
                cities: vec!["bangalore".into()],
                is_remote: false,
                is_hybrid: false,
                is_onsite_only: false,
                geographic_scope: GeographicScope::India,
            }),
            experience: Experience { raw: Some("3-5 years".into()), min_years: Some(3.0), max_years: Some(5.0), is_fresher: false },
            salary_monthly_inr: Some(150_000),
            skills: HashSet::from(["python".to_string()]),
            category: JobCategory::Tech,
            apply: ApplyChannel { url: Some(format!("https://acme.co/apply/{apply_seed}")), emails: vec![], phones: vec![] },
            quality_score: 0.0,
            relevance_score: 0.0,
            extraction_confidence: 0.9,
            content_hash: String::new(),
            source_text: "We are hiring a backend engineer at Acme, Bangalore.".into(),
        }
    }

    fn sample_raw(id: i64) -> RawMessage {
        RawMessage {
            platform_message_id: id,
            channel_handle: "jobs_test".into(),
            body: "hiring".into(),
            sender_id: None,
            authored_at: Utc::now(),
            fetched_at: Utc::now(),
            fetching_account_id: 1,
            processed: false,
            processing_outcome: None,
            job_id: None,
        }
    }

    fn harness() -> (RelationalStore, DocumentStore, ChannelRegistry, Channel) {
        let relational = RelationalStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let documents = DocumentStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let registry = ChannelRegistry::new(Connection::open_in_memory().unwrap()).unwrap();
        let channel_id = registry.register("jobs_test", None, None).unwrap();
        registry.assign_account(channel_id, 1).unwrap();
        let channel = registry.get(channel_id).unwrap().unwrap();
        assert_eq!(channel.status, ChannelStatus::Active);
        (relational, documents, registry, channel)
    }

    #[test]
    fn fresh_candidate_is_inserted_active_and_message_marked_job() {
        let (relational, documents, registry, channel) = harness();
        documents.insert(&sample_raw(1)).unwrap();
        let persister = Persister::new(&relational, &documents, &registry, Duration::from_secs(48 * 3600), 0.3);

        let outcome = persister
            .persist(&sample_raw(1), &channel, sample_candidate("a"), 0.9, &Preferences::default())
            .unwrap();

        assert!(outcome.created_job);
        assert_eq!(outcome.outcome, ProcessingOutcome::Job);
        let job = relational.get_job(outcome.job_id.unwrap()).unwrap().unwrap();
        assert!(job.is_active);
        assert_eq!(job.raw_message_platform_id, 1);

        let raw = documents.get("jobs_test", 1).unwrap().unwrap();
        assert!(raw.processed);
        assert_eq!(raw.processing_outcome, Some(ProcessingOutcome::Job));

        let updated_channel = registry.get(channel.id).unwrap().unwrap();
        assert_eq!(updated_channel.total_jobs_posted, 1);
        assert_eq!(updated_channel.relevant_jobs_count, 1);
    }

    #[test]
    fn duplicate_within_window_collapses_and_marks_duplicate() {
        let (relational, documents, registry, channel) = harness();
        documents.insert(&sample_raw(1)).unwrap();
        documents.insert(&sample_raw(2)).unwrap();
        let persister = Persister::new(&relational, &documents, &registry, Duration::from_secs(48 * 3600), 0.3);

        let first = persister
            .persist(&sample_raw(1), &channel, sample_candidate("same"), 0.9, &Preferences::default())
            .unwrap();
        let second = persister
            .persist(&sample_raw(2), &channel, sample_candidate("same"), 0.9, &Preferences::default())
            .unwrap();

        assert!(second.created_job);
        assert_eq!(second.outcome, ProcessingOutcome::Duplicate);
        assert_ne!(second.job_id, first.job_id, "duplicate gets its own audit-trail row");

        let raw2 = documents.get("jobs_test", 2).unwrap().unwrap();
        assert_eq!(raw2.processing_outcome, Some(ProcessingOutcome::Duplicate));
        assert_eq!(raw2.job_id, second.job_id);

        let duplicate_job = relational.get_job(second.job_id.unwrap()).unwrap().unwrap();
        assert!(!duplicate_job.is_active, "duplicate row is never the active one for its hash");

        // Only the earlier row is active, so "at most one is_active row
        // per hash" holds even though both rows persist.
        assert_eq!(relational.count_active_jobs().unwrap(), 1);
    }

    #[test]
    fn excluded_company_persists_job_as_inactive() {
        let (relational, documents, registry, channel) = harness();
        documents.insert(&sample_raw(1)).unwrap();
        let persister = Persister::new(&relational, &documents, &registry, Duration::from_secs(48 * 3600), 0.3);

        let mut prefs = Preferences::default();
        prefs.excluded_companies.push("acme".to_string());

        let outcome = persister.persist(&sample_raw(1), &channel, sample_candidate("x"), 0.9, &prefs).unwrap();
        assert_eq!(outcome.outcome, ProcessingOutcome::NotAJob);
        let job = relational.get_job(outcome.job_id.unwrap()).unwrap().unwrap();
        assert!(!job.is_active);
    }
}
