use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Small integer account identifier (1..K), matching the fleet-of-accounts model.
pub type AccountId = i64;

/// Surrogate id for a Channel row.
pub type ChannelId = i64;

/// Surrogate id for a Company row.
pub type CompanyId = i64;

/// Surrogate id for a Job row.
pub type JobId = i64;

/// Unique identifier for a ScrapeRun (UUIDv7 — time-sortable for log correlation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScrapeRunId(pub String);

impl ScrapeRunId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScrapeRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScrapeRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation id attached to one batch dispatched by the Batcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub String);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account health state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Degraded,
    Banned,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Banned => write!(f, "banned"),
        }
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "healthy" => Ok(HealthStatus::Healthy),
            "degraded" => Ok(HealthStatus::Degraded),
            "banned" => Ok(HealthStatus::Banned),
            other => Err(format!("unknown health status: {}", other)),
        }
    }
}

/// An authenticated identity on the messaging platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub api_id: String,
    pub api_hash: String,
    pub is_active: bool,
    pub is_banned: bool,
    pub health_status: HealthStatus,
    pub consecutive_errors: u32,
    pub last_used_at: Option<DateTime<Utc>>,
    pub last_join_at: Option<DateTime<Utc>>,
    pub daily_joins: u32,
    pub daily_joins_reset_at: Option<DateTime<Utc>>,
    pub last_successful_fetch_at: Option<DateTime<Utc>>,
    pub last_error_message: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
}

/// Status label a Channel can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    #[default]
    Active,
    Probation,
    Deactivated,
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelStatus::Active => write!(f, "active"),
            ChannelStatus::Probation => write!(f, "probation"),
            ChannelStatus::Deactivated => write!(f, "deactivated"),
        }
    }
}

impl std::str::FromStr for ChannelStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(ChannelStatus::Active),
            "probation" => Ok(ChannelStatus::Probation),
            "deactivated" => Ok(ChannelStatus::Deactivated),
            other => Err(format!("unknown channel status: {}", other)),
        }
    }
}

/// A public group-chat channel from which messages are harvested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub handle: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub is_member: bool,
    pub assigned_account_id: Option<AccountId>,
    pub last_seen_message_id: Option<i64>,
    pub last_scraped_at: Option<DateTime<Utc>>,
    pub total_messages_scraped: u64,
    pub relevant_jobs_count: u64,
    pub total_jobs_posted: u64,
    pub relevance_ratio: f64,
    pub avg_job_quality_score: f64,
    pub health_score: f64,
    pub status: ChannelStatus,
    pub deactivation_reason: Option<String>,
    pub consecutive_poor_windows: u32,
    pub last_score_update: Option<DateTime<Utc>>,
}

impl Channel {
    pub fn normalized_handle(handle: &str) -> String {
        handle.trim().trim_start_matches('@').to_lowercase()
    }
}

/// Terminal outcome recorded against a RawMessage once processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingOutcome {
    Job,
    Duplicate,
    NotAJob,
}

impl fmt::Display for ProcessingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingOutcome::Job => write!(f, "job"),
            ProcessingOutcome::Duplicate => write!(f, "duplicate"),
            ProcessingOutcome::NotAJob => write!(f, "not_a_job"),
        }
    }
}

impl std::str::FromStr for ProcessingOutcome {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "job" => Ok(ProcessingOutcome::Job),
            "duplicate" => Ok(ProcessingOutcome::Duplicate),
            "not_a_job" => Ok(ProcessingOutcome::NotAJob),
            other => Err(format!("unknown processing outcome: {}", other)),
        }
    }
}

/// A single platform message persisted verbatim in the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    pub platform_message_id: i64,
    pub channel_handle: String,
    pub body: String,
    pub sender_id: Option<String>,
    pub authored_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
    pub fetching_account_id: AccountId,
    pub processed: bool,
    pub processing_outcome: Option<ProcessingOutcome>,
    pub job_id: Option<JobId>,
}

/// Geographic scope a JobCandidate's location resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeographicScope {
    India,
    International,
    Unspecified,
}

impl fmt::Display for GeographicScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeographicScope::India => write!(f, "india"),
            GeographicScope::International => write!(f, "international"),
            GeographicScope::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// Structured location block attached to a JobCandidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationBlock {
    pub raw: String,
    pub cities: Vec<String>,
    pub is_remote: bool,
    pub is_hybrid: bool,
    pub is_onsite_only: bool,
    pub geographic_scope: GeographicScope,
}

/// Experience requirement parsed from free text.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Experience {
    pub raw: Option<String>,
    pub min_years: Option<f64>,
    pub max_years: Option<f64>,
    pub is_fresher: bool,
}

/// Job category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobCategory {
    Tech,
    Data,
    Design,
    Marketing,
    NonTech,
    Unspecified,
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobCategory::Tech => "tech",
            JobCategory::Data => "data",
            JobCategory::Design => "design",
            JobCategory::Marketing => "marketing",
            JobCategory::NonTech => "non_tech",
            JobCategory::Unspecified => "unspecified",
        };
        write!(f, "{}", s)
    }
}

/// Apply channel extracted from a job section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApplyChannel {
    pub url: Option<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

/// Ephemeral sub-posting extracted from one RawMessage, prior to persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCandidate {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<LocationBlock>,
    pub experience: Experience,
    pub salary_monthly_inr: Option<i64>,
    pub skills: HashSet<String>,
    pub category: JobCategory,
    pub apply: ApplyChannel,
    pub quality_score: f64,
    pub relevance_score: f64,
    pub extraction_confidence: f64,
    pub content_hash: String,
    pub source_text: String,
}

/// Canonical company row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub canonical_name: String,
    pub display_name: String,
    pub is_verified: bool,
}

impl Company {
    /// Case-folded, punctuation-stripped canonicalization.
    pub fn normalize_name(name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        let mut last_was_space = false;
        for c in name.chars() {
            if c.is_alphanumeric() {
                out.extend(c.to_lowercase());
                last_was_space = false;
            } else if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        }
        out.trim().to_string()
    }
}

/// Persisted, deduplicated, scored job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub company_id: CompanyId,
    pub raw_message_platform_id: i64,
    pub raw_message_channel_handle: String,
    pub title: Option<String>,
    pub location_raw: Option<String>,
    pub cities: Vec<String>,
    pub is_remote: bool,
    pub is_hybrid: bool,
    pub is_onsite_only: bool,
    pub geographic_scope: GeographicScope,
    pub experience_raw: Option<String>,
    pub experience_min_years: Option<f64>,
    pub experience_max_years: Option<f64>,
    pub is_fresher: bool,
    pub salary_monthly_inr: Option<i64>,
    pub skills: Vec<String>,
    pub category: JobCategory,
    pub apply_url: Option<String>,
    pub apply_emails: Vec<String>,
    pub apply_phones: Vec<String>,
    pub quality_score: f64,
    pub relevance_score: f64,
    pub extraction_completeness_score: f64,
    pub meets_relevance_criteria: bool,
    pub content_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Status of one ScrapeRun invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeRunStatus {
    Running,
    Success,
    Partial,
    Failed,
}

impl fmt::Display for ScrapeRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScrapeRunStatus::Running => "running",
            ScrapeRunStatus::Success => "success",
            ScrapeRunStatus::Partial => "partial",
            ScrapeRunStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ScrapeRunStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "running" => Ok(ScrapeRunStatus::Running),
            "success" => Ok(ScrapeRunStatus::Success),
            "partial" => Ok(ScrapeRunStatus::Partial),
            "failed" => Ok(ScrapeRunStatus::Failed),
            other => Err(format!("unknown scrape run status: {}", other)),
        }
    }
}

/// Aggregate metrics for one batcher invocation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScrapeRunCounters {
    pub accounts_used: u32,
    pub groups_processed: u32,
    pub messages_fetched: u64,
    pub jobs_extracted: u64,
    pub duplicates_found: u64,
    pub errors_count: u32,
}

/// One end-to-end invocation of the batcher and its workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRun {
    pub id: ScrapeRunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: ScrapeRunStatus,
    pub counters: ScrapeRunCounters,
    pub errors: Vec<String>,
}

/// Admin-configurable filter set driving relevance scoring.
///
/// Field set grounded on the original scraper's job-scraping-preferences
/// schema: job type, experience, location, salary, company, and keyword
/// filters, plus the knobs that bound one run's cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    pub allowed_job_types: Vec<String>,
    pub excluded_job_types: Vec<String>,
    pub min_experience_years: Option<f64>,
    pub max_experience_years: Option<f64>,
    pub accept_unspecified_experience: bool,
    pub preferred_locations: Vec<String>,
    pub allow_all_india: bool,
    pub allow_international: bool,
    pub allowed_work_modes: Vec<String>,
    pub priority_skills: Vec<String>,
    pub excluded_skills: Vec<String>,
    pub min_salary_lpa: Option<f64>,
    pub max_salary_lpa: Option<f64>,
    pub filter_by_salary: bool,
    pub excluded_companies: Vec<String>,
    pub preferred_companies: Vec<String>,
    pub required_keywords: Vec<String>,
    pub excluded_keywords: Vec<String>,
    pub min_ai_confidence_score: f64,
    pub min_relevance_score: f64,
    pub max_messages_per_run: u32,
    pub skip_duplicate_threshold_hours: i64,
    pub is_active: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            allowed_job_types: Vec::new(),
            excluded_job_types: Vec::new(),
            min_experience_years: None,
            max_experience_years: None,
            accept_unspecified_experience: true,
            preferred_locations: Vec::new(),
            allow_all_india: true,
            allow_international: false,
            allowed_work_modes: Vec::new(),
            priority_skills: Vec::new(),
            excluded_skills: Vec::new(),
            min_salary_lpa: None,
            max_salary_lpa: None,
            filter_by_salary: false,
            excluded_companies: Vec::new(),
            preferred_companies: Vec::new(),
            required_keywords: Vec::new(),
            excluded_keywords: Vec::new(),
            min_ai_confidence_score: crate::config::DEFAULT_MIN_AI_CONFIDENCE_SCORE,
            min_relevance_score: crate::config::DEFAULT_MIN_RELEVANCE_SCORE,
            max_messages_per_run: 50,
            skip_duplicate_threshold_hours: crate::config::DEFAULT_SKIP_DUPLICATE_THRESHOLD_HOURS,
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_normalize_strips_punctuation_and_case() {
        assert_eq!(Company::normalize_name("Acme, Inc."), Company::normalize_name("acme inc"));
        assert_eq!(Company::normalize_name("Acme, Inc."), "acme inc");
    }

    #[test]
    fn channel_normalized_handle_strips_at_and_lowercases() {
        assert_eq!(Channel::normalized_handle("@Jobs_Test"), "jobs_test");
        assert_eq!(Channel::normalized_handle(" jobs_test "), "jobs_test");
    }

    #[test]
    fn health_status_round_trips_through_string() {
        use std::str::FromStr;
        assert_eq!(HealthStatus::from_str("degraded").unwrap(), HealthStatus::Degraded);
        assert_eq!(HealthStatus::Banned.to_string(), "banned");
    }
}
