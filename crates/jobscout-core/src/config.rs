use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

// Tunables named in the scraping pipeline design — defaults mirror the
// thresholds the original scraper used in production.
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_FIRST_FETCH_CAP: usize = 10;
pub const DEFAULT_INCREMENTAL_CAP: usize = 100;
pub const DEFAULT_MAX_JOINS_PER_DAY_PER_ACCOUNT: u32 = 5;
pub const DEFAULT_FLOOD_WAIT_CEILING_SECS: u64 = 60;
pub const DEFAULT_MIN_QUALITY: f64 = 0.3;
pub const DEFAULT_MIN_AI_CONFIDENCE_SCORE: f64 = 0.70;
pub const DEFAULT_SKIP_DUPLICATE_THRESHOLD_HOURS: i64 = 24;
pub const DEFAULT_MIN_RELEVANCE_SCORE: f64 = 0.5;
pub const DEFAULT_DEDUP_WINDOW_HOURS: i64 = 48;
pub const DEFAULT_CHANNEL_SCORE_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_CHANNEL_HEALTH_THRESHOLD: f64 = 30.0;
pub const DEFAULT_CHANNEL_DEMOTE_AFTER_WINDOWS: u32 = 3;

/// Top-level config (jobscout.toml + JOBSCOUT_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobScoutConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub accounts: AccountsConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Default for JobScoutConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            accounts: AccountsConfig::default(),
            scraper: ScraperConfig::default(),
            extractor: ExtractorConfig::default(),
            quality: QualityConfig::default(),
            scheduler: SchedulerConfig::default(),
            classifier: ClassifierConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Tunables for the deduper and channel scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_dedup_window_hours")]
    pub dedup_window_hours: i64,
    #[serde(default = "default_channel_score_window_days")]
    pub channel_score_window_days: i64,
    #[serde(default = "default_channel_health_threshold")]
    pub channel_health_threshold: f64,
    #[serde(default = "default_channel_demote_after_windows")]
    pub channel_demote_after_windows: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dedup_window_hours: DEFAULT_DEDUP_WINDOW_HOURS,
            channel_score_window_days: DEFAULT_CHANNEL_SCORE_WINDOW_DAYS,
            channel_health_threshold: DEFAULT_CHANNEL_HEALTH_THRESHOLD,
            channel_demote_after_windows: DEFAULT_CHANNEL_DEMOTE_AFTER_WINDOWS,
        }
    }
}

fn default_dedup_window_hours() -> i64 {
    DEFAULT_DEDUP_WINDOW_HOURS
}
fn default_channel_score_window_days() -> i64 {
    DEFAULT_CHANNEL_SCORE_WINDOW_DAYS
}
fn default_channel_health_threshold() -> f64 {
    DEFAULT_CHANNEL_HEALTH_THRESHOLD
}
fn default_channel_demote_after_windows() -> u32 {
    DEFAULT_CHANNEL_DEMOTE_AFTER_WINDOWS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_relational_path")]
    pub relational_path: String,
    #[serde(default = "default_documents_path")]
    pub documents_path: String,
    #[serde(default = "default_channels_path")]
    pub channels_path: String,
    #[serde(default = "default_accounts_path")]
    pub accounts_path: String,
    #[serde(default = "default_sessions_dir")]
    pub sessions_dir: String,
    #[serde(default = "default_scheduler_path")]
    pub scheduler_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            relational_path: default_relational_path(),
            documents_path: default_documents_path(),
            channels_path: default_channels_path(),
            accounts_path: default_accounts_path(),
            sessions_dir: default_sessions_dir(),
            scheduler_path: default_scheduler_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    #[serde(default = "default_max_joins")]
    pub max_joins_per_day_per_account: u32,
    #[serde(default = "default_lease_secs")]
    pub lease_timeout_secs: u64,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            max_joins_per_day_per_account: DEFAULT_MAX_JOINS_PER_DAY_PER_ACCOUNT,
            lease_timeout_secs: default_lease_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_first_fetch_cap")]
    pub first_fetch_cap: usize,
    #[serde(default = "default_incremental_cap")]
    pub incremental_cap: usize,
    #[serde(default = "default_flood_wait_ceiling")]
    pub flood_wait_ceiling_secs: u64,
    /// Working-hours window, local to `timezone`, as 24h hour-of-day bounds.
    #[serde(default = "default_working_hours_start")]
    pub working_hours_start: u32,
    #[serde(default = "default_working_hours_end")]
    pub working_hours_end: u32,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            first_fetch_cap: DEFAULT_FIRST_FETCH_CAP,
            incremental_cap: DEFAULT_INCREMENTAL_CAP,
            flood_wait_ceiling_secs: DEFAULT_FLOOD_WAIT_CEILING_SECS,
            working_hours_start: default_working_hours_start(),
            working_hours_end: default_working_hours_end(),
            timezone: default_timezone(),
        }
    }
}

impl ScraperConfig {
    /// Parsed `timezone`, falling back to the default deployment timezone
    /// on a bad config value. This is the single timezone the working-hours
    /// gate and the account pool's daily-join reset both measure "day"
    /// against, so the two never disagree on where a calendar day ends.
    pub fn timezone(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or(chrono_tz::Asia::Kolkata)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_min_confidence")]
    pub min_extraction_confidence: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_extraction_confidence: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    #[serde(default = "default_min_quality")]
    pub min_quality: f64,
    #[serde(default = "default_min_ai_confidence")]
    pub min_ai_confidence_score: f64,
    #[serde(default = "default_skip_duplicate_hours")]
    pub skip_duplicate_threshold_hours: i64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_quality: DEFAULT_MIN_QUALITY,
            min_ai_confidence_score: DEFAULT_MIN_AI_CONFIDENCE_SCORE,
            skip_duplicate_threshold_hours: DEFAULT_SKIP_DUPLICATE_THRESHOLD_HOURS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    #[serde(default = "default_batch_every_mins")]
    pub batch_every_mins: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            batch_every_mins: default_batch_every_mins(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_model_path")]
    pub model_path: String,
    #[serde(default = "default_non_job_dominant_threshold")]
    pub non_job_dominant_confidence: f64,
    #[serde(default = "default_strong_signal_threshold")]
    pub strong_job_signal_confidence: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            non_job_dominant_confidence: default_non_job_dominant_threshold(),
            strong_job_signal_confidence: default_strong_signal_threshold(),
        }
    }
}

fn default_model_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobscout/classifier_model.json", home)
}
fn default_non_job_dominant_threshold() -> f64 {
    0.9
}
fn default_strong_signal_threshold() -> f64 {
    0.95
}

fn default_relational_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobscout/jobscout.db", home)
}
fn default_documents_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobscout/raw_messages.db", home)
}
fn default_channels_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobscout/channels.db", home)
}
fn default_accounts_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobscout/accounts.db", home)
}
fn default_sessions_dir() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobscout/sessions", home)
}
fn default_scheduler_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobscout/scheduler.db", home)
}
fn default_max_joins() -> u32 {
    DEFAULT_MAX_JOINS_PER_DAY_PER_ACCOUNT
}
fn default_lease_secs() -> u64 {
    300
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_first_fetch_cap() -> usize {
    DEFAULT_FIRST_FETCH_CAP
}
fn default_incremental_cap() -> usize {
    DEFAULT_INCREMENTAL_CAP
}
fn default_flood_wait_ceiling() -> u64 {
    DEFAULT_FLOOD_WAIT_CEILING_SECS
}
fn default_working_hours_start() -> u32 {
    9
}
fn default_working_hours_end() -> u32 {
    21
}
fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}
fn default_min_confidence() -> f64 {
    0.3
}
fn default_min_quality() -> f64 {
    DEFAULT_MIN_QUALITY
}
fn default_min_ai_confidence() -> f64 {
    DEFAULT_MIN_AI_CONFIDENCE_SCORE
}
fn default_skip_duplicate_hours() -> i64 {
    DEFAULT_SKIP_DUPLICATE_THRESHOLD_HOURS
}
fn default_tick_interval() -> u64 {
    1
}
fn default_batch_every_mins() -> u64 {
    30
}

impl JobScoutConfig {
    /// Load config from a TOML file with JOBSCOUT_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.jobscout/jobscout.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: JobScoutConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("JOBSCOUT_").split("_"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobscout/jobscout.toml", home)
}
