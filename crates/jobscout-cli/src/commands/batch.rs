//! `batch` — one Batcher invocation: partition the active-channel set
//! into fixed-size batches and fan each batch out to its own scraper
//! task, gated by the working-hours window unless `--force`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Timelike, Utc};
use jobscout_accounts::AccountPool;
use jobscout_core::config::JobScoutConfig;
use jobscout_core::types::{AccountId, Channel, ScrapeRunCounters, ScrapeRunStatus};
use jobscout_governor::RateLimitGovernor;
use jobscout_platform::TelegramHttpClient;
use jobscout_registry::ChannelRegistry;
use jobscout_store::DocumentStore;
use jobscout_worker::{scrape_channel, ScrapeOutcome, ScraperTunables};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::context;

/// Floor delay between two calls against the same account. Not
/// operator-configurable today — the governor's ceiling (flood-wait) is.
const GOVERNOR_FLOOR_DELAY: Duration = Duration::from_millis(500);

/// Outcome of one batch, reported back for aggregation once every
/// spawned batch has completed.
struct BatchReport {
    counters: ScrapeRunCounters,
    errors: Vec<String>,
    accounts_used: HashSet<AccountId>,
}

pub async fn run(config: &JobScoutConfig, force: bool) -> anyhow::Result<()> {
    if !force && !within_working_hours(config) {
        info!("outside working-hours window, skipping batch (use --force to override)");
        return Ok(());
    }

    let relational = context::open_relational(config)?;
    let registry = Arc::new(context::open_registry(config)?);
    let accounts = Arc::new(context::open_accounts(config)?);
    let documents = Arc::new(context::open_documents(config)?);
    let governor = Arc::new(RateLimitGovernor::new(
        GOVERNOR_FLOOR_DELAY,
        Duration::from_secs(config.scraper.flood_wait_ceiling_secs),
    ));
    let platform = Arc::new(TelegramHttpClient::new());

    let tunables = ScraperTunables {
        first_fetch_cap: config.scraper.first_fetch_cap,
        incremental_cap: config.scraper.incremental_cap,
        lease_ttl: Duration::from_secs(config.accounts.lease_timeout_secs),
    };

    let run = relational.start_scrape_run()?;

    let active = registry.active_channels()?;
    let batches: Vec<Vec<Channel>> = active
        .chunks(config.scraper.batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect();
    info!(
        channels = active.len(),
        batch_count = batches.len(),
        batch_size = config.scraper.batch_size,
        "dispatching batches"
    );

    // Each batch runs as its own task so batches overlap; within a batch
    // channels are driven one at a time, matching the Scraper Worker's
    // own per-channel loop. We await every batch for aggregate reporting
    // rather than leaving this fire-and-forget.
    let mut handles = Vec::with_capacity(batches.len());
    for (index, batch) in batches.into_iter().enumerate() {
        let registry = Arc::clone(&registry);
        let accounts = Arc::clone(&accounts);
        let documents = Arc::clone(&documents);
        let governor = Arc::clone(&governor);
        let platform = Arc::clone(&platform);
        handles.push(tokio::spawn(async move {
            run_batch(index, batch, registry, accounts, governor, platform, documents, tunables).await
        }));
    }

    let mut counters = ScrapeRunCounters::default();
    let mut errors = Vec::new();
    let mut accounts_used: HashSet<AccountId> = HashSet::new();
    for handle in handles {
        match handle.await {
            Ok(report) => {
                counters.groups_processed += report.counters.groups_processed;
                counters.messages_fetched += report.counters.messages_fetched;
                counters.errors_count += report.counters.errors_count;
                errors.extend(report.errors);
                accounts_used.extend(report.accounts_used);
            }
            Err(join_err) => {
                warn!(error = %join_err, "batch task panicked");
                errors.push(format!("batch task panicked: {join_err}"));
            }
        }
    }
    counters.accounts_used = accounts_used.len() as u32;

    let status = if errors.is_empty() {
        ScrapeRunStatus::Success
    } else if errors.len() < counters.groups_processed as usize {
        ScrapeRunStatus::Partial
    } else {
        ScrapeRunStatus::Failed
    };

    relational.finish_scrape_run(&run.id, status, counters.clone(), &errors)?;
    info!(
        groups_processed = counters.groups_processed,
        messages_fetched = counters.messages_fetched,
        errors_count = counters.errors_count,
        "batch complete"
    );
    Ok(())
}

async fn run_batch(
    index: usize,
    batch: Vec<Channel>,
    registry: Arc<ChannelRegistry>,
    accounts: Arc<AccountPool>,
    governor: Arc<RateLimitGovernor>,
    platform: Arc<TelegramHttpClient>,
    documents: Arc<DocumentStore>,
    tunables: ScraperTunables,
) -> BatchReport {
    let (_cancel_tx, mut cancel_rx) = watch::channel(false);
    let mut report = BatchReport {
        counters: ScrapeRunCounters::default(),
        errors: Vec::new(),
        accounts_used: HashSet::new(),
    };

    for channel in &batch {
        if let Some(account_id) = channel.assigned_account_id {
            report.accounts_used.insert(account_id);
        }

        let outcome = scrape_channel(
            &accounts,
            &registry,
            &governor,
            platform.as_ref(),
            &documents,
            channel,
            tunables,
            &mut cancel_rx,
        )
        .await;

        report.counters.groups_processed += 1;
        match outcome {
            ScrapeOutcome::Scraped { messages_fetched } => {
                report.counters.messages_fetched += messages_fetched;
                info!(batch = index, channel = %channel.handle, messages_fetched, "channel scraped");
            }
            ScrapeOutcome::Skipped { reason } => {
                info!(batch = index, channel = %channel.handle, reason, "channel skipped");
            }
            ScrapeOutcome::Errored { reason } => {
                report.counters.errors_count += 1;
                warn!(batch = index, channel = %channel.handle, reason = %reason, "channel errored");
                report.errors.push(format!("{}: {}", channel.handle, reason));
            }
        }
    }

    report
}

fn within_working_hours(config: &JobScoutConfig) -> bool {
    let local_hour = Utc::now().with_timezone(&config.scraper.timezone()).hour();
    let (start, end) = (config.scraper.working_hours_start, config.scraper.working_hours_end);
    if start <= end {
        (start..end).contains(&local_hour)
    } else {
        local_hour >= start || local_hour < end
    }
}
