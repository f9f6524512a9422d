//! `verify` — a read-only consistency report across the accounts,
//! registry, and relational stores, for operators to run between batches.

use chrono::{Duration as ChronoDuration, Utc};
use jobscout_core::config::JobScoutConfig;
use jobscout_core::types::{ChannelStatus, ScrapeRunStatus};
use tracing::warn;

use crate::context;

/// Scrape runs still `running` after this long are considered stuck
/// (crashed worker, killed process) rather than genuinely in flight.
const STALE_RUN_AFTER_HOURS: i64 = 6;

pub fn run(config: &JobScoutConfig) -> anyhow::Result<()> {
    let relational = context::open_relational(config)?;
    let registry = context::open_registry(config)?;
    let accounts = context::open_accounts(config)?;

    let mut issues = 0u64;

    let duplicates = relational.duplicate_active_content_hashes()?;
    for (content_hash, count) in &duplicates {
        warn!(content_hash, count, "duplicate active jobs share a content hash");
        issues += 1;
    }

    let stale_cutoff = Utc::now() - ChronoDuration::hours(STALE_RUN_AFTER_HOURS);
    for run in relational.recent_scrape_runs(50)? {
        if run.status == ScrapeRunStatus::Running && run.started_at < stale_cutoff {
            warn!(run_id = %run.id, started_at = %run.started_at, "scrape run stuck in running status");
            issues += 1;
        }
    }

    for channel in registry.all()? {
        if channel.status != ChannelStatus::Active {
            continue;
        }
        match channel.assigned_account_id {
            None => {
                warn!(channel = %channel.handle, "active channel has no assigned account");
                issues += 1;
            }
            Some(account_id) => match accounts.get(account_id)? {
                None => {
                    warn!(channel = %channel.handle, account_id, "active channel assigned to unknown account");
                    issues += 1;
                }
                Some(account) if account.is_banned || !account.is_active => {
                    warn!(channel = %channel.handle, account_id, "active channel assigned to banned/inactive account");
                    issues += 1;
                }
                Some(_) => {}
            },
        }
    }

    for account in accounts.list_active()? {
        if !accounts.can_join_today(account.id)? {
            warn!(account_id = account.id, daily_joins = account.daily_joins, "account exhausted its daily join quota");
            issues += 1;
        }
    }

    if issues > 0 {
        anyhow::bail!("verify found {issues} consistency issue(s)");
    }
    tracing::info!("verify found no consistency issues");
    Ok(())
}
