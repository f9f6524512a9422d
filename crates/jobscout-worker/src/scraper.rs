//! Per-channel fetch loop: acquire the channel's account, wait on
//! the governor, pull new messages, and land them in the document store.

use std::time::Duration;

use chrono::Utc;
use jobscout_accounts::{AccountPool, ErrorKind};
use jobscout_core::types::{Channel, RawMessage};
use jobscout_governor::RateLimitGovernor;
use jobscout_platform::{PlatformClient, PlatformError};
use jobscout_registry::{ChannelRegistry, ScrapeDelta};
use jobscout_store::DocumentStore;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

/// Tunables the scraper loop needs, lifted out of `jobscout_core::config`
/// so this crate doesn't depend on the full config struct.
#[derive(Debug, Clone, Copy)]
pub struct ScraperTunables {
    pub first_fetch_cap: usize,
    pub incremental_cap: usize,
    pub lease_ttl: Duration,
}

/// What happened when scraping one channel. Per-channel failures never
/// propagate as hard errors out of [`scrape_channel`] — the batch keeps
/// moving to the next channel; this is the caller-visible record of why.
#[derive(Debug, Clone)]
pub enum ScrapeOutcome {
    Scraped { messages_fetched: u64 },
    Skipped { reason: &'static str },
    Errored { reason: String },
}

/// Drive one channel through its full fetch cycle. Never returns `Err`:
/// every failure mode here is a channel-level outcome, not a
/// propagated error, so one bad channel can't stall the rest of the batch.
#[instrument(skip(pool, registry, governor, platform, documents, cancel), fields(channel = %channel.handle))]
pub async fn scrape_channel(
    pool: &AccountPool,
    registry: &ChannelRegistry,
    governor: &RateLimitGovernor,
    platform: &dyn PlatformClient,
    documents: &DocumentStore,
    channel: &Channel,
    tunables: ScraperTunables,
    cancel: &mut watch::Receiver<bool>,
) -> ScrapeOutcome {
    let Some(account_id) = channel.assigned_account_id else {
        return ScrapeOutcome::Skipped { reason: "no assigned account" };
    };

    let lease = match pool.acquire(account_id, tunables.lease_ttl) {
        Ok(lease) => lease,
        Err(err) => {
            warn!(account_id, error = %err, "could not lease account, skipping channel");
            return ScrapeOutcome::Skipped { reason: "account lease unavailable" };
        }
    };

    if let Err(err) = governor.wait(account_id, cancel).await {
        info!(account_id, error = %err, "wait cancelled, releasing channel");
        drop(lease);
        return ScrapeOutcome::Skipped { reason: "cancelled" };
    }

    let limit = if channel.last_seen_message_id.is_none() {
        tunables.first_fetch_cap
    } else {
        tunables.incremental_cap
    };

    let fetch_result = platform
        .fetch_history(account_id, &channel.handle, channel.last_seen_message_id, limit)
        .await;

    let messages = match fetch_result {
        Ok(messages) => messages,
        Err(PlatformError::FloodWait { seconds }) => {
            if governor.report_flood_wait(account_id, seconds).is_err() {
                let _ = pool.report_error(account_id, ErrorKind::Operational, "flood-wait ceiling exceeded");
                return ScrapeOutcome::Errored { reason: "rate-limited".to_string() };
            }
            return ScrapeOutcome::Skipped { reason: "flood-wait scheduled for retry" };
        }
        Err(PlatformError::ChannelPrivate) => {
            let _ = registry.deactivate(channel.id, "channel private or inaccessible");
            return ScrapeOutcome::Errored { reason: "channel_private".to_string() };
        }
        Err(PlatformError::UsernameInvalid) => {
            let _ = registry.deactivate(channel.id, "username invalid");
            return ScrapeOutcome::Errored { reason: "username_invalid".to_string() };
        }
        Err(other) => {
            let _ = pool.report_error(account_id, ErrorKind::Operational, &other.to_string());
            return ScrapeOutcome::Errored { reason: other.to_string() };
        }
    };

    // Defensive slice even though the client contract already promises
    // `limit` is honored — matches the original scraper's belt-and-braces cap.
    let messages: Vec<_> = messages.into_iter().take(limit).collect();

    let fetched_at = Utc::now();
    let mut newest_id = channel.last_seen_message_id;
    let mut stored = 0u64;
    for msg in &messages {
        if msg.text.trim().is_empty() {
            continue;
        }
        let raw = RawMessage {
            platform_message_id: msg.message_id,
            channel_handle: channel.handle.clone(),
            body: msg.text.clone(),
            sender_id: msg.sender_id.clone(),
            authored_at: msg.authored_at,
            fetched_at,
            fetching_account_id: account_id,
            processed: false,
            processing_outcome: None,
            job_id: None,
        };
        if let Err(err) = documents.insert(&raw) {
            warn!(channel = %channel.handle, error = %err, "failed to store raw message");
            continue;
        }
        stored += 1;
        newest_id = Some(newest_id.map_or(msg.message_id, |n| n.max(msg.message_id)));
    }

    if let Err(err) = registry.mark_scraped(
        channel.id,
        newest_id,
        ScrapeDelta { messages_scraped: stored, relevant_jobs_found: 0, jobs_posted: 0 },
    ) {
        warn!(channel = %channel.handle, error = %err, "failed to update channel cursor");
    }

    let _ = pool.report_success(account_id);
    drop(lease);

    ScrapeOutcome::Scraped { messages_fetched: stored }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use jobscout_core::types::ChannelStatus;
    use jobscout_platform::types::{PlatformMessage, SessionBlob};
    use jobscout_platform::Result as PlatformResult;
    use rusqlite::Connection;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubClient {
        responses: Vec<PlatformMessage>,
        calls: AtomicUsize,
        flood_wait_seconds: Option<u64>,
    }

    #[async_trait]
    impl PlatformClient for StubClient {
        async fn authenticate(&self, _: i64, _: Option<SessionBlob>) -> PlatformResult<SessionBlob> {
            Ok(SessionBlob(vec![]))
        }

        async fn join_channel(&self, _: i64, _: &str) -> PlatformResult<()> {
            Ok(())
        }

        async fn fetch_history(
            &self,
            _account_id: i64,
            _channel: &str,
            _since: Option<i64>,
            limit: usize,
        ) -> PlatformResult<Vec<PlatformMessage>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(seconds) = self.flood_wait_seconds {
                return Err(PlatformError::FloodWait { seconds });
            }
            Ok(self.responses.iter().take(limit).cloned().collect())
        }
    }

    fn sample_channel(last_seen: Option<i64>) -> Channel {
        Channel {
            id: 1,
            handle: "jobs_test".to_string(),
            title: None,
            category: None,
            is_member: true,
            assigned_account_id: Some(1),
            last_seen_message_id: last_seen,
            last_scraped_at: None,
            total_messages_scraped: 0,
            relevant_jobs_count: 0,
            total_jobs_posted: 0,
            relevance_ratio: 0.0,
            avg_job_quality_score: 0.0,
            health_score: 0.0,
            status: ChannelStatus::Active,
            deactivation_reason: None,
            consecutive_poor_windows: 0,
            last_score_update: None,
        }
    }

    fn setup() -> (AccountPool, ChannelRegistry, RateLimitGovernor, DocumentStore) {
        let accounts_conn = Connection::open_in_memory().unwrap();
        jobscout_accounts::db::init_db(&accounts_conn).unwrap();
        accounts_conn
            .execute("INSERT INTO accounts (id, api_id, api_hash) VALUES (1, 'id', 'hash')", [])
            .unwrap();
        let pool = AccountPool::new(accounts_conn, 5, chrono_tz::Asia::Kolkata).unwrap();

        let registry = ChannelRegistry::new(Connection::open_in_memory().unwrap()).unwrap();
        let id = registry.register("jobs_test", None, None).unwrap();
        registry.assign_account(id, 1).unwrap();

        let governor = RateLimitGovernor::new(Duration::from_millis(1), Duration::from_secs(60));
        let documents = DocumentStore::new(Connection::open_in_memory().unwrap()).unwrap();
        (pool, registry, governor, documents)
    }

    #[tokio::test]
    async fn first_fetch_caps_at_configured_limit() {
        let (pool, registry, governor, documents) = setup();
        let responses: Vec<_> = (1..=20)
            .map(|id| PlatformMessage {
                message_id: id,
                text: format!("hiring for role {id}"),
                sender_id: None,
                authored_at: Utc::now(),
            })
            .collect();
        let client = StubClient { responses, calls: AtomicUsize::new(0), flood_wait_seconds: None };
        let channel = sample_channel(None);
        let (_tx, mut rx) = watch::channel(false);

        let outcome = scrape_channel(
            &pool,
            &registry,
            &governor,
            &client,
            &documents,
            &channel,
            ScraperTunables {
                first_fetch_cap: 10,
                incremental_cap: 100,
                lease_ttl: Duration::from_secs(60),
            },
            &mut rx,
        )
        .await;

        match outcome {
            ScrapeOutcome::Scraped { messages_fetched } => assert_eq!(messages_fetched, 10),
            other => panic!("expected Scraped, got {other:?}"),
        }
        let updated = registry.get(channel.id).unwrap().unwrap();
        assert_eq!(updated.last_seen_message_id, Some(10));
    }

    #[tokio::test]
    async fn flood_wait_over_ceiling_errors_and_continues() {
        let (pool, registry, governor, documents) = setup();
        let client = StubClient { responses: vec![], calls: AtomicUsize::new(0), flood_wait_seconds: Some(9999) };
        let channel = sample_channel(Some(5));
        let (_tx, mut rx) = watch::channel(false);

        let outcome = scrape_channel(
            &pool,
            &registry,
            &governor,
            &client,
            &documents,
            &channel,
            ScraperTunables {
                first_fetch_cap: 10,
                incremental_cap: 100,
                lease_ttl: Duration::from_secs(60),
            },
            &mut rx,
        )
        .await;

        match outcome {
            ScrapeOutcome::Errored { reason } => assert_eq!(reason, "rate-limited"),
            other => panic!("expected Errored, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_assigned_account_is_skipped() {
        let (pool, registry, governor, documents) = setup();
        let client = StubClient { responses: vec![], calls: AtomicUsize::new(0), flood_wait_seconds: None };
        let mut channel = sample_channel(None);
        channel.assigned_account_id = None;
        let (_tx, mut rx) = watch::channel(false);

        let outcome = scrape_channel(
            &pool,
            &registry,
            &governor,
            &client,
            &documents,
            &channel,
            ScraperTunables {
                first_fetch_cap: 10,
                incremental_cap: 100,
                lease_ttl: Duration::from_secs(60),
            },
            &mut rx,
        )
        .await;

        assert!(matches!(outcome, ScrapeOutcome::Skipped { .. }));
    }
}

impl std::fmt::Display for ScrapeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeOutcome::Scraped { messages_fetched } => write!(f, "scraped {messages_fetched} messages"),
            ScrapeOutcome::Skipped { reason } => write!(f, "skipped: {reason}"),
            ScrapeOutcome::Errored { reason } => write!(f, "errored: {reason}"),
        }
    }
}
