use std::sync::Mutex;

use chrono::Utc;
use jobscout_core::types::{AccountId, Channel, ChannelId, ChannelStatus};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{instrument, warn};

use crate::db;
use crate::error::{RegistryError, Result};

/// Counters to add on a successful scrape. Always additive — never a
/// read-modify-write at the app layer, so concurrent batches never clobber
/// each other's counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrapeDelta {
    pub messages_scraped: u64,
    pub relevant_jobs_found: u64,
    pub jobs_posted: u64,
}

/// Durable registry of channels: membership, last-seen cursor, owning
/// account, and health status.
///
/// `Channel` rows are exclusively owned here; other components read but
/// never write them directly.
pub struct ChannelRegistry {
    db: Mutex<Connection>,
}

impl ChannelRegistry {
    pub fn new(conn: Connection) -> Result<Self> {
        db::init_db(&conn)?;
        Ok(Self { db: Mutex::new(conn) })
    }

    /// Register a channel by handle if it doesn't already exist.
    /// Idempotent: re-registering an existing handle is a no-op.
    #[instrument(skip(self))]
    pub fn register(&self, handle: &str, title: Option<&str>, category: Option<&str>) -> Result<ChannelId> {
        let normalized = Channel::normalized_handle(handle);
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT OR IGNORE INTO channels (handle, title, category) VALUES (?1, ?2, ?3)",
            params![normalized, title, category],
        )?;
        let id: i64 = db.query_row(
            "SELECT id FROM channels WHERE handle = ?1",
            params![normalized],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn get(&self, channel_id: ChannelId) -> Result<Option<Channel>> {
        let db = self.db.lock().unwrap();
        let row = db
            .query_row(&select_sql("WHERE id = ?1"), params![channel_id], row_to_channel)
            .optional()?;
        Ok(row)
    }

    pub fn get_by_handle(&self, handle: &str) -> Result<Option<Channel>> {
        let normalized = Channel::normalized_handle(handle);
        let db = self.db.lock().unwrap();
        let row = db
            .query_row(&select_sql("WHERE handle = ?1"), params![normalized], row_to_channel)
            .optional()?;
        Ok(row)
    }

    /// Active channels ordered by `(health_score desc, last_scraped_at asc)`
    /// — healthiest first, then least-recently-scraped first, so every
    /// channel gets a fair rotation.
    pub fn active_channels(&self) -> Result<Vec<Channel>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&select_sql(
            "WHERE status = 'active' ORDER BY health_score DESC, last_scraped_at ASC",
        ))?;
        let rows = stmt.query_map([], row_to_channel)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Assign an account to a channel at first join. No-op if the channel
    /// already has an assigned account; reassignment after that point is
    /// an explicit admin action via `reassign`.
    #[instrument(skip(self))]
    pub fn assign_account(&self, channel_id: ChannelId, account_id: AccountId) -> Result<()> {
        let db = self.db.lock().unwrap();
        let existing: Option<AccountId> = db.query_row(
            "SELECT assigned_account_id FROM channels WHERE id = ?1",
            params![channel_id],
            |row| row.get(0),
        )?;
        if existing.is_some() {
            return Err(RegistryError::AlreadyAssigned(channel_id));
        }
        let changed = db.execute(
            "UPDATE channels SET assigned_account_id = ?1, is_member = 1 WHERE id = ?2",
            params![account_id, channel_id],
        )?;
        if changed == 0 {
            return Err(RegistryError::NotFound(channel_id.to_string()));
        }
        Ok(())
    }

    /// Explicit admin reassignment, bypassing the first-join-only rule.
    /// Used to recover a channel whose account was banned and is now on
    /// probation.
    #[instrument(skip(self))]
    pub fn reassign(&self, channel_id: ChannelId, account_id: AccountId) -> Result<()> {
        let db = self.db.lock().unwrap();
        let changed = db.execute(
            "UPDATE channels SET assigned_account_id = ?1, status = 'active' WHERE id = ?2",
            params![account_id, channel_id],
        )?;
        if changed == 0 {
            return Err(RegistryError::NotFound(channel_id.to_string()));
        }
        Ok(())
    }

    /// Move every channel assigned to a banned account to probation until
    /// an admin reassigns it.
    #[instrument(skip(self))]
    pub fn put_account_channels_on_probation(&self, account_id: AccountId) -> Result<u64> {
        let db = self.db.lock().unwrap();
        let changed = db.execute(
            "UPDATE channels SET status = 'probation'
             WHERE assigned_account_id = ?1 AND status = 'active'",
            params![account_id],
        )?;
        if changed > 0 {
            warn!(account_id, channels = changed, "channels moved to probation");
        }
        Ok(changed as u64)
    }

    /// Record a successful scrape: monotonic cursor advance plus additive
    /// counters. `new_last_seen` only moves the cursor forward — a worker
    /// retrying a stale batch can never regress it.
    #[instrument(skip(self))]
    pub fn mark_scraped(
        &self,
        channel_id: ChannelId,
        new_last_seen: Option<i64>,
        delta: ScrapeDelta,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        let changed = db.execute(
            "UPDATE channels SET
                last_seen_message_id = CASE
                    WHEN ?1 IS NULL THEN last_seen_message_id
                    WHEN last_seen_message_id IS NULL THEN ?1
                    WHEN ?1 > last_seen_message_id THEN ?1
                    ELSE last_seen_message_id
                END,
                last_scraped_at = ?2,
                total_messages_scraped = total_messages_scraped + ?3,
                relevant_jobs_count = relevant_jobs_count + ?4,
                total_jobs_posted = total_jobs_posted + ?5
             WHERE id = ?6",
            params![
                new_last_seen,
                now,
                delta.messages_scraped,
                delta.relevant_jobs_found,
                delta.jobs_posted,
                channel_id,
            ],
        )?;
        if changed == 0 {
            return Err(RegistryError::NotFound(channel_id.to_string()));
        }
        Ok(())
    }

    /// Deactivate a channel with a reason (called by the channel scorer
    /// after chronically poor windows).
    #[instrument(skip(self))]
    pub fn deactivate(&self, channel_id: ChannelId, reason: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        let changed = db.execute(
            "UPDATE channels SET status = 'deactivated', deactivation_reason = ?1 WHERE id = ?2",
            params![reason, channel_id],
        )?;
        if changed == 0 {
            return Err(RegistryError::NotFound(channel_id.to_string()));
        }
        Ok(())
    }

    /// Explicit status transition, distinct from `deactivate`: used by the
    /// channel scorer to move a channel between `active` and `probation`
    /// without attaching a deactivation reason.
    #[instrument(skip(self))]
    pub fn set_status(&self, channel_id: ChannelId, status: ChannelStatus) -> Result<()> {
        let db = self.db.lock().unwrap();
        let changed = db.execute(
            "UPDATE channels SET status = ?1 WHERE id = ?2",
            params![status.to_string(), channel_id],
        )?;
        if changed == 0 {
            return Err(RegistryError::NotFound(channel_id.to_string()));
        }
        Ok(())
    }

    /// Update the derived health fields (ratio, quality, score) and reset
    /// or increment the poor-window streak.
    #[instrument(skip(self))]
    pub fn update_health(
        &self,
        channel_id: ChannelId,
        relevance_ratio: f64,
        avg_job_quality_score: f64,
        health_score: f64,
        consecutive_poor_windows: u32,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        let changed = db.execute(
            "UPDATE channels SET
                relevance_ratio = ?1,
                avg_job_quality_score = ?2,
                health_score = ?3,
                consecutive_poor_windows = ?4,
                last_score_update = ?5
             WHERE id = ?6",
            params![
                relevance_ratio,
                avg_job_quality_score,
                health_score,
                consecutive_poor_windows,
                now,
                channel_id,
            ],
        )?;
        if changed == 0 {
            return Err(RegistryError::NotFound(channel_id.to_string()));
        }
        Ok(())
    }

    pub fn all(&self) -> Result<Vec<Channel>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&select_sql(""))?;
        let rows = stmt.query_map([], row_to_channel)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }
}

fn select_sql(suffix: &str) -> String {
    format!(
        "SELECT id, handle, title, category, is_member, assigned_account_id,
                last_seen_message_id, last_scraped_at, total_messages_scraped,
                relevant_jobs_count, total_jobs_posted, relevance_ratio,
                avg_job_quality_score, health_score, status, deactivation_reason,
                consecutive_poor_windows, last_score_update
         FROM channels {suffix}"
    )
}

fn row_to_channel(row: &rusqlite::Row<'_>) -> rusqlite::Result<Channel> {
    let status_str: String = row.get(14)?;
    let last_scraped: Option<String> = row.get(7)?;
    let last_score_update: Option<String> = row.get(17)?;
    Ok(Channel {
        id: row.get(0)?,
        handle: row.get(1)?,
        title: row.get(2)?,
        category: row.get(3)?,
        is_member: row.get::<_, i64>(4)? != 0,
        assigned_account_id: row.get(5)?,
        last_seen_message_id: row.get(6)?,
        last_scraped_at: last_scraped.and_then(|s| s.parse().ok()),
        total_messages_scraped: row.get::<_, i64>(8)? as u64,
        relevant_jobs_count: row.get::<_, i64>(9)? as u64,
        total_jobs_posted: row.get::<_, i64>(10)? as u64,
        relevance_ratio: row.get(11)?,
        avg_job_quality_score: row.get(12)?,
        health_score: row.get(13)?,
        status: status_str.parse().unwrap_or(ChannelStatus::Active),
        deactivation_reason: row.get(15)?,
        consecutive_poor_windows: row.get(16)?,
        last_score_update: last_score_update.and_then(|s| s.parse().ok()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ChannelRegistry {
        let conn = Connection::open_in_memory().unwrap();
        ChannelRegistry::new(conn).unwrap()
    }

    #[test]
    fn register_is_idempotent_and_normalizes_handle() {
        let reg = registry();
        let a = reg.register("@Jobs_India", Some("Jobs India"), None).unwrap();
        let b = reg.register("jobs_india", None, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mark_scraped_never_regresses_cursor() {
        let reg = registry();
        let id = reg.register("jobs", None, None).unwrap();
        reg.mark_scraped(id, Some(100), ScrapeDelta::default()).unwrap();
        reg.mark_scraped(id, Some(50), ScrapeDelta::default()).unwrap();
        let channel = reg.get(id).unwrap().unwrap();
        assert_eq!(channel.last_seen_message_id, Some(100));
    }

    #[test]
    fn mark_scraped_counters_are_additive() {
        let reg = registry();
        let id = reg.register("jobs", None, None).unwrap();
        reg.mark_scraped(
            id,
            Some(1),
            ScrapeDelta {
                messages_scraped: 10,
                relevant_jobs_found: 2,
                jobs_posted: 1,
            },
        )
        .unwrap();
        reg.mark_scraped(
            id,
            Some(2),
            ScrapeDelta {
                messages_scraped: 5,
                relevant_jobs_found: 1,
                jobs_posted: 1,
            },
        )
        .unwrap();
        let channel = reg.get(id).unwrap().unwrap();
        assert_eq!(channel.total_messages_scraped, 15);
        assert_eq!(channel.relevant_jobs_count, 3);
        assert_eq!(channel.total_jobs_posted, 2);
    }

    #[test]
    fn assign_account_only_once() {
        let reg = registry();
        let id = reg.register("jobs", None, None).unwrap();
        reg.assign_account(id, 1).unwrap();
        let err = reg.assign_account(id, 2).unwrap_err();
        assert_eq!(err.code(), "CHANNEL_ALREADY_ASSIGNED");
        let channel = reg.get(id).unwrap().unwrap();
        assert_eq!(channel.assigned_account_id, Some(1));
    }

    #[test]
    fn banned_account_puts_its_channels_on_probation() {
        let reg = registry();
        let a = reg.register("jobs-a", None, None).unwrap();
        let b = reg.register("jobs-b", None, None).unwrap();
        reg.assign_account(a, 9).unwrap();
        reg.assign_account(b, 9).unwrap();
        let moved = reg.put_account_channels_on_probation(9).unwrap();
        assert_eq!(moved, 2);
        assert_eq!(reg.get(a).unwrap().unwrap().status, ChannelStatus::Probation);
        assert!(reg.active_channels().unwrap().is_empty());
    }

    #[test]
    fn set_status_moves_channel_to_probation_and_back() {
        let reg = registry();
        let id = reg.register("jobs", None, None).unwrap();
        reg.set_status(id, ChannelStatus::Probation).unwrap();
        assert_eq!(reg.get(id).unwrap().unwrap().status, ChannelStatus::Probation);
        assert!(reg.active_channels().unwrap().is_empty());
        reg.set_status(id, ChannelStatus::Active).unwrap();
        assert_eq!(reg.active_channels().unwrap().len(), 1);
    }

    #[test]
    fn active_channels_orders_by_health_desc_then_oldest_scraped_first() {
        let reg = registry();
        let a = reg.register("a", None, None).unwrap();
        let b = reg.register("b", None, None).unwrap();
        reg.update_health(a, 0.5, 0.5, 90.0, 0).unwrap();
        reg.update_health(b, 0.5, 0.5, 95.0, 0).unwrap();
        let ordered = reg.active_channels().unwrap();
        assert_eq!(ordered[0].id, b);
        assert_eq!(ordered[1].id, a);
    }
}
