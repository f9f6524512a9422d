use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use chrono_tz::Tz;
use dashmap::DashMap;
use jobscout_core::types::{Account, AccountId, HealthStatus};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{instrument, warn};

use crate::db;
use crate::error::{AccountError, Result};

/// Kind of failure reported against an account, distinguishing errors that
/// should count toward the consecutive-error health transition from those
/// that shouldn't (e.g. a rate-limit is the governor's concern, not a sign
/// the account itself is unhealthy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Generic transport/auth/API failure — counts toward degraded/banned.
    Operational,
    /// Platform issued an explicit ban signal — immediate terminal state.
    Banned,
}

/// An exclusive, time-bounded hold on an account. Dropping the guard (or
/// letting the lease expire) releases it; a process crash releases the
/// lease at its deadline since the deadline, not the guard, is what other
/// callers consult.
pub struct AccountLease<'a> {
    pool: &'a AccountPool,
    account_id: AccountId,
}

impl Drop for AccountLease<'_> {
    fn drop(&mut self) {
        self.pool.leases.remove(&self.account_id);
    }
}

/// Tracks session credentials, health, and per-account daily join/fetch
/// quotas for the fleet of platform accounts the scraper drives.
///
/// Persisted state (health, counters) lives in SQLite behind a `Mutex`;
/// the in-process lease table is a `DashMap` of account id to lease
/// deadline, so two workers can never drive the same account
/// concurrently without contending on a single global lock.
pub struct AccountPool {
    db: Mutex<Connection>,
    leases: DashMap<AccountId, Instant>,
    max_joins_per_day: u32,
    /// Timezone the "daily" in daily-join quota is measured against — the
    /// same timezone the Batcher's working-hours window uses, so a
    /// deployment has one definition of "day" everywhere.
    timezone: Tz,
}

impl AccountPool {
    pub fn new(conn: Connection, max_joins_per_day: u32, timezone: Tz) -> Result<Self> {
        db::init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
            leases: DashMap::new(),
            max_joins_per_day,
            timezone,
        })
    }

    /// Acquire an exclusive lease on `account_id` valid for `lease_ttl`.
    /// Fails if the account is banned, not found, or already leased by a
    /// live (non-expired) holder.
    #[instrument(skip(self), fields(account_id))]
    pub fn acquire(&self, account_id: AccountId, lease_ttl: Duration) -> Result<AccountLease<'_>> {
        let account = self.get(account_id)?.ok_or(AccountError::NotFound(account_id))?;
        if account.is_banned || account.health_status == HealthStatus::Banned {
            return Err(AccountError::Banned(account_id));
        }

        let now = Instant::now();
        let deadline = now + lease_ttl;
        let mut acquired = false;
        self.leases
            .entry(account_id)
            .and_modify(|existing| {
                if *existing <= now {
                    *existing = deadline;
                    acquired = true;
                }
            })
            .or_insert_with(|| {
                acquired = true;
                deadline
            });

        if !acquired {
            return Err(AccountError::AlreadyLeased(account_id));
        }

        Ok(AccountLease {
            pool: self,
            account_id,
        })
    }

    /// Reset the consecutive-error counter and bump `last_used_at`/
    /// `last_successful_fetch_at`. Degraded accounts recover to healthy.
    #[instrument(skip(self), fields(account_id))]
    pub fn report_success(&self, account_id: AccountId) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        let changed = db.execute(
            "UPDATE accounts SET
                consecutive_errors = 0,
                health_status = CASE WHEN health_status = 'degraded' THEN 'healthy' ELSE health_status END,
                last_used_at = ?1,
                last_successful_fetch_at = ?1
             WHERE id = ?2",
            params![now, account_id],
        )?;
        if changed == 0 {
            return Err(AccountError::NotFound(account_id));
        }
        Ok(())
    }

    /// Record a failure. `Operational` failures increment the consecutive
    /// error count and transition healthy -> degraded at the 3rd one.
    /// `Banned` transitions straight to the terminal banned state and
    /// deactivates the account.
    #[instrument(skip(self, message), fields(account_id, ?kind))]
    pub fn report_error(&self, account_id: AccountId, kind: ErrorKind, message: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();

        match kind {
            ErrorKind::Banned => {
                let changed = db.execute(
                    "UPDATE accounts SET
                        health_status = 'banned',
                        is_banned = 1,
                        is_active = 0,
                        last_error_message = ?1,
                        last_error_at = ?2
                     WHERE id = ?3",
                    params![message, now, account_id],
                )?;
                if changed == 0 {
                    return Err(AccountError::NotFound(account_id));
                }
                warn!(account_id, "account banned");
            }
            ErrorKind::Operational => {
                let current: Option<(u32, String)> = db
                    .query_row(
                        "SELECT consecutive_errors, health_status FROM accounts WHERE id = ?1",
                        params![account_id],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;
                let (errors, status) = current.ok_or(AccountError::NotFound(account_id))?;
                let new_errors = errors + 1;
                let new_status = if status == "healthy" && new_errors >= 3 {
                    "degraded"
                } else {
                    status.as_str()
                };
                db.execute(
                    "UPDATE accounts SET
                        consecutive_errors = ?1,
                        health_status = ?2,
                        last_error_message = ?3,
                        last_error_at = ?4
                     WHERE id = ?5",
                    params![new_errors, new_status, message, now, account_id],
                )?;
            }
        }
        Ok(())
    }

    /// Whether `account_id` may join another channel today, resetting the
    /// daily counter if the stored reset timestamp has rolled past.
    #[instrument(skip(self), fields(account_id))]
    pub fn can_join_today(&self, account_id: AccountId) -> Result<bool> {
        let account = self.get(account_id)?.ok_or(AccountError::NotFound(account_id))?;
        let joins = self.reset_daily_joins_if_needed(account_id, &account)?;
        Ok(joins < self.max_joins_per_day)
    }

    /// Record that `account_id` joined a channel, incrementing its daily
    /// counter and `last_join_at`.
    #[instrument(skip(self), fields(account_id))]
    pub fn record_join(&self, account_id: AccountId) -> Result<()> {
        let account = self.get(account_id)?.ok_or(AccountError::NotFound(account_id))?;
        let joins = self.reset_daily_joins_if_needed(account_id, &account)?;
        if joins >= self.max_joins_per_day {
            return Err(AccountError::JoinQuotaExceeded(account_id));
        }
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "UPDATE accounts SET daily_joins = daily_joins + 1, last_join_at = ?1 WHERE id = ?2",
            params![now, account_id],
        )?;
        Ok(())
    }

    pub fn get(&self, account_id: AccountId) -> Result<Option<Account>> {
        let db = self.db.lock().unwrap();
        let row = db
            .query_row(
                "SELECT id, api_id, api_hash, is_active, is_banned, health_status,
                        consecutive_errors, last_used_at, last_join_at, daily_joins,
                        daily_joins_reset_at, last_successful_fetch_at, last_error_message,
                        last_error_at
                 FROM accounts WHERE id = ?1",
                params![account_id],
                row_to_account,
            )
            .optional()?;
        Ok(row)
    }

    pub fn list_active(&self) -> Result<Vec<Account>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, api_id, api_hash, is_active, is_banned, health_status,
                    consecutive_errors, last_used_at, last_join_at, daily_joins,
                    daily_joins_reset_at, last_successful_fetch_at, last_error_message,
                    last_error_at
             FROM accounts WHERE is_active = 1 AND is_banned = 0
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], row_to_account)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Day-boundary reset: if `daily_joins_reset_at` is unset or falls on
    /// a prior calendar day in `self.timezone`, zero the counter and stamp
    /// today. Using the configured timezone (rather than UTC) keeps "daily"
    /// meaning one local day, the same day the working-hours gate sees.
    fn reset_daily_joins_if_needed(&self, account_id: AccountId, account: &Account) -> Result<u32> {
        let today = Utc::now().with_timezone(&self.timezone).date_naive();
        let needs_reset = match account.daily_joins_reset_at {
            Some(ts) => ts.with_timezone(&self.timezone).date_naive() < today,
            None => true,
        };
        if !needs_reset {
            return Ok(account.daily_joins);
        }
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "UPDATE accounts SET daily_joins = 0, daily_joins_reset_at = ?1 WHERE id = ?2",
            params![now, account_id],
        )?;
        Ok(0)
    }
}

fn row_to_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let health_str: String = row.get(5)?;
    let last_used: Option<String> = row.get(7)?;
    let last_join: Option<String> = row.get(8)?;
    let reset_at: Option<String> = row.get(10)?;
    let last_fetch: Option<String> = row.get(11)?;
    let last_error_at: Option<String> = row.get(13)?;
    Ok(Account {
        id: row.get(0)?,
        api_id: row.get(1)?,
        api_hash: row.get(2)?,
        is_active: row.get::<_, i64>(3)? != 0,
        is_banned: row.get::<_, i64>(4)? != 0,
        health_status: health_str.parse().unwrap_or(HealthStatus::Healthy),
        consecutive_errors: row.get(6)?,
        last_used_at: last_used.and_then(|s| s.parse().ok()),
        last_join_at: last_join.and_then(|s| s.parse().ok()),
        daily_joins: row.get(9)?,
        daily_joins_reset_at: reset_at.and_then(|s| s.parse().ok()),
        last_successful_fetch_at: last_fetch.and_then(|s| s.parse().ok()),
        last_error_message: row.get(12)?,
        last_error_at: last_error_at.and_then(|s| s.parse().ok()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_account(conn: &Connection, id: i64) {
        conn.execute(
            "INSERT INTO accounts (id, api_id, api_hash) VALUES (?1, 'id', 'hash')",
            params![id],
        )
        .unwrap();
    }

    fn pool_with_account(id: i64) -> AccountPool {
        let conn = Connection::open_in_memory().unwrap();
        db::init_db(&conn).unwrap();
        seed_account(&conn, id);
        AccountPool::new(conn, 5, chrono_tz::Asia::Kolkata).unwrap()
    }

    #[test]
    fn acquire_then_acquire_again_fails_while_held() {
        let pool = pool_with_account(1);
        let lease = pool.acquire(1, Duration::from_secs(60)).unwrap();
        let err = pool.acquire(1, Duration::from_secs(60)).unwrap_err();
        assert_eq!(err.code(), "ACCOUNT_ALREADY_LEASED");
        drop(lease);
        assert!(pool.acquire(1, Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn three_operational_errors_degrade_healthy_account() {
        let pool = pool_with_account(2);
        pool.report_error(2, ErrorKind::Operational, "boom").unwrap();
        pool.report_error(2, ErrorKind::Operational, "boom").unwrap();
        let before = pool.get(2).unwrap().unwrap();
        assert_eq!(before.health_status, HealthStatus::Healthy);
        pool.report_error(2, ErrorKind::Operational, "boom").unwrap();
        let after = pool.get(2).unwrap().unwrap();
        assert_eq!(after.health_status, HealthStatus::Degraded);
        assert_eq!(after.consecutive_errors, 3);
    }

    #[test]
    fn success_resets_counter_and_recovers_from_degraded() {
        let pool = pool_with_account(3);
        for _ in 0..3 {
            pool.report_error(3, ErrorKind::Operational, "boom").unwrap();
        }
        pool.report_success(3).unwrap();
        let account = pool.get(3).unwrap().unwrap();
        assert_eq!(account.health_status, HealthStatus::Healthy);
        assert_eq!(account.consecutive_errors, 0);
    }

    #[test]
    fn ban_signal_deactivates_account() {
        let pool = pool_with_account(4);
        pool.report_error(4, ErrorKind::Banned, "platform ban").unwrap();
        let account = pool.get(4).unwrap().unwrap();
        assert_eq!(account.health_status, HealthStatus::Banned);
        assert!(account.is_banned);
        assert!(!account.is_active);
        assert!(pool.acquire(4, Duration::from_secs(60)).is_err());
    }

    #[test]
    fn join_quota_exhausts_after_max_joins() {
        let pool = pool_with_account(5);
        for _ in 0..5 {
            assert!(pool.can_join_today(5).unwrap());
            pool.record_join(5).unwrap();
        }
        assert!(!pool.can_join_today(5).unwrap());
        assert_eq!(
            pool.record_join(5).unwrap_err().code(),
            "JOIN_QUOTA_EXCEEDED"
        );
    }
}
