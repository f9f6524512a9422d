use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use jobscout_core::types::AccountId;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{instrument, warn};

use crate::error::{GovernorError, Result};

/// Number of recent per-account operations kept for diagnostics.
const LOG_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
struct OpLogEntry {
    at: Instant,
    kind: &'static str,
}

struct AccountState {
    next_allowed: Instant,
    log: VecDeque<OpLogEntry>,
}

impl AccountState {
    fn new() -> Self {
        Self {
            next_allowed: Instant::now(),
            log: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    fn record(&mut self, kind: &'static str) {
        if self.log.len() >= LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(OpLogEntry {
            at: Instant::now(),
            kind,
        });
    }
}

/// Per-account token-bucket-ish rate limiter.
///
/// Tracks a single `next_allowed` instant per account plus a short
/// operation log for diagnostics. `wait` must be called before every
/// outbound platform call; `report_flood_wait` is called when the
/// platform signals a flood-wait and pushes `next_allowed` out.
pub struct RateLimitGovernor {
    accounts: DashMap<AccountId, AccountState>,
    floor_delay: Duration,
    ceiling: Duration,
}

impl RateLimitGovernor {
    pub fn new(floor_delay: Duration, ceiling: Duration) -> Self {
        Self {
            accounts: DashMap::new(),
            floor_delay,
            ceiling,
        }
    }

    /// Block cooperatively until `account_id`'s schedule permits another
    /// call, applying the configured floor inter-operation delay. The wait
    /// is cancellable: if `cancel` fires first, returns
    /// `GovernorError::Cancelled` without advancing `next_allowed`.
    #[instrument(skip(self, cancel), fields(account_id))]
    pub async fn wait(&self, account_id: AccountId, cancel: &mut watch::Receiver<bool>) -> Result<()> {
        let now = Instant::now();
        let next_allowed = {
            let mut state = self.accounts.entry(account_id).or_insert_with(AccountState::new);
            let wait_until = state.next_allowed.max(now + self.floor_delay);
            state.next_allowed = wait_until;
            state.record("wait");
            wait_until
        };

        let remaining = next_allowed.saturating_duration_since(now);
        if remaining.is_zero() {
            return Ok(());
        }

        tokio::select! {
            _ = sleep(remaining) => Ok(()),
            _ = cancel.changed() => {
                if *cancel.borrow() {
                    Err(GovernorError::Cancelled)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Apply a platform flood-wait signal. If `seconds` exceeds the
    /// configured ceiling, returns an error the caller should treat as
    /// "abandon this channel" rather than sleeping it out.
    #[instrument(skip(self), fields(account_id, seconds))]
    pub fn report_flood_wait(&self, account_id: AccountId, seconds: u64) -> Result<()> {
        let ceiling_secs = self.ceiling.as_secs();
        if seconds > ceiling_secs {
            warn!(account_id, seconds, ceiling_secs, "flood-wait exceeds ceiling");
            return Err(GovernorError::CeilingExceeded {
                seconds,
                ceiling: ceiling_secs,
            });
        }
        let mut state = self.accounts.entry(account_id).or_insert_with(AccountState::new);
        state.next_allowed = Instant::now() + Duration::from_secs(seconds);
        state.record("flood_wait");
        Ok(())
    }

    /// Number of operations logged for `account_id` (diagnostic only).
    pub fn op_count(&self, account_id: AccountId) -> usize {
        self.accounts
            .get(&account_id)
            .map(|s| s.log.len())
            .unwrap_or(0)
    }
}
