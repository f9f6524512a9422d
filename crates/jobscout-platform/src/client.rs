use async_trait::async_trait;
use jobscout_core::types::AccountId;

use crate::error::Result;
use crate::types::{PlatformMessage, SessionBlob};

/// Boundary between the scraper worker and whatever messaging platform
/// actually holds the channels. Everything above this trait (governor,
/// worker, pipeline) is platform-agnostic; everything below it is not.
///
/// Production join/history-fetch against arbitrary third-party channels
/// needs a full MTProto user-session stack (there is no such crate in
/// this workspace's dependency set); `TelegramHttpClient` below talks to
/// the subset of channel history reachable through the Bot API surface
/// and is the integration point a deployment would replace with a real
/// MTProto-backed implementation.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Authenticate `account_id` using its stored session blob (if any),
    /// returning a possibly-updated blob to persist back.
    async fn authenticate(
        &self,
        account_id: AccountId,
        session: Option<SessionBlob>,
    ) -> Result<SessionBlob>;

    /// Join `channel_handle` as `account_id`. Idempotent: joining a
    /// channel the account already belongs to succeeds without effect.
    async fn join_channel(&self, account_id: AccountId, channel_handle: &str) -> Result<()>;

    /// Fetch up to `limit` messages from `channel_handle`, strictly newer
    /// than `since_message_id` when given (first-fetch omits it and
    /// returns the most recent `limit` messages). Results are ordered
    /// newest-first, matching the platform's native pagination order.
    async fn fetch_history(
        &self,
        account_id: AccountId,
        channel_handle: &str,
        since_message_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<PlatformMessage>>;
}
