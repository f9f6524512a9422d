use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single message fetched from a channel, as returned by a
/// `PlatformClient`. Distinct from `jobscout_core::types::RawMessage` —
/// this is the wire-shaped DTO before the worker stamps on
/// `fetching_account_id`/`fetched_at` and hands it to the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformMessage {
    pub message_id: i64,
    pub text: String,
    pub sender_id: Option<String>,
    pub authored_at: DateTime<Utc>,
}

/// Opaque bytes identifying an authenticated session, round-tripped
/// through `jobscout_store::SessionStore` without interpretation.
#[derive(Debug, Clone)]
pub struct SessionBlob(pub Vec<u8>);
