use thiserror::Error;

/// Errors a `PlatformClient` implementation can return. These mirror the
/// platform-level failure taxonomy the scraper worker dispatches on —
/// distinct from transport or program bugs.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The platform asked the caller to back off for `seconds` before
    /// retrying anything on this account.
    #[error("flood wait: {seconds}s")]
    FloodWait { seconds: u64 },

    /// The channel exists but this account cannot read it (private,
    /// access revoked, or never joined).
    #[error("channel is private or inaccessible")]
    ChannelPrivate,

    /// The channel handle does not resolve to any channel.
    #[error("username is invalid or channel does not exist")]
    UsernameInvalid,

    /// The account's stored session is no longer valid and must be
    /// re-authenticated.
    #[error("auth key invalid or expired")]
    AuthKeyInvalid,

    /// Any other network/protocol failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl PlatformError {
    pub fn code(&self) -> &'static str {
        match self {
            PlatformError::FloodWait { .. } => "FLOOD_WAIT",
            PlatformError::ChannelPrivate => "CHANNEL_PRIVATE",
            PlatformError::UsernameInvalid => "USERNAME_INVALID",
            PlatformError::AuthKeyInvalid => "AUTH_KEY_INVALID",
            PlatformError::Transport(_) => "TRANSPORT_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
