//! `jobscout-platform` — the messaging-platform protocol boundary.
//!
//! Everything above [`client::PlatformClient`] is platform-agnostic; the
//! shipped [`http::TelegramHttpClient`] is the only platform-specific code
//! in the workspace.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::PlatformClient;
pub use error::{PlatformError, Result};
pub use http::TelegramHttpClient;
pub use types::{PlatformMessage, SessionBlob};
