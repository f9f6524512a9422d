//! `jobscout-core` — domain types, configuration, and error codes shared
//! by every stage of the ingestion pipeline.

pub mod config;
pub mod error;
pub mod types;

pub use config::JobScoutConfig;
pub use error::{CoreError, Result};
