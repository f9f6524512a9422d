//! `jobscout-worker` — the per-channel scrape loop that sits between
//! `jobscout-accounts`/`jobscout-governor` (who may fetch, how fast) and
//! `jobscout-store` (where fetched messages land).

pub mod error;
pub mod scraper;

pub use error::{Result, WorkerError};
pub use scraper::{scrape_channel, ScrapeOutcome, ScraperTunables};
