//! `jobscout-pipeline` — the back half of the ingestion pipeline:
//! content-hash dedup, quality/relevance scoring, transactional persistence,
//! and the periodic channel-health sweep. All four stages consume
//! `JobCandidate`s produced by `jobscout-extractor` and write to
//! `jobscout-store` / `jobscout-registry`.

pub mod channel_score;
pub mod dedupe;
pub mod error;
pub mod persist;
pub mod quality;

pub use channel_score::{ChannelScoreOutcome, ChannelScorer, ChannelScorerConfig, SweepSummary};
pub use dedupe::Deduper;
pub use error::{PipelineError, Result};
pub use persist::{PersistOutcome, Persister};
pub use quality::{QualityBreakdown, QualityScorer};
