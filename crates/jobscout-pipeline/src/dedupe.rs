//! Content-hash dedup: a rolling window collapses candidates that
//! normalize to the same identifying fields, keeping the earliest row.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jobscout_core::types::{Job, JobCandidate};
use sha2::{Digest, Sha256};

use jobscout_store::RelationalStore;

use crate::error::Result;

/// Lowercase + whitespace-collapse, the same normalization
/// `Company::normalize_name` applies to company names, generalized here to
/// every field that feeds the content hash.
pub fn normalize_field(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// `H(normalize(title) ‖ normalize(company) ‖ normalize(location) ‖ normalize(apply_url))`.
pub fn content_hash(title: Option<&str>, company: Option<&str>, location: Option<&str>, apply_url: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    for field in [title, company, location, apply_url] {
        hasher.update(normalize_field(field.unwrap_or("")));
        hasher.update(b"\x1f");
    }
    hex::encode(hasher.finalize())
}

fn candidate_hash(candidate: &JobCandidate) -> String {
    content_hash(
        candidate.title.as_deref(),
        candidate.company_name.as_deref(),
        candidate.location.as_ref().map(|l| l.raw.as_str()),
        candidate.apply.url.as_deref(),
    )
}

/// Window-bounded dedup against the `jobs` table.
pub struct Deduper {
    window: Duration,
}

impl Deduper {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Compute and stamp `content_hash` on `candidate`.
    pub fn hash(&self, candidate: &mut JobCandidate) {
        candidate.content_hash = candidate_hash(candidate);
    }

    /// Find the surviving row a duplicate should collapse into: the
    /// earliest job sharing `content_hash` within the rolling window
    /// ending at `now`. Returns `None` if the candidate is novel.
    pub fn find_collision(&self, store: &RelationalStore, content_hash: &str, now: DateTime<Utc>) -> Result<Option<Job>> {
        let since = now - chrono::Duration::from_std(self.window).unwrap_or(chrono::Duration::zero());
        let mut matches = store.find_jobs_by_hash_since(content_hash, since)?;
        Ok(if matches.is_empty() { None } else { Some(matches.remove(0)) })
    }
}
