//! Aggregate wrapper over the relational half of the store: companies,
//! jobs, scrape runs, and preferences, all living in one SQLite file —
//! the structured half, as opposed to the raw-message document store.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use jobscout_core::types::{Company, CompanyId, Job, JobId, Preferences, ScrapeRun, ScrapeRunCounters, ScrapeRunId, ScrapeRunStatus};
use rusqlite::Connection;

use crate::error::Result;
use crate::{companies, jobs, preferences, scrape_runs};

/// Relational store: company identities, canonical job postings, scrape
/// run bookkeeping, and admin preferences.
pub struct RelationalStore {
    db: Mutex<Connection>,
}

impl RelationalStore {
    pub fn new(conn: Connection) -> Result<Self> {
        companies::init_db(&conn)?;
        jobs::init_db(&conn)?;
        scrape_runs::init_db(&conn)?;
        preferences::init_db(&conn)?;
        Ok(Self { db: Mutex::new(conn) })
    }

    /// Run `f` inside one real SQLite transaction. Used by the Persister
    /// to make company-resolve and job-insert atomic: either both
    /// land or neither does, since they share one connection and file.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T>,
    {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    pub fn resolve_company(&self, display_name: &str) -> Result<Company> {
        let db = self.db.lock().unwrap();
        companies::resolve_or_create(&db, display_name)
    }

    pub fn get_company(&self, id: CompanyId) -> Result<Option<Company>> {
        let db = self.db.lock().unwrap();
        companies::get(&db, id)
    }

    pub fn insert_job(&self, job: &Job) -> Result<JobId> {
        let db = self.db.lock().unwrap();
        jobs::insert(&db, job)
    }

    pub fn get_job(&self, id: JobId) -> Result<Option<Job>> {
        let db = self.db.lock().unwrap();
        jobs::get(&db, id)
    }

    pub fn find_jobs_by_hash_since(&self, content_hash: &str, since: DateTime<Utc>) -> Result<Vec<Job>> {
        let db = self.db.lock().unwrap();
        jobs::find_by_hash_since(&db, content_hash, since)
    }

    pub fn touch_and_merge_job(
        &self,
        id: JobId,
        last_seen_at: DateTime<Utc>,
        fill_salary: Option<i64>,
        fill_location: Option<&str>,
    ) -> Result<()> {
        let db = self.db.lock().unwrap();
        jobs::touch_and_merge(&db, id, last_seen_at, fill_salary, fill_location)
    }

    pub fn count_active_jobs(&self) -> Result<u64> {
        let db = self.db.lock().unwrap();
        jobs::count_active(&db)
    }

    pub fn recent_jobs_for_channel(&self, channel_handle: &str, since: DateTime<Utc>) -> Result<Vec<Job>> {
        let db = self.db.lock().unwrap();
        jobs::recent_for_channel(&db, channel_handle, since)
    }

    pub fn start_scrape_run(&self) -> Result<ScrapeRun> {
        let db = self.db.lock().unwrap();
        scrape_runs::start(&db)
    }

    pub fn finish_scrape_run(
        &self,
        id: &ScrapeRunId,
        status: ScrapeRunStatus,
        counters: ScrapeRunCounters,
        errors: &[String],
    ) -> Result<()> {
        let db = self.db.lock().unwrap();
        scrape_runs::finish(&db, id, status, counters, errors)
    }

    pub fn sweep_stale_scrape_runs(&self, stale_after: DateTime<Utc>) -> Result<u64> {
        let db = self.db.lock().unwrap();
        scrape_runs::sweep_stale(&db, stale_after)
    }

    pub fn get_scrape_run(&self, id: &ScrapeRunId) -> Result<Option<ScrapeRun>> {
        let db = self.db.lock().unwrap();
        scrape_runs::get(&db, id)
    }

    pub fn recent_scrape_runs(&self, limit: usize) -> Result<Vec<ScrapeRun>> {
        let db = self.db.lock().unwrap();
        scrape_runs::list_recent(&db, limit)
    }

    pub fn duplicate_active_content_hashes(&self) -> Result<Vec<(String, u64)>> {
        let db = self.db.lock().unwrap();
        jobs::duplicate_active_hashes(&db)
    }

    pub fn active_preferences(&self) -> Result<Preferences> {
        let db = self.db.lock().unwrap();
        preferences::get_active(&db)
    }

    pub fn save_preferences(&self, prefs: &Preferences) -> Result<()> {
        let db = self.db.lock().unwrap();
        preferences::upsert(&db, prefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_transaction_commits_company_and_job_together() {
        let store = RelationalStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let job_id = store
            .with_transaction(|tx| {
                let company = companies::resolve_or_create(tx, "Acme Corp")?;
                let mut job = sample_job(company.id);
                job.content_hash = "tx-hash".to_string();
                jobs::insert(tx, &job)
            })
            .unwrap();
        assert!(store.get_job(job_id).unwrap().is_some());
    }

    fn sample_job(company_id: CompanyId) -> Job {
        let now = Utc::now();
        Job {
            id: 0,
            company_id,
            raw_message_platform_id: 1,
            raw_message_channel_handle: "jobs_test".into(),
            title: Some("Engineer".into()),
            location_raw: None,
            cities: vec![],
            is_remote: false,
            is_hybrid: false,
            is_onsite_only: false,
            geographic_scope: jobscout_core::types::GeographicScope::Unspecified,
            experience_raw: None,
            experience_min_years: None,
            experience_max_years: None,
            is_fresher: false,
            salary_monthly_inr: None,
            skills: vec![],
            category: jobscout_core::types::JobCategory::Unspecified,
            apply_url: None,
            apply_emails: vec![],
            apply_phones: vec![],
            quality_score: 0.0,
            relevance_score: 0.0,
            extraction_completeness_score: 0.0,
            meets_relevance_criteria: false,
            content_hash: "placeholder".into(),
            is_active: true,
            created_at: now,
            last_seen_at: now,
        }
    }
}
