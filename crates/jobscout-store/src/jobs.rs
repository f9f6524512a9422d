//! Canonical job rows: one row per committed `JobCandidate`,
//! deduplicated by content hash within a rolling window.

use chrono::{DateTime, Utc};
use jobscout_core::types::{
    CompanyId, GeographicScope, Job, JobCategory, JobId,
};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS jobs (
            id                              INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id                      INTEGER NOT NULL,
            raw_message_platform_id         INTEGER NOT NULL,
            raw_message_channel_handle      TEXT NOT NULL,
            title                           TEXT,
            location_raw                    TEXT,
            cities                          TEXT NOT NULL DEFAULT '[]',
            is_remote                       INTEGER NOT NULL DEFAULT 0,
            is_hybrid                       INTEGER NOT NULL DEFAULT 0,
            is_onsite_only                  INTEGER NOT NULL DEFAULT 0,
            geographic_scope                TEXT NOT NULL DEFAULT 'unspecified',
            experience_raw                  TEXT,
            experience_min_years            REAL,
            experience_max_years            REAL,
            is_fresher                      INTEGER NOT NULL DEFAULT 0,
            salary_monthly_inr              INTEGER,
            skills                          TEXT NOT NULL DEFAULT '[]',
            category                        TEXT NOT NULL DEFAULT 'unspecified',
            apply_url                       TEXT,
            apply_emails                    TEXT NOT NULL DEFAULT '[]',
            apply_phones                    TEXT NOT NULL DEFAULT '[]',
            quality_score                   REAL NOT NULL DEFAULT 0,
            relevance_score                 REAL NOT NULL DEFAULT 0,
            extraction_completeness_score    REAL NOT NULL DEFAULT 0,
            meets_relevance_criteria         INTEGER NOT NULL DEFAULT 0,
            content_hash                    TEXT NOT NULL,
            is_active                       INTEGER NOT NULL DEFAULT 0,
            created_at                      TEXT NOT NULL,
            last_seen_at                    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_jobs_content_hash ON jobs(content_hash, created_at);
        CREATE INDEX IF NOT EXISTS idx_jobs_company ON jobs(company_id);
        CREATE INDEX IF NOT EXISTS idx_jobs_channel ON jobs(raw_message_channel_handle);",
    )?;
    Ok(())
}

/// Insert a new job row, ignoring `job.id` (assigned by the database).
/// Returns the new row's id.
pub fn insert(conn: &Connection, job: &Job) -> Result<JobId> {
    conn.execute(
        "INSERT INTO jobs
         (company_id, raw_message_platform_id, raw_message_channel_handle, title,
          location_raw, cities, is_remote, is_hybrid, is_onsite_only, geographic_scope,
          experience_raw, experience_min_years, experience_max_years, is_fresher,
          salary_monthly_inr, skills, category, apply_url, apply_emails, apply_phones,
          quality_score, relevance_score, extraction_completeness_score,
          meets_relevance_criteria, content_hash, is_active, created_at, last_seen_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,
                 ?21,?22,?23,?24,?25,?26,?27,?28)",
        params![
            job.company_id,
            job.raw_message_platform_id,
            job.raw_message_channel_handle,
            job.title,
            job.location_raw,
            serde_json::to_string(&job.cities)?,
            job.is_remote,
            job.is_hybrid,
            job.is_onsite_only,
            job.geographic_scope.to_string(),
            job.experience_raw,
            job.experience_min_years,
            job.experience_max_years,
            job.is_fresher,
            job.salary_monthly_inr,
            serde_json::to_string(&job.skills)?,
            job.category.to_string(),
            job.apply_url,
            serde_json::to_string(&job.apply_emails)?,
            serde_json::to_string(&job.apply_phones)?,
            job.quality_score,
            job.relevance_score,
            job.extraction_completeness_score,
            job.meets_relevance_criteria,
            job.content_hash,
            job.is_active,
            job.created_at.to_rfc3339(),
            job.last_seen_at.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: JobId) -> Result<Option<Job>> {
    let row = conn
        .query_row(&select_sql("WHERE id = ?1"), params![id], row_to_job)
        .optional()?;
    row.transpose()
}

/// Jobs sharing `content_hash`, created no earlier than `since` — the
/// Deduper's window-collapse lookup.
pub fn find_by_hash_since(conn: &Connection, content_hash: &str, since: DateTime<Utc>) -> Result<Vec<Job>> {
    let mut stmt = conn.prepare(&select_sql(
        "WHERE content_hash = ?1 AND created_at >= ?2 ORDER BY created_at ASC",
    ))?;
    let rows = stmt.query_map(params![content_hash, since.to_rfc3339()], row_to_job)?;
    rows.filter_map(|r| r.ok()).collect()
}

/// Bump `last_seen_at` on the surviving row of a dedup collision, merging
/// in any previously-null fields from the newer candidate.
pub fn touch_and_merge(
    conn: &Connection,
    id: JobId,
    last_seen_at: DateTime<Utc>,
    fill_salary: Option<i64>,
    fill_location: Option<&str>,
) -> Result<()> {
    let changed = conn.execute(
        "UPDATE jobs SET
            last_seen_at = ?1,
            salary_monthly_inr = COALESCE(salary_monthly_inr, ?2),
            location_raw = COALESCE(location_raw, ?3)
         WHERE id = ?4",
        params![last_seen_at.to_rfc3339(), fill_salary, fill_location, id],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound(format!("job {id}")));
    }
    Ok(())
}

pub fn count_active(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM jobs WHERE is_active = 1", [], |r| r.get(0))?;
    Ok(count as u64)
}

/// Active jobs for a channel posted within the last `window_days`, used by
/// the Channel Scorer to compute average quality over a rolling
/// window.
pub fn recent_for_channel(conn: &Connection, channel_handle: &str, since: DateTime<Utc>) -> Result<Vec<Job>> {
    let mut stmt = conn.prepare(&select_sql(
        "WHERE raw_message_channel_handle = ?1 AND created_at >= ?2",
    ))?;
    let rows = stmt.query_map(params![channel_handle, since.to_rfc3339()], row_to_job)?;
    rows.filter_map(|r| r.ok()).collect()
}

/// Content hashes with more than one `is_active` row — a violation of the
/// "at most one active Job per content_hash" invariant, surfaced by
/// the `verify` CLI command rather than asserted at insert time.
pub fn duplicate_active_hashes(conn: &Connection) -> Result<Vec<(String, u64)>> {
    let mut stmt = conn.prepare(
        "SELECT content_hash, COUNT(*) FROM jobs WHERE is_active = 1
         GROUP BY content_hash HAVING COUNT(*) > 1",
    )?;
    let rows = stmt.query_map([], |row| {
        let hash: String = row.get(0)?;
        let count: i64 = row.get(1)?;
        Ok((hash, count as u64))
    })?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

fn select_sql(suffix: &str) -> String {
    format!(
        "SELECT id, company_id, raw_message_platform_id, raw_message_channel_handle, title,
                location_raw, cities, is_remote, is_hybrid, is_onsite_only, geographic_scope,
                experience_raw, experience_min_years, experience_max_years, is_fresher,
                salary_monthly_inr, skills, category, apply_url, apply_emails, apply_phones,
                quality_score, relevance_score, extraction_completeness_score,
                meets_relevance_criteria, content_hash, is_active, created_at, last_seen_at
         FROM jobs {suffix}"
    )
}

fn row_to_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Job>> {
    Ok(try_row_to_job(row))
}

fn try_row_to_job(row: &rusqlite::Row<'_>) -> Result<Job> {
    let cities: String = row.get(6)?;
    let scope_str: String = row.get(10)?;
    let skills: String = row.get(16)?;
    let category_str: String = row.get(17)?;
    let emails: String = row.get(19)?;
    let phones: String = row.get(20)?;
    let created_at: String = row.get(27)?;
    let last_seen_at: String = row.get(28)?;

    Ok(Job {
        id: row.get(0)?,
        company_id: row.get::<_, CompanyId>(1)?,
        raw_message_platform_id: row.get(2)?,
        raw_message_channel_handle: row.get(3)?,
        title: row.get(4)?,
        location_raw: row.get(5)?,
        cities: serde_json::from_str(&cities).unwrap_or_default(),
        is_remote: row.get::<_, i64>(7)? != 0,
        is_hybrid: row.get::<_, i64>(8)? != 0,
        is_onsite_only: row.get::<_, i64>(9)? != 0,
        geographic_scope: scope_str.parse().unwrap_or(GeographicScope::Unspecified),
        experience_raw: row.get(11)?,
        experience_min_years: row.get(12)?,
        experience_max_years: row.get(13)?,
        is_fresher: row.get::<_, i64>(14)? != 0,
        salary_monthly_inr: row.get(15)?,
        skills: serde_json::from_str(&skills).unwrap_or_default(),
        category: category_str.parse_category(),
        apply_url: row.get(18)?,
        apply_emails: serde_json::from_str(&emails).unwrap_or_default(),
        apply_phones: serde_json::from_str(&phones).unwrap_or_default(),
        quality_score: row.get(21)?,
        relevance_score: row.get(22)?,
        extraction_completeness_score: row.get(23)?,
        meets_relevance_criteria: row.get::<_, i64>(24)? != 0,
        content_hash: row.get(25)?,
        is_active: row.get::<_, i64>(26)? != 0,
        created_at: created_at.parse().unwrap_or_else(|_| Utc::now()),
        last_seen_at: last_seen_at.parse().unwrap_or_else(|_| Utc::now()),
    })
}

trait ParseCategory {
    fn parse_category(&self) -> JobCategory;
}

impl ParseCategory for str {
    fn parse_category(&self) -> JobCategory {
        match self {
            "tech" => JobCategory::Tech,
            "data" => JobCategory::Data,
            "design" => JobCategory::Design,
            "marketing" => JobCategory::Marketing,
            "non_tech" => JobCategory::NonTech,
            _ => JobCategory::Unspecified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_core::types::Experience;
    use std::collections::HashSet;

    fn sample_job(content_hash: &str) -> Job {
        let now = Utc::now();
        Job {
            id: 0,
            company_id: 1,
            raw_message_platform_id: 1,
            raw_message_channel_handle: "jobs_test".into(),
            title: Some("Backend Engineer".into()),
            location_raw: Some("Bangalore".into()),
            cities: vec!["bangalore".into()],
            is_remote: false,
            is_hybrid: false,
            is_onsite_only: false,
            geographic_scope: GeographicScope::India,
            experience_raw: None,
            experience_min_years: Some(3.0),
            experience_max_years: Some(5.0),
            is_fresher: false,
            salary_monthly_inr: Some(150_000),
            skills: vec!["python".into()],
            category: JobCategory::Tech,
            apply_url: Some("https://acme.co/apply".into()),
            apply_emails: vec![],
            apply_phones: vec![],
            quality_score: 0.8,
            relevance_score: 0.7,
            extraction_completeness_score: 0.9,
            meets_relevance_criteria: true,
            content_hash: content_hash.to_string(),
            is_active: true,
            created_at: now,
            last_seen_at: now,
        }
    }

    fn conn_with_companies_and_jobs() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::companies::init_db(&conn).unwrap();
        init_db(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_then_get_round_trips() {
        let conn = conn_with_companies_and_jobs();
        let job = sample_job("abc123");
        let id = insert(&conn, &job).unwrap();
        let fetched = get(&conn, id).unwrap().unwrap();
        assert_eq!(fetched.title.as_deref(), Some("Backend Engineer"));
        assert_eq!(fetched.skills, vec!["python".to_string()]);
        assert!(fetched.is_active);
        let _: HashSet<String> = fetched.skills.into_iter().collect();
    }

    #[test]
    fn find_by_hash_since_respects_window() {
        let conn = conn_with_companies_and_jobs();
        let job = sample_job("dup-hash");
        insert(&conn, &job).unwrap();
        let found = find_by_hash_since(&conn, "dup-hash", Utc::now() - chrono::Duration::hours(1)).unwrap();
        assert_eq!(found.len(), 1);
        let none = find_by_hash_since(&conn, "dup-hash", Utc::now() + chrono::Duration::hours(1)).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn touch_and_merge_fills_null_fields_only() {
        let conn = conn_with_companies_and_jobs();
        let mut job = sample_job("merge-hash");
        job.salary_monthly_inr = None;
        let id = insert(&conn, &job).unwrap();
        touch_and_merge(&conn, id, Utc::now(), Some(200_000), None).unwrap();
        let fetched = get(&conn, id).unwrap().unwrap();
        assert_eq!(fetched.salary_monthly_inr, Some(200_000));
    }

    #[test]
    fn experience_struct_is_not_persisted_directly() {
        let _ = Experience::default();
    }

    #[test]
    fn duplicate_active_hashes_flags_only_hashes_with_more_than_one_active_row() {
        let conn = conn_with_companies_and_jobs();
        insert(&conn, &sample_job("shared-hash")).unwrap();
        insert(&conn, &sample_job("shared-hash")).unwrap();
        insert(&conn, &sample_job("lonely-hash")).unwrap();

        let dupes = duplicate_active_hashes(&conn).unwrap();
        assert_eq!(dupes, vec![("shared-hash".to_string(), 2)]);
    }
}
