//! One end-to-end Batcher invocation and its aggregate metrics.

use chrono::{DateTime, Utc};
use jobscout_core::types::{ScrapeRun, ScrapeRunCounters, ScrapeRunId, ScrapeRunStatus};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS scrape_runs (
            id            TEXT PRIMARY KEY,
            started_at    TEXT NOT NULL,
            finished_at   TEXT,
            status        TEXT NOT NULL DEFAULT 'running',
            accounts_used           INTEGER NOT NULL DEFAULT 0,
            groups_processed        INTEGER NOT NULL DEFAULT 0,
            messages_fetched        INTEGER NOT NULL DEFAULT 0,
            jobs_extracted          INTEGER NOT NULL DEFAULT 0,
            duplicates_found        INTEGER NOT NULL DEFAULT 0,
            errors_count            INTEGER NOT NULL DEFAULT 0,
            errors                  TEXT NOT NULL DEFAULT '[]'
        );
        CREATE INDEX IF NOT EXISTS idx_scrape_runs_status ON scrape_runs(status);",
    )?;
    Ok(())
}

/// Start a new run in `running` state. Called once by the Batcher at the
/// top of an invocation.
pub fn start(conn: &Connection) -> Result<ScrapeRun> {
    let run = ScrapeRun {
        id: ScrapeRunId::new(),
        started_at: Utc::now(),
        finished_at: None,
        status: ScrapeRunStatus::Running,
        counters: ScrapeRunCounters::default(),
        errors: Vec::new(),
    };
    conn.execute(
        "INSERT INTO scrape_runs (id, started_at, status) VALUES (?1, ?2, 'running')",
        params![run.id.as_str(), run.started_at.to_rfc3339()],
    )?;
    Ok(run)
}

/// Record final counters and status. Called once the Batcher has awaited
/// all batch completions.
pub fn finish(
    conn: &Connection,
    id: &ScrapeRunId,
    status: ScrapeRunStatus,
    counters: ScrapeRunCounters,
    errors: &[String],
) -> Result<()> {
    let changed = conn.execute(
        "UPDATE scrape_runs SET
            finished_at = ?1, status = ?2, accounts_used = ?3, groups_processed = ?4,
            messages_fetched = ?5, jobs_extracted = ?6, duplicates_found = ?7,
            errors_count = ?8, errors = ?9
         WHERE id = ?10",
        params![
            Utc::now().to_rfc3339(),
            status.to_string(),
            counters.accounts_used,
            counters.groups_processed,
            counters.messages_fetched,
            counters.jobs_extracted,
            counters.duplicates_found,
            counters.errors_count,
            serde_json::to_string(errors)?,
            id.as_str(),
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound(format!("scrape_run {id}")));
    }
    Ok(())
}

/// Mark any run still `running` past `stale_after` as `partial` — the
/// watchdog for a crashed Batcher.
pub fn sweep_stale(conn: &Connection, stale_after: DateTime<Utc>) -> Result<u64> {
    let changed = conn.execute(
        "UPDATE scrape_runs SET status = 'partial', finished_at = ?1
         WHERE status = 'running' AND started_at < ?2",
        params![Utc::now().to_rfc3339(), stale_after.to_rfc3339()],
    )?;
    Ok(changed as u64)
}

pub fn get(conn: &Connection, id: &ScrapeRunId) -> Result<Option<ScrapeRun>> {
    let row = conn
        .query_row(&select_sql("WHERE id = ?1"), params![id.as_str()], row_to_run)
        .optional()?;
    row.transpose()
}

pub fn list_recent(conn: &Connection, limit: usize) -> Result<Vec<ScrapeRun>> {
    let mut stmt = conn.prepare(&select_sql("ORDER BY started_at DESC LIMIT ?1"))?;
    let rows = stmt.query_map(params![limit as i64], row_to_run)?;
    rows.filter_map(|r| r.ok()).collect()
}

fn select_sql(suffix: &str) -> String {
    format!(
        "SELECT id, started_at, finished_at, status, accounts_used, groups_processed,
                messages_fetched, jobs_extracted, duplicates_found, errors_count, errors
         FROM scrape_runs {suffix}"
    )
}

fn row_to_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<ScrapeRun>> {
    Ok(try_row_to_run(row))
}

fn try_row_to_run(row: &rusqlite::Row<'_>) -> Result<ScrapeRun> {
    let id: String = row.get(0)?;
    let started_at: String = row.get(1)?;
    let finished_at: Option<String> = row.get(2)?;
    let status: String = row.get(3)?;
    let errors: String = row.get(10)?;
    Ok(ScrapeRun {
        id: ScrapeRunId(id),
        started_at: started_at.parse().unwrap_or_else(|_| Utc::now()),
        finished_at: finished_at.and_then(|s| s.parse().ok()),
        status: status.parse().unwrap_or(ScrapeRunStatus::Running),
        counters: ScrapeRunCounters {
            accounts_used: row.get(4)?,
            groups_processed: row.get(5)?,
            messages_fetched: row.get::<_, i64>(6)? as u64,
            jobs_extracted: row.get::<_, i64>(7)? as u64,
            duplicates_found: row.get::<_, i64>(8)? as u64,
            errors_count: row.get(9)?,
        },
        errors: serde_json::from_str(&errors).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_then_finish_round_trips_counters() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let run = start(&conn).unwrap();
        finish(
            &conn,
            &run.id,
            ScrapeRunStatus::Success,
            ScrapeRunCounters {
                accounts_used: 2,
                groups_processed: 5,
                messages_fetched: 40,
                jobs_extracted: 10,
                duplicates_found: 2,
                errors_count: 0,
            },
            &[],
        )
        .unwrap();
        let fetched = get(&conn, &run.id).unwrap().unwrap();
        assert_eq!(fetched.status, ScrapeRunStatus::Success);
        assert_eq!(fetched.counters.messages_fetched, 40);
        assert!(fetched.finished_at.is_some());
    }

    #[test]
    fn sweep_stale_demotes_old_running_runs() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let run = start(&conn).unwrap();
        let future_cutoff = Utc::now() + chrono::Duration::hours(1);
        let moved = sweep_stale(&conn, future_cutoff).unwrap();
        assert_eq!(moved, 1);
        let fetched = get(&conn, &run.id).unwrap().unwrap();
        assert_eq!(fetched.status, ScrapeRunStatus::Partial);
    }
}
