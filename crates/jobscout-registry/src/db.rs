use rusqlite::Connection;

use crate::error::Result;

/// Initialise the channels table. Safe to call on every startup.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS channels (
            id                         INTEGER PRIMARY KEY AUTOINCREMENT,
            handle                     TEXT NOT NULL UNIQUE,
            title                      TEXT,
            category                   TEXT,
            is_member                  INTEGER NOT NULL DEFAULT 0,
            assigned_account_id        INTEGER,
            last_seen_message_id       INTEGER,
            last_scraped_at            TEXT,
            total_messages_scraped     INTEGER NOT NULL DEFAULT 0,
            relevant_jobs_count        INTEGER NOT NULL DEFAULT 0,
            total_jobs_posted          INTEGER NOT NULL DEFAULT 0,
            relevance_ratio            REAL NOT NULL DEFAULT 0,
            avg_job_quality_score      REAL NOT NULL DEFAULT 0,
            health_score               REAL NOT NULL DEFAULT 100,
            status                     TEXT NOT NULL DEFAULT 'active',
            deactivation_reason        TEXT,
            consecutive_poor_windows   INTEGER NOT NULL DEFAULT 0,
            last_score_update          TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_channels_status
            ON channels(status, health_score DESC, last_scraped_at ASC);
        CREATE INDEX IF NOT EXISTS idx_channels_assigned_account
            ON channels(assigned_account_id);",
    )?;
    Ok(())
}
