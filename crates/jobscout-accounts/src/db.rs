use rusqlite::Connection;

use crate::error::Result;

/// Initialise the accounts table. Safe to call on every startup.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS accounts (
            id                         INTEGER PRIMARY KEY,
            api_id                     TEXT NOT NULL,
            api_hash                   TEXT NOT NULL,
            is_active                  INTEGER NOT NULL DEFAULT 1,
            is_banned                  INTEGER NOT NULL DEFAULT 0,
            health_status              TEXT NOT NULL DEFAULT 'healthy',
            consecutive_errors         INTEGER NOT NULL DEFAULT 0,
            last_used_at               TEXT,
            last_join_at               TEXT,
            daily_joins                INTEGER NOT NULL DEFAULT 0,
            daily_joins_reset_at       TEXT,
            last_successful_fetch_at   TEXT,
            last_error_message         TEXT,
            last_error_at              TEXT
        );",
    )?;
    Ok(())
}
