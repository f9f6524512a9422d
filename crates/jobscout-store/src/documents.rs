use std::sync::Mutex;

use jobscout_core::types::{AccountId, JobId, ProcessingOutcome, RawMessage};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};

/// Initialise the raw message document store. Safe to call on every startup.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS raw_messages (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            platform_message_id  INTEGER NOT NULL,
            channel_handle       TEXT NOT NULL,
            body                 TEXT NOT NULL,
            sender_id            TEXT,
            authored_at          TEXT NOT NULL,
            fetched_at           TEXT NOT NULL,
            fetching_account_id  INTEGER NOT NULL,
            processed            INTEGER NOT NULL DEFAULT 0,
            processing_outcome   TEXT,
            job_id               INTEGER,
            UNIQUE(platform_message_id, channel_handle)
        );
        CREATE INDEX IF NOT EXISTS idx_raw_messages_unprocessed
            ON raw_messages(processed, channel_handle);",
    )?;
    Ok(())
}

/// Document store for verbatim platform messages, keyed by
/// `(channel_handle, platform_message_id)`.
///
/// Messages are written once by the scraper worker and updated exactly
/// once by the pipeline once a processing outcome is known. The unique
/// index makes re-fetching the same message id (crash/retry) a no-op
/// rather than a duplicate row.
pub struct DocumentStore {
    db: Mutex<Connection>,
}

impl DocumentStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self { db: Mutex::new(conn) })
    }

    /// Insert a freshly fetched message. Ignored (not an error) if the
    /// `(platform_message_id, channel_handle)` pair already exists.
    pub fn insert(&self, msg: &RawMessage) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT OR IGNORE INTO raw_messages
             (platform_message_id, channel_handle, body, sender_id, authored_at,
              fetched_at, fetching_account_id, processed, processing_outcome, job_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, NULL, NULL)",
            params![
                msg.platform_message_id,
                msg.channel_handle,
                msg.body,
                msg.sender_id,
                msg.authored_at.to_rfc3339(),
                msg.fetched_at.to_rfc3339(),
                msg.fetching_account_id,
            ],
        )?;
        Ok(())
    }

    /// Unprocessed messages for a channel, oldest first, capped at `limit`.
    pub fn unprocessed_for_channel(
        &self,
        channel_handle: &str,
        limit: usize,
    ) -> Result<Vec<RawMessage>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT platform_message_id, channel_handle, body, sender_id, authored_at,
                    fetched_at, fetching_account_id, processed, processing_outcome, job_id
             FROM raw_messages
             WHERE channel_handle = ?1 AND processed = 0
             ORDER BY platform_message_id ASC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![channel_handle, limit as i64], row_to_message)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Mark a message processed with its terminal outcome.
    pub fn mark_processed(
        &self,
        channel_handle: &str,
        platform_message_id: i64,
        outcome: ProcessingOutcome,
        job_id: Option<JobId>,
    ) -> Result<()> {
        let db = self.db.lock().unwrap();
        let changed = db.execute(
            "UPDATE raw_messages SET processed = 1, processing_outcome = ?1, job_id = ?2
             WHERE channel_handle = ?3 AND platform_message_id = ?4",
            params![outcome.to_string(), job_id, channel_handle, platform_message_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!(
                "raw_message {channel_handle}/{platform_message_id}"
            )));
        }
        Ok(())
    }

    /// Look up a single message by its natural key.
    pub fn get(&self, channel_handle: &str, platform_message_id: i64) -> Result<Option<RawMessage>> {
        let db = self.db.lock().unwrap();
        let row = db
            .query_row(
                "SELECT platform_message_id, channel_handle, body, sender_id, authored_at,
                        fetched_at, fetching_account_id, processed, processing_outcome, job_id
                 FROM raw_messages
                 WHERE channel_handle = ?1 AND platform_message_id = ?2",
                params![channel_handle, platform_message_id],
                row_to_message,
            )
            .optional()?;
        Ok(row)
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMessage> {
    let authored_at: String = row.get(4)?;
    let fetched_at: String = row.get(5)?;
    let outcome: Option<String> = row.get(8)?;
    let fetching_account_id: AccountId = row.get(6)?;
    Ok(RawMessage {
        platform_message_id: row.get(0)?,
        channel_handle: row.get(1)?,
        body: row.get(2)?,
        sender_id: row.get(3)?,
        authored_at: authored_at
            .parse()
            .unwrap_or_else(|_| chrono::Utc::now()),
        fetched_at: fetched_at.parse().unwrap_or_else(|_| chrono::Utc::now()),
        fetching_account_id,
        processed: row.get::<_, i64>(7)? != 0,
        processing_outcome: outcome.and_then(|o| o.parse().ok()),
        job_id: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(id: i64) -> RawMessage {
        RawMessage {
            platform_message_id: id,
            channel_handle: "hiring_india".to_string(),
            body: "We are hiring a backend engineer".to_string(),
            sender_id: None,
            authored_at: Utc::now(),
            fetched_at: Utc::now(),
            fetching_account_id: 1,
            processed: false,
            processing_outcome: None,
            job_id: None,
        }
    }

    #[test]
    fn insert_is_idempotent_on_natural_key() {
        let conn = Connection::open_in_memory().unwrap();
        let store = DocumentStore::new(conn).unwrap();
        store.insert(&sample(42)).unwrap();
        store.insert(&sample(42)).unwrap();
        let found = store.unprocessed_for_channel("hiring_india", 10).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn mark_processed_updates_outcome_and_excludes_from_unprocessed() {
        let conn = Connection::open_in_memory().unwrap();
        let store = DocumentStore::new(conn).unwrap();
        store.insert(&sample(7)).unwrap();
        store
            .mark_processed("hiring_india", 7, ProcessingOutcome::Job, Some(100))
            .unwrap();
        let found = store.unprocessed_for_channel("hiring_india", 10).unwrap();
        assert!(found.is_empty());
        let row = store.get("hiring_india", 7).unwrap().unwrap();
        assert!(row.processed);
        assert_eq!(row.job_id, Some(100));
    }

    #[test]
    fn mark_processed_missing_message_is_not_found() {
        let conn = Connection::open_in_memory().unwrap();
        let store = DocumentStore::new(conn).unwrap();
        let err = store
            .mark_processed("hiring_india", 999, ProcessingOutcome::NotAJob, None)
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
