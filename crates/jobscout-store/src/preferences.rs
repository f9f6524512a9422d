//! Admin-configurable scraping preferences: a single active row,
//! stored as a JSON blob since the schema is wide and admin-editable.

use jobscout_core::types::Preferences;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

const SINGLETON_ID: i64 = 1;

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS preferences (
            id         INTEGER PRIMARY KEY,
            body       TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )?;
    Ok(())
}

/// Returns the single active preferences row, or [`Preferences::default`]
/// if an admin has never saved one yet.
pub fn get_active(conn: &Connection) -> Result<Preferences> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM preferences WHERE id = ?1",
            params![SINGLETON_ID],
            |row| row.get(0),
        )
        .optional()?;
    match body {
        Some(body) => Ok(serde_json::from_str(&body)?),
        None => Ok(Preferences::default()),
    }
}

/// Replace the active preferences row wholesale — admins edit the whole
/// filter set at once rather than patching individual fields.
pub fn upsert(conn: &Connection, prefs: &Preferences) -> Result<()> {
    conn.execute(
        "INSERT INTO preferences (id, body, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
        params![SINGLETON_ID, serde_json::to_string(prefs)?, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_active_defaults_when_unset() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let prefs = get_active(&conn).unwrap();
        assert!(prefs.is_active);
        assert!(prefs.allow_all_india);
    }

    #[test]
    fn upsert_then_get_round_trips() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let mut prefs = Preferences::default();
        prefs.min_ai_confidence_score = 0.8;
        prefs.excluded_companies.push("BadCorp".to_string());
        upsert(&conn, &prefs).unwrap();

        let fetched = get_active(&conn).unwrap();
        assert_eq!(fetched.min_ai_confidence_score, 0.8);
        assert_eq!(fetched.excluded_companies, vec!["BadCorp".to_string()]);

        // upsert again, overwriting wholesale
        let mut prefs2 = Preferences::default();
        prefs2.is_active = false;
        upsert(&conn, &prefs2).unwrap();
        assert!(!get_active(&conn).unwrap().is_active);
    }
}
