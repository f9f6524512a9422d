//! Company resolution: normalized-name lookup with
//! create-on-miss, mirroring a resolve-or-create identity pattern.

use jobscout_core::types::{Company, CompanyId};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS companies (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            canonical_name  TEXT NOT NULL UNIQUE,
            display_name    TEXT NOT NULL,
            is_verified     INTEGER NOT NULL DEFAULT 0
        );",
    )?;
    Ok(())
}

/// Look up a company by its case-/punctuation-folded name, creating it
/// with `display_name` as the first-seen spelling if it doesn't exist yet.
pub fn resolve_or_create(conn: &Connection, display_name: &str) -> Result<Company> {
    let canonical = Company::normalize_name(display_name);
    conn.execute(
        "INSERT OR IGNORE INTO companies (canonical_name, display_name) VALUES (?1, ?2)",
        params![canonical, display_name],
    )?;
    let company = conn.query_row(
        "SELECT id, canonical_name, display_name, is_verified FROM companies WHERE canonical_name = ?1",
        params![canonical],
        row_to_company,
    )?;
    Ok(company)
}

pub fn get(conn: &Connection, id: CompanyId) -> Result<Option<Company>> {
    let row = conn
        .query_row(
            "SELECT id, canonical_name, display_name, is_verified FROM companies WHERE id = ?1",
            params![id],
            row_to_company,
        )
        .optional()?;
    Ok(row)
}

fn row_to_company(row: &rusqlite::Row<'_>) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        canonical_name: row.get(1)?,
        display_name: row.get(2)?,
        is_verified: row.get::<_, i64>(3)? != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_or_create_is_case_and_punctuation_insensitive() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let a = resolve_or_create(&conn, "Acme, Inc.").unwrap();
        let b = resolve_or_create(&conn, "acme inc").unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.display_name, "Acme, Inc.");
    }
}
