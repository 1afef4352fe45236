//! Applied-state bookkeeping in `schemalog_migrations`.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, params};
use schemalog_core::MigrationId;
use serde::Serialize;

use super::column_helpers::table_exists;

pub(crate) const APPLIED_TABLE: &str = "schemalog_migrations";

const CREATE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS schemalog_migrations (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        applied_at TEXT NOT NULL
    );";

/// A step recorded as applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    pub id: MigrationId,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

pub(crate) fn ensure_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_SQL)
}

/// Recorded steps in id order. A database without the bookkeeping table has
/// none.
pub fn applied_migrations(conn: &Connection) -> rusqlite::Result<Vec<AppliedMigration>> {
    if !table_exists(conn, APPLIED_TABLE)? {
        return Ok(Vec::new());
    }
    let mut stmt =
        conn.prepare("SELECT id, name, applied_at FROM schemalog_migrations ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        let applied_at: String = row.get(2)?;
        let applied_at = DateTime::parse_from_rfc3339(&applied_at)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?
            .with_timezone(&Utc);
        Ok(AppliedMigration { id: row.get(0)?, name: row.get(1)?, applied_at })
    })?;
    rows.collect()
}

pub(crate) fn is_recorded(conn: &Connection, id: MigrationId) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM schemalog_migrations WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

pub(crate) fn record(conn: &Connection, id: MigrationId, name: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO schemalog_migrations (id, name, applied_at) VALUES (?1, ?2, ?3)",
        params![id, name, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

pub(crate) fn remove(conn: &Connection, id: MigrationId) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM schemalog_migrations WHERE id = ?1", params![id])?;
    Ok(())
}
