//! Additive schema migrations, tracked with `PRAGMA user_version`.
//!
//! Migrations only ever create; a newer binary opening an older database
//! adds the missing collections and leaves existing rows alone.

use rusqlite::Connection;
use tracing::info;

use crate::error::EventBookResult;

const MIGRATIONS: &[&str] = &[
    // 1: events, keyed by id, with the full record stored as JSON
    "CREATE TABLE IF NOT EXISTS events (
        id     INTEGER PRIMARY KEY,
        date   TEXT NOT NULL,
        record TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);",
    // 2: categories and event types (names may repeat)
    "CREATE TABLE IF NOT EXISTS categories (
        seq  INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_categories_name ON categories(name);
    CREATE TABLE IF NOT EXISTS event_types (
        seq      INTEGER PRIMARY KEY AUTOINCREMENT,
        name     TEXT NOT NULL,
        category TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_event_types_name ON event_types(name);",
    // 3: departments
    "CREATE TABLE IF NOT EXISTS departments (
        seq  INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    );",
];

pub const SCHEMA_VERSION: usize = MIGRATIONS.len();

pub fn current_version(conn: &Connection) -> EventBookResult<usize> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(usize::try_from(version).unwrap_or(0))
}

/// Apply every migration newer than the database's recorded version.
pub fn run_migrations(conn: &Connection) -> EventBookResult<()> {
    let from = current_version(conn)?;

    for (index, sql) in MIGRATIONS.iter().enumerate().skip(from) {
        let version = index + 1;
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version as i64)?;
        tx.commit()?;
        info!(version, "applied schema migration");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_latest_version() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn upgrade_keeps_existing_events() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(MIGRATIONS[0]).unwrap();
        conn.pragma_update(None, "user_version", 1i64).unwrap();
        conn.execute(
            "INSERT INTO events (id, date, record) VALUES (1, '2024-01-01', '{}')",
            [],
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        let departments: i64 = conn
            .query_row("SELECT COUNT(*) FROM departments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(departments, 0);
    }
}
